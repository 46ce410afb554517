//! Catalog operations: agents, chats, knowledge bases, documents and
//! search.
//!
//! Each operation is a single JSON call. Lists the server leaves out are
//! read as empty.

use agent_console_model::{ErrorKind, HistoryStep};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::proto::string_id;
use crate::{Error, HttpBackend};

/// An agent as listed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AgentSummary {
    /// The agent id.
    #[serde(rename = "Agent_ID", deserialize_with = "string_id")]
    pub id: String,
    /// The display name.
    #[serde(rename = "Agent_Name")]
    pub name: String,
    /// What the agent is for.
    #[serde(default)]
    pub description: Option<String>,
}

/// The definition of an agent to create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAgent {
    /// The display name.
    #[serde(rename = "agent_name")]
    pub name: String,
    /// What the agent is for.
    #[serde(rename = "agent_description")]
    pub description: String,
    /// The instructions the agent follows.
    #[serde(rename = "agent_instruction")]
    pub instructions: String,
}

/// A chat as listed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatSummary {
    /// The chat id.
    #[serde(deserialize_with = "string_id")]
    pub chat_id: String,
    /// When the chat was created.
    #[serde(rename = "Created_at", default)]
    pub created_at: Option<String>,
}

/// A knowledge base as listed by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// The knowledge base id.
    pub knowledge_base_id: String,
    /// The display name.
    pub name: String,
    /// What the knowledge base holds.
    #[serde(default)]
    pub description: Option<String>,
}

/// A document to upload into a knowledge base.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewDocument {
    /// The document id.
    pub document_id: String,
    /// The knowledge base to upload into.
    pub knowledge_base_id: String,
    /// The document text.
    #[serde(rename = "document")]
    pub content: String,
}

/// A chunk returned by a search.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    /// The knowledge base the chunk comes from.
    pub knowledge_base_id: String,
    /// The chunk text.
    pub content: String,
}

/// A semantic search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SemanticQuery {
    /// What to search for.
    pub query: String,
    /// The knowledge bases to search.
    #[serde(rename = "knowledge_base_ids_to_query")]
    pub knowledge_base_ids: Vec<String>,
    /// How many chunks to retrieve.
    #[serde(rename = "number_of_chunks_to_retrieve")]
    pub count: u32,
}

/// An exact text search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExactQuery {
    /// The text to match.
    pub text: String,
    /// The knowledge bases to search.
    #[serde(rename = "knowledge_base_ids_to_query")]
    pub knowledge_base_ids: Vec<String>,
    /// How many chunks to retrieve.
    #[serde(rename = "num_of_chunks_to_retrieve")]
    pub count: u32,
}

/// A question answered from knowledge bases.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Question {
    /// The knowledge bases to answer from.
    #[serde(rename = "knowledge_base_ids_to_query")]
    pub knowledge_base_ids: Vec<String>,
    /// The question.
    pub question: String,
}

#[derive(Deserialize)]
struct Records<T> {
    #[serde(rename = "Records", default = "Vec::new")]
    records: Vec<T>,
}

#[derive(Deserialize)]
struct CreatedAgent {
    #[serde(default, deserialize_with = "crate::proto::opt_string_id")]
    agent_id: Option<String>,
}

#[derive(Deserialize)]
struct History {
    #[serde(default)]
    steps: Vec<RawHistoryStep>,
}

#[derive(Deserialize)]
struct RawHistoryStep {
    payload: RawHistoryPayload,
    #[serde(default)]
    created_at: String,
}

#[derive(Deserialize)]
struct RawHistoryPayload {
    step_type: String,
    #[serde(default)]
    content: Value,
}

#[derive(Deserialize)]
struct KnowledgeBases {
    #[serde(default)]
    knowledge_bases: Vec<KnowledgeBase>,
}

#[derive(Deserialize)]
struct RetrievedChunks {
    #[serde(default)]
    retrieved_chunks: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct Answer {
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Serialize)]
struct NewKnowledgeBase<'a> {
    data: &'a KnowledgeBase,
}

impl HttpBackend {
    /// Lists the agents visible to the token.
    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>, Error> {
        let value = self.get_json("/agents", &[]).await?;
        Ok(decode::<Records<_>>(value)?.records)
    }

    /// Creates an agent and returns its id.
    pub async fn create_agent(
        &self,
        agent: &NewAgent,
    ) -> Result<String, Error> {
        let value = self.send_json(Method::PUT, "/agents", agent).await?;
        decode::<CreatedAgent>(value)?.agent_id.ok_or_else(|| {
            Error::new("no `agent_id` in the response", ErrorKind::MissingField)
        })
    }

    /// Lists the chats held with an agent.
    pub async fn list_chats(
        &self,
        agent_id: &str,
    ) -> Result<Vec<ChatSummary>, Error> {
        let value = self
            .get_json("/agents/chats", &[("agent_id", agent_id)])
            .await?;
        Ok(decode::<Records<_>>(value)?.records)
    }

    /// Fetches the server-side history of a chat.
    pub async fn chat_history(
        &self,
        chat_id: &str,
    ) -> Result<Vec<HistoryStep>, Error> {
        let value = self
            .get_json("/agents/chats/history", &[("chat_id", chat_id)])
            .await?;
        let history = decode::<History>(value)?;
        Ok(history
            .steps
            .into_iter()
            .map(|step| HistoryStep {
                step_type: step.payload.step_type,
                content: match step.payload.content {
                    Value::Null => None,
                    Value::String(content) => Some(content),
                    other => Some(other.to_string()),
                },
                created_at: step.created_at,
            })
            .collect())
    }

    /// Lists the knowledge bases visible to the token.
    pub async fn list_knowledge_bases(
        &self,
    ) -> Result<Vec<KnowledgeBase>, Error> {
        let value = self.get_json("/knowledge", &[]).await?;
        Ok(decode::<KnowledgeBases>(value)?.knowledge_bases)
    }

    /// Creates a knowledge base.
    pub async fn create_knowledge_base(
        &self,
        knowledge_base: &KnowledgeBase,
    ) -> Result<(), Error> {
        let body = NewKnowledgeBase {
            data: knowledge_base,
        };
        self.send_json(Method::PUT, "/knowledge", &body).await?;
        Ok(())
    }

    /// Uploads a document into a knowledge base.
    pub async fn upload_document(
        &self,
        document: &NewDocument,
    ) -> Result<(), Error> {
        self.send_json(Method::PUT, "/knowledge/document", document)
            .await?;
        Ok(())
    }

    /// Retrieves the chunks closest in meaning to the query.
    pub async fn semantic_search(
        &self,
        query: &SemanticQuery,
    ) -> Result<Vec<SearchHit>, Error> {
        let value = self
            .send_json(Method::POST, "/knowledge/documents/semantic", query)
            .await?;
        Ok(decode::<RetrievedChunks>(value)?.retrieved_chunks)
    }

    /// Retrieves the chunks containing the exact text.
    pub async fn exact_search(
        &self,
        query: &ExactQuery,
    ) -> Result<Vec<SearchHit>, Error> {
        let value = self
            .send_json(Method::POST, "/knowledge/documents/exact", query)
            .await?;
        Ok(decode::<RetrievedChunks>(value)?.retrieved_chunks)
    }

    /// Asks a question, returning `None` if no answer was found.
    pub async fn ask(
        &self,
        question: &Question,
    ) -> Result<Option<String>, Error> {
        let value = self
            .send_json(Method::POST, "/knowledge/documents/ask", question)
            .await?;
        Ok(decode::<Answer>(value)?.answer)
    }
}

#[inline]
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value).map_err(Error::unrecognized_shape)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_agents() {
        let records: Records<AgentSummary> = decode(json!({
            "Records": [
                { "Agent_ID": 7, "Agent_Name": "Helper", "description": "Helps" },
                { "Agent_ID": "a2", "Agent_Name": "Quiet" }
            ]
        }))
        .unwrap();
        assert_eq!(
            records.records,
            [
                AgentSummary {
                    id: "7".to_owned(),
                    name: "Helper".to_owned(),
                    description: Some("Helps".to_owned()),
                },
                AgentSummary {
                    id: "a2".to_owned(),
                    name: "Quiet".to_owned(),
                    description: None,
                },
            ]
        );

        let records: Records<AgentSummary> = decode(json!({})).unwrap();
        assert!(records.records.is_empty());
    }

    #[test]
    fn test_request_bodies() {
        let agent = NewAgent {
            name: "Helper".to_owned(),
            description: "Helps".to_owned(),
            instructions: "Be brief".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&agent).unwrap(),
            json!({
                "agent_name": "Helper",
                "agent_description": "Helps",
                "agent_instruction": "Be brief"
            })
        );

        let query = ExactQuery {
            text: "invoice".to_owned(),
            knowledge_base_ids: vec!["kb1".to_owned()],
            count: 3,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "text": "invoice",
                "knowledge_base_ids_to_query": ["kb1"],
                "num_of_chunks_to_retrieve": 3
            })
        );

        let kb = KnowledgeBase {
            knowledge_base_id: "kb1".to_owned(),
            name: "Docs".to_owned(),
            description: Some("All docs".to_owned()),
        };
        assert_eq!(
            serde_json::to_value(NewKnowledgeBase { data: &kb }).unwrap(),
            json!({
                "data": {
                    "knowledge_base_id": "kb1",
                    "name": "Docs",
                    "description": "All docs"
                }
            })
        );
    }
}

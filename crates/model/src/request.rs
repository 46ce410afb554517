use serde::{Deserialize, Serialize};

/// A request to be sent to the agent chat endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The agent that should answer.
    pub agent_id: String,
    /// The chat this request belongs to. `None` asks the backend to start
    /// a new chat.
    pub chat_id: Option<String>,
    /// The steps submitted in this request.
    pub steps: Vec<IncomingStep>,
}

impl ChatRequest {
    /// Creates a request carrying a message typed by the user.
    #[inline]
    pub fn human_message(
        agent_id: impl Into<String>,
        chat_id: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            chat_id,
            steps: vec![IncomingStep::HumanMessage {
                content: content.into(),
            }],
        }
    }

    /// Creates a request that feeds a tool result back to the agent.
    #[inline]
    pub fn tool_execution_response(
        agent_id: impl Into<String>,
        chat_id: Option<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            chat_id,
            steps: vec![IncomingStep::ToolExecutionResponse {
                tool_call_id: tool_call_id.into(),
                content: content.into(),
            }],
        }
    }

    /// Returns the tool call ids this request acknowledges.
    pub fn acknowledged_tool_calls(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            IncomingStep::ToolExecutionResponse { tool_call_id, .. } => {
                Some(tool_call_id.as_str())
            }
            IncomingStep::HumanMessage { .. } => None,
        })
    }
}

/// A single step submitted to the chat endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomingStep {
    /// A message typed by the user.
    HumanMessage {
        /// The message text.
        content: String,
    },
    /// The result of a tool call the agent asked for.
    ToolExecutionResponse {
        /// The id of the tool call being answered.
        tool_call_id: String,
        /// The tool's output as text.
        content: String,
    },
}

use agent_console_model::{
    ChatRequest, ChatTurnResponse, ErrorKind, IncomingStep, ResponseSegment,
    ToolCall,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::Error;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatSendResponse {
    pub agent_response: Option<Vec<Segment>>,
    #[serde(default, deserialize_with = "opt_string_id")]
    pub chat_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Segment {
    pub content: Option<String>,
    #[serde(default, deserialize_with = "opt_string_id")]
    pub tool_call_id: Option<String>,
    pub tool_call_name: Option<String>,
    #[serde(rename = "APIM_VERB")]
    pub verb: Option<String>,
    #[serde(rename = "APIM_ENDPOINT")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub args: Value,
    #[serde(
        rename = "Function_registry_id",
        default,
        deserialize_with = "opt_string_id"
    )]
    pub function_registry_id: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatSendRequest<'a> {
    agent_id: &'a str,
    user_email: &'a str,
    incoming_steps: Vec<StepEnvelope<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chat_id: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct StepEnvelope<'a> {
    payload: StepPayload<'a>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "step_type", rename_all = "snake_case")]
enum StepPayload<'a> {
    HumanMessage {
        content: &'a str,
    },
    ToolExecutionResponse {
        tool_call_id: &'a str,
        content: &'a str,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecuteToolRequest<'a> {
    verb: &'a str,
    endpoint: &'a str,
    tool_call_id: &'a str,
    tool_call_name: &'a str,
    args: &'a Value,
    function_registry_id: Option<&'a str>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_chat_request<'a>(
    req: &'a ChatRequest,
    user_email: &'a str,
) -> ChatSendRequest<'a> {
    ChatSendRequest {
        agent_id: &req.agent_id,
        user_email,
        incoming_steps: req.steps.iter().map(create_step).collect(),
        chat_id: req.chat_id.as_deref(),
    }
}

#[inline]
fn create_step(step: &IncomingStep) -> StepEnvelope<'_> {
    let payload = match step {
        IncomingStep::HumanMessage { content } => StepPayload::HumanMessage {
            content: content.as_str(),
        },
        IncomingStep::ToolExecutionResponse {
            tool_call_id,
            content,
        } => StepPayload::ToolExecutionResponse {
            tool_call_id: tool_call_id.as_str(),
            content: content.as_str(),
        },
    };
    StepEnvelope { payload }
}

#[inline]
pub fn create_execute_request(call: &ToolCall) -> ExecuteToolRequest<'_> {
    ExecuteToolRequest {
        verb: &call.verb,
        endpoint: &call.endpoint,
        tool_call_id: &call.id,
        tool_call_name: &call.name,
        args: &call.args,
        function_registry_id: call.function_registry_id.as_deref(),
    }
}

pub fn parse_chat_response(value: Value) -> Result<ChatTurnResponse, Error> {
    let resp: ChatSendResponse =
        serde_json::from_value(value).map_err(Error::unrecognized_shape)?;
    let Some(segments) = resp.agent_response else {
        return Err(Error::new(
            "no `agent_response` in the response",
            ErrorKind::MissingField,
        ));
    };
    let segments = segments
        .into_iter()
        .enumerate()
        .map(|(idx, segment)| parse_segment(idx, segment))
        .collect::<Result<_, _>>()?;
    Ok(ChatTurnResponse {
        segments,
        chat_id: resp.chat_id,
    })
}

fn parse_segment(
    idx: usize,
    segment: Segment,
) -> Result<ResponseSegment, Error> {
    let tool_call = match segment.tool_call_id {
        Some(id) => {
            let missing = |field: &str| {
                Error::new(
                    format!("tool call {id} has no `{field}`"),
                    ErrorKind::MissingField,
                )
            };
            Some(ToolCall {
                name: segment
                    .tool_call_name
                    .ok_or_else(|| missing("tool_call_name"))?,
                verb: segment.verb.ok_or_else(|| missing("APIM_VERB"))?,
                endpoint: segment
                    .endpoint
                    .ok_or_else(|| missing("APIM_ENDPOINT"))?,
                args: segment.args,
                function_registry_id: segment.function_registry_id,
                id,
            })
        }
        None => None,
    };
    ResponseSegment::from_parts(segment.content, tool_call).ok_or_else(|| {
        Error::new(
            format!("segment {idx} has neither content nor a tool call"),
            ErrorKind::UnrecognizedShape,
        )
    })
}

/// Reads an identifier that the server may send as a string or a number.
pub fn string_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("invalid id: {other}"))),
    }
}

/// Like [`string_id`], but also accepts `null`.
pub fn opt_string_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    use serde::de::Error as _;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(id)),
        Value::Number(id) => Ok(Some(id.to_string())),
        other => Err(D::Error::custom(format!("invalid id: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_chat_request() {
        let req = ChatRequest::human_message("a1", None, "hi");
        let body =
            serde_json::to_value(create_chat_request(&req, "me@example.com"))
                .unwrap();
        assert_eq!(
            body,
            json!({
                "agent_id": "a1",
                "user_email": "me@example.com",
                "incoming_steps": [{
                    "payload": { "step_type": "human_message", "content": "hi" }
                }]
            })
        );

        let req = ChatRequest::tool_execution_response(
            "a1",
            Some("c1".to_owned()),
            "t1",
            "42",
        );
        let body =
            serde_json::to_value(create_chat_request(&req, "me@example.com"))
                .unwrap();
        assert_eq!(
            body,
            json!({
                "agent_id": "a1",
                "user_email": "me@example.com",
                "incoming_steps": [{
                    "payload": {
                        "step_type": "tool_execution_response",
                        "tool_call_id": "t1",
                        "content": "42"
                    }
                }],
                "chat_id": "c1"
            })
        );
    }

    #[test]
    fn test_create_execute_request() {
        let call = ToolCall {
            id: "t1".to_owned(),
            name: "lookup".to_owned(),
            verb: "GET".to_owned(),
            endpoint: "/x".to_owned(),
            args: json!({ "q": "rust" }),
            function_registry_id: None,
        };
        let body = serde_json::to_value(create_execute_request(&call)).unwrap();
        assert_eq!(
            body,
            json!({
                "verb": "GET",
                "endpoint": "/x",
                "tool_call_id": "t1",
                "tool_call_name": "lookup",
                "args": { "q": "rust" },
                "function_registry_id": null
            })
        );
    }

    #[test]
    fn test_parse_chat_response() {
        let resp = parse_chat_response(json!({
            "agent_response": [
                { "content": "Let me check" },
                {
                    "tool_call_id": 5,
                    "tool_call_name": "lookup",
                    "APIM_VERB": "GET",
                    "APIM_ENDPOINT": "/x",
                    "Function_registry_id": 12
                },
                {
                    "content": "Also this",
                    "tool_call_id": "t2",
                    "tool_call_name": "weather",
                    "APIM_VERB": "POST",
                    "APIM_ENDPOINT": "/weather",
                    "args": { "city": "Oslo" },
                    "Function_registry_id": "r1"
                }
            ],
            "chat_id": 17
        }))
        .unwrap();

        assert_eq!(resp.chat_id.as_deref(), Some("17"));
        assert_eq!(resp.segments.len(), 3);
        assert_eq!(
            resp.segments[0],
            ResponseSegment::Text("Let me check".to_owned())
        );
        let call = resp.segments[1].tool_call().unwrap();
        assert_eq!(call.id, "5");
        assert_eq!(call.name, "lookup");
        assert_eq!(call.function_registry_id.as_deref(), Some("12"));
        assert_eq!(call.args, Value::Null);
        assert_eq!(resp.segments[2].text(), Some("Also this"));
        let call = resp.segments[2].tool_call().unwrap();
        assert_eq!(call.function_registry_id.as_deref(), Some("r1"));
        assert_eq!(call.args, json!({ "city": "Oslo" }));
    }

    #[test]
    fn test_parse_chat_response_errors() {
        let kind = |value| parse_chat_response(value).unwrap_err().kind;

        assert_eq!(kind(json!({ "chat_id": "c1" })), ErrorKind::MissingField);
        assert_eq!(
            kind(json!({ "agent_response": [{}] })),
            ErrorKind::UnrecognizedShape
        );
        assert_eq!(
            kind(json!({ "agent_response": [{ "tool_call_id": "t1" }] })),
            ErrorKind::MissingField
        );
        assert_eq!(
            kind(json!({ "agent_response": "oops" })),
            ErrorKind::UnrecognizedShape
        );
    }
}

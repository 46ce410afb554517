use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The agent's answer to one chat request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    /// Segments in the order the agent produced them.
    pub segments: Vec<ResponseSegment>,
    /// The chat id, usually present only when the request started a new
    /// chat.
    pub chat_id: Option<String>,
}

impl ChatTurnResponse {
    /// Creates a response with the specified segments.
    #[inline]
    pub fn with_segments(segments: impl Into<Vec<ResponseSegment>>) -> Self {
        Self {
            segments: segments.into(),
            chat_id: None,
        }
    }

    /// Attaches a chat id to the response.
    #[inline]
    pub fn with_chat_id<S: Into<String>>(mut self, chat_id: S) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Returns `true` if the agent asked for any tool call.
    pub fn has_tool_calls(&self) -> bool {
        self.segments.iter().any(|s| s.tool_call().is_some())
    }
}

/// A piece of an agent's answer.
///
/// A segment may carry text, a tool call, or both at once. A segment
/// carrying neither can't be represented.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResponseSegment {
    /// Text to show to the user.
    Text(String),
    /// A request to invoke an external tool.
    ToolCall(ToolCall),
    /// Text and a tool call in the same segment.
    TextWithToolCall {
        /// Text to show to the user.
        text: String,
        /// The tool call to execute.
        tool_call: ToolCall,
    },
}

impl ResponseSegment {
    /// Builds a segment from its optional parts, returning `None` when
    /// both parts are absent.
    pub fn from_parts(
        text: Option<String>,
        tool_call: Option<ToolCall>,
    ) -> Option<Self> {
        match (text, tool_call) {
            (Some(text), Some(tool_call)) => {
                Some(Self::TextWithToolCall { text, tool_call })
            }
            (Some(text), None) => Some(Self::Text(text)),
            (None, Some(tool_call)) => Some(Self::ToolCall(tool_call)),
            (None, None) => None,
        }
    }

    /// Returns the text of this segment, if any.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::TextWithToolCall { text, .. } => {
                Some(text)
            }
            Self::ToolCall(_) => None,
        }
    }

    /// Returns the tool call of this segment, if any.
    #[inline]
    pub fn tool_call(&self) -> Option<&ToolCall> {
        match self {
            Self::ToolCall(tool_call)
            | Self::TextWithToolCall { tool_call, .. } => Some(tool_call),
            Self::Text(_) => None,
        }
    }
}

/// Describes a tool call request from the agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The HTTP verb the executor should use.
    pub verb: String,
    /// The endpoint path the executor should call.
    pub endpoint: String,
    /// The arguments to pass to the tool.
    #[serde(default)]
    pub args: Value,
    /// The function registry the tool belongs to.
    #[serde(default)]
    pub function_registry_id: Option<String>,
}

/// The opaque result of executing a tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolOutput(pub Value);

impl ToolOutput {
    /// Converts the output to the text fed back to the agent.
    ///
    /// JSON strings are passed through as-is, any other value is encoded
    /// as compact JSON.
    pub fn into_content(self) -> String {
        match self.0 {
            Value::String(text) => text,
            other => other.to_string(),
        }
    }
}

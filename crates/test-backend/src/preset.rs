use agent_console_model::{ChatTurnResponse, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the scripted backend answers one chat request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ChatReply {
    /// Answer with the given response.
    Respond(ChatTurnResponse),
    /// Fail with an error of the given kind.
    Fail(ErrorKind),
}

/// How the scripted backend answers one tool execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ToolReply {
    /// Return the given value as the tool output.
    Return(Value),
    /// Fail with an error of the given kind.
    Fail(ErrorKind),
}

/// A complete script, loadable from JSON fixtures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Replies to chat requests, consumed in request order.
    #[serde(default)]
    pub chat: Vec<ChatReply>,
    /// Replies to tool executions, consumed in execution order.
    #[serde(default)]
    pub tools: Vec<ToolReply>,
}

use std::error::Error;
use std::fmt::{self, Display};

use agent_console_model::{BackendError, ErrorKind};

/// What happened during a completed turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// The number of rounds processed.
    pub rounds: usize,
    /// The number of requests sent to the chat endpoint.
    pub chat_requests: usize,
    /// The number of tool executions requested.
    pub tool_executions: usize,
    /// Requests that failed, in the order they failed.
    pub failures: Vec<TurnFailure>,
}

impl TurnSummary {
    /// Returns `true` if every request of the turn succeeded.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Where in a turn a request failed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// Sending the user message.
    SendMessage,
    /// Executing a tool call.
    ExecuteTool {
        /// The failed tool call.
        tool_call_id: String,
    },
    /// Feeding a tool result back to the agent.
    SendToolResult {
        /// The tool call being answered.
        tool_call_id: String,
    },
}

impl Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::SendMessage => write!(f, "sending the message"),
            FailureStage::ExecuteTool { tool_call_id } => {
                write!(f, "executing tool call {tool_call_id}")
            }
            FailureStage::SendToolResult { tool_call_id } => {
                write!(f, "sending the result of tool call {tool_call_id}")
            }
        }
    }
}

/// A request that failed during a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnFailure {
    /// Where the failure happened.
    pub stage: FailureStage,
    /// The kind of backend error.
    pub kind: ErrorKind,
    /// The error message reported by the backend.
    pub message: String,
}

impl TurnFailure {
    pub(crate) fn new(stage: FailureStage, err: &dyn BackendError) -> Self {
        Self {
            stage,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl Display for TurnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.stage, self.kind, self.message)
    }
}

/// An error that ends a turn early.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnError {
    /// The agent kept asking for tools past the round limit.
    RoundLimitExceeded {
        /// The number of rounds processed.
        rounds: usize,
        /// Tool calls that were left unexecuted.
        unresolved_tool_calls: usize,
    },
}

impl Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::RoundLimitExceeded {
                rounds,
                unresolved_tool_calls,
            } => write!(
                f,
                "agent still wants {unresolved_tool_calls} tool call(s) \
                 after {rounds} rounds"
            ),
        }
    }
}

impl Error for TurnError {}

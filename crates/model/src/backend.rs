use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ChatRequest;
use crate::response::{ChatTurnResponse, ToolCall, ToolOutput};

/// The error type for an agent backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that reaches the agent platform: the chat endpoint that agents
/// answer through, and the tool executor that performs tool calls on the
/// operator's behalf.
///
/// Once the backend is created, it should behave like a stateless object.
/// All conversation state (the chat id, the transcript) lives with the
/// caller and travels in each request.
pub trait AgentBackend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Submits one chat request and returns the agent's answer.
    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static;

    /// Executes a tool call requested by the agent.
    fn execute_tool(
        &self,
        call: &ToolCall,
    ) -> impl Future<Output = Result<ToolOutput, Self::Error>> + Send + 'static;
}

mod builder;
mod outcome;

use agent_console_model::{
    BackendError, ChatRequest, ResponseSegment, ToolCall,
};
use serde_json::json;
use tracing::Instrument;

use crate::backend_client::BackendClient;
use crate::session::ChatSession;
use crate::transcript::{Role, TranscriptEntry};
pub use builder::{ChatDriverBuilder, DEFAULT_MAX_ROUNDS};
pub use outcome::{FailureStage, TurnError, TurnFailure, TurnSummary};

/// Drives chat turns against a backend.
///
/// A turn starts with one user message and ends when the agent has spoken
/// and no tool call is left pending. Every tool call the agent asks for is
/// executed, and its result is fed back to the agent. The answers to those
/// follow-ups form the next round, until a round asks for no more tools.
///
/// Requests are strictly sequential: no request is sent before the
/// previous one has been answered. A failing request never aborts the
/// turn, it is recorded in the [`TurnSummary`] and its branch contributes
/// nothing to the next round.
pub struct ChatDriver {
    client: BackendClient,
    max_rounds: usize,
    on_transcript: Option<Box<dyn Fn(&TranscriptEntry) + Send + Sync>>,
}

impl ChatDriver {
    /// Runs one turn of the conversation held by `session`.
    ///
    /// The user message, the agent's text and a marker for every executed
    /// tool are appended to the session transcript in the order they
    /// occur. The session adopts the chat id from the first response that
    /// carries one.
    ///
    /// # Errors
    ///
    /// Returns [`TurnError::RoundLimitExceeded`] if the agent still asks
    /// for tools after the configured number of rounds. The transcript
    /// keeps everything appended before that, including the texts of the
    /// batch whose tool calls were left unexecuted.
    pub async fn run_turn(
        &self,
        session: &mut ChatSession,
        message: &str,
    ) -> Result<TurnSummary, TurnError> {
        let span = debug_span!("turn", agent_id = session.agent_id());
        self.drive(session, message).instrument(span).await
    }

    async fn drive(
        &self,
        session: &mut ChatSession,
        message: &str,
    ) -> Result<TurnSummary, TurnError> {
        let mut summary = TurnSummary::default();
        self.append(session, Role::User, message.to_owned());

        let req = ChatRequest::human_message(
            session.agent_id(),
            session.chat_id().map(ToOwned::to_owned),
            message,
        );
        let mut pending = self
            .send_chat(session, req, FailureStage::SendMessage, &mut summary)
            .await;

        while !pending.is_empty() {
            let unresolved_tool_calls = pending
                .iter()
                .filter(|segment| segment.tool_call().is_some())
                .count();
            if unresolved_tool_calls > 0 && summary.rounds >= self.max_rounds {
                // The texts are kept even though the calls are not run.
                for text in pending.iter().filter_map(ResponseSegment::text) {
                    self.append(session, Role::Assistant, text.to_owned());
                }
                warn!(
                    "giving up after {} rounds, {unresolved_tool_calls} \
                     tool call(s) left",
                    summary.rounds
                );
                return Err(TurnError::RoundLimitExceeded {
                    rounds: summary.rounds,
                    unresolved_tool_calls,
                });
            }

            summary.rounds += 1;
            debug!(
                "round {} with {} segment(s)",
                summary.rounds,
                pending.len()
            );
            pending = self.run_round(session, pending, &mut summary).await;
        }

        trace!("finished a turn: {summary:?}");
        Ok(summary)
    }

    /// Processes one batch of segments and returns the segments of every
    /// follow-up it sent.
    async fn run_round(
        &self,
        session: &mut ChatSession,
        batch: Vec<ResponseSegment>,
        summary: &mut TurnSummary,
    ) -> Vec<ResponseSegment> {
        let mut next_batch = Vec::new();
        for segment in batch {
            if let Some(text) = segment.text() {
                self.append(session, Role::Assistant, text.to_owned());
            }
            let Some(call) = segment.tool_call() else {
                continue;
            };

            let content = self.execute_tool(call, summary).await;
            self.append(
                session,
                Role::Assistant,
                format!("`Executed function - {}`", call.name),
            );

            let req = ChatRequest::tool_execution_response(
                session.agent_id(),
                session.chat_id().map(ToOwned::to_owned),
                &call.id,
                content,
            );
            let stage = FailureStage::SendToolResult {
                tool_call_id: call.id.clone(),
            };
            let segments = self.send_chat(session, req, stage, summary).await;
            next_batch.extend(segments);
        }
        next_batch
    }

    async fn send_chat(
        &self,
        session: &mut ChatSession,
        req: ChatRequest,
        stage: FailureStage,
        summary: &mut TurnSummary,
    ) -> Vec<ResponseSegment> {
        summary.chat_requests += 1;
        match self.client.send_chat(req).await {
            Ok(resp) => {
                if let Some(chat_id) = resp.chat_id {
                    session.adopt_chat_id(chat_id);
                }
                resp.segments
            }
            Err(err) => {
                warn!("{stage} failed: {err}");
                summary.failures.push(TurnFailure::new(stage, &*err));
                vec![]
            }
        }
    }

    /// Executes a tool call and returns the content to feed back.
    ///
    /// A failed execution is still answered, with an error document as the
    /// content, so the agent is never left waiting on the call.
    async fn execute_tool(
        &self,
        call: &ToolCall,
        summary: &mut TurnSummary,
    ) -> String {
        summary.tool_executions += 1;
        match self.client.execute_tool(call.clone()).await {
            Ok(output) => output.into_content(),
            Err(err) => {
                let stage = FailureStage::ExecuteTool {
                    tool_call_id: call.id.clone(),
                };
                warn!("{stage} failed: {err}");
                let content = error_document(&*err);
                summary.failures.push(TurnFailure::new(stage, &*err));
                content
            }
        }
    }

    fn append(&self, session: &mut ChatSession, role: Role, content: String) {
        let entry = session.append(role, content);
        if let Some(on_transcript) = &self.on_transcript {
            on_transcript(entry);
        }
    }
}

#[inline]
fn error_document(err: &dyn BackendError) -> String {
    json!({ "error": err.to_string() }).to_string()
}

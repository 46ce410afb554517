//! A local fake backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use agent_console_model::{
    AgentBackend, BackendError, ChatRequest, ChatTurnResponse, ErrorKind,
    ToolCall, ToolOutput,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct State {
    chat_replies: VecDeque<ChatReply>,
    repeated_chat_reply: Option<ChatReply>,
    tool_replies: VecDeque<ToolReply>,
    chat_requests: Vec<ChatRequest>,
    tool_calls: Vec<ToolCall>,
}

/// A local fake backend for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// backend should answer. Chat replies and tool replies are consumed in the
/// order requests arrive. If the script runs out of replies, an error is
/// returned, unless a repeated chat reply has been set.
///
/// Every request is recorded, so tests can assert on what the caller sent.
/// Clones share the same script and records.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<State>>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    /// Creates a backend that plays the given script.
    pub fn with_script(script: Script) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.lock();
            state.chat_replies.extend(script.chat);
            state.tool_replies.extend(script.tools);
        }
        backend
    }

    #[inline]
    pub fn add_chat_response(&self, response: ChatTurnResponse) {
        self.add_chat_reply(ChatReply::Respond(response));
    }

    #[inline]
    pub fn add_chat_reply(&self, reply: ChatReply) {
        self.lock().chat_replies.push_back(reply);
    }

    /// Sets a reply that is used whenever the chat script is exhausted.
    #[inline]
    pub fn repeat_chat_reply(&self, reply: ChatReply) {
        self.lock().repeated_chat_reply = Some(reply);
    }

    #[inline]
    pub fn add_tool_reply(&self, reply: ToolReply) {
        self.lock().tool_replies.push_back(reply);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every chat request received so far, in order.
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.lock().chat_requests.clone()
    }

    /// Returns every tool call executed so far, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.lock().tool_calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking test thread must not hide the records from others.
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Debug for ScriptedBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ScriptedBackend")
            .field("pending_chat_replies", &state.chat_replies.len())
            .field("pending_tool_replies", &state.tool_replies.len())
            .field("delay", &self.delay)
            .finish()
    }
}

impl AgentBackend for ScriptedBackend {
    type Error = crate::Error;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static
    {
        let reply = {
            let mut state = self.lock();
            state.chat_requests.push(req.clone());
            state
                .chat_replies
                .pop_front()
                .or_else(|| state.repeated_chat_reply.clone())
        };
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match reply {
                Some(ChatReply::Respond(resp)) => Ok(resp),
                Some(ChatReply::Fail(kind)) => Err(Error {
                    message: "scripted chat failure",
                    kind,
                }),
                None => Err(Error {
                    message: "no enough chat replies",
                    kind: ErrorKind::ErrorResponse,
                }),
            }
        }
    }

    fn execute_tool(
        &self,
        call: &ToolCall,
    ) -> impl Future<Output = Result<ToolOutput, Self::Error>> + Send + 'static
    {
        let reply = {
            let mut state = self.lock();
            state.tool_calls.push(call.clone());
            state.tool_replies.pop_front()
        };
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }
            match reply {
                Some(ToolReply::Return(value)) => Ok(ToolOutput(value)),
                Some(ToolReply::Fail(kind)) => Err(Error {
                    message: "scripted tool failure",
                    kind,
                }),
                None => Err(Error {
                    message: "no enough tool replies",
                    kind: ErrorKind::ErrorResponse,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use agent_console_model::ResponseSegment;
    use serde_json::json;

    use super::*;

    fn text_response(text: &str) -> ChatTurnResponse {
        ChatTurnResponse::with_segments([ResponseSegment::Text(
            text.to_owned(),
        )])
    }

    #[tokio::test]
    async fn test_replies_in_order() {
        let mut backend = ScriptedBackend::default();
        backend.set_delay(Duration::from_millis(1));
        backend.add_chat_response(text_response("first").with_chat_id("c1"));
        backend.add_chat_reply(ChatReply::Fail(ErrorKind::NotJson));

        let req = ChatRequest::human_message("a1", None, "hi");
        let resp = backend.send_chat(&req).await.unwrap();
        assert_eq!(resp.chat_id.as_deref(), Some("c1"));
        assert_eq!(resp.segments[0].text(), Some("first"));

        let err = backend.send_chat(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotJson);

        // The script is exhausted.
        let err = backend.send_chat(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ErrorResponse);

        assert_eq!(backend.chat_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_reply() {
        let backend = ScriptedBackend::default();
        backend.add_chat_response(text_response("once"));
        backend.repeat_chat_reply(ChatReply::Respond(text_response("again")));

        let req = ChatRequest::human_message("a1", None, "hi");
        let texts = [
            backend.send_chat(&req).await.unwrap(),
            backend.send_chat(&req).await.unwrap(),
            backend.send_chat(&req).await.unwrap(),
        ]
        .map(|resp| resp.segments[0].text().unwrap_or_default().to_owned());
        assert_eq!(texts, ["once", "again", "again"]);
    }

    #[tokio::test]
    async fn test_tool_replies() {
        let backend = ScriptedBackend::with_script(Script {
            chat: vec![],
            tools: vec![
                ToolReply::Return(json!({ "ok": true })),
                ToolReply::Fail(ErrorKind::Transport),
            ],
        });
        let call = ToolCall {
            id: "t1".to_owned(),
            name: "lookup".to_owned(),
            verb: "GET".to_owned(),
            endpoint: "/x".to_owned(),
            args: json!({ "q": 1 }),
            function_registry_id: Some("r1".to_owned()),
        };

        let output = backend.execute_tool(&call).await.unwrap();
        assert_eq!(output, ToolOutput(json!({ "ok": true })));

        let err = backend.execute_tool(&call).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let recorded = backend.tool_calls();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0], call);
    }
}

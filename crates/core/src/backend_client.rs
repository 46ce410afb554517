use std::pin::Pin;
use std::sync::Arc;

use agent_console_model::{
    AgentBackend, BackendError, ChatRequest, ChatTurnResponse, ToolCall,
    ToolOutput,
};
use tracing::Instrument;

type BackendResult<T> = Result<T, Box<dyn BackendError>>;
type BoxedFuture<T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send>>;
type SendChatFn =
    Arc<dyn Fn(ChatRequest) -> BoxedFuture<ChatTurnResponse> + Send + Sync>;
type ExecuteToolFn =
    Arc<dyn Fn(ToolCall) -> BoxedFuture<ToolOutput> + Send + Sync>;

/// A wrapper around a backend that provides a type-erased interface for
/// the other modules.
#[derive(Clone)]
pub struct BackendClient {
    send_chat_fn: SendChatFn,
    execute_tool_fn: ExecuteToolFn,
}

impl BackendClient {
    pub fn new<B: AgentBackend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since `BackendClient` doesn't have
        // a generic parameter and we don't want it either.
        let backend = Arc::new(backend);

        let send_chat_fn: SendChatFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move |req| {
                let fut = backend.send_chat(&req);
                Box::pin(
                    async move {
                        trace!("got a request: {req:?}");
                        let resp = fut.await.map_err(erase::<B>)?;
                        trace!("got {} segment(s)", resp.segments.len());
                        Ok(resp)
                    }
                    .instrument(trace_span!("chat send")),
                )
            })
        };

        let execute_tool_fn: ExecuteToolFn = Arc::new(move |call| {
            let fut = backend.execute_tool(&call);
            Box::pin(
                async move {
                    trace!(
                        "executing tool ({}): {} {}",
                        call.id,
                        call.verb,
                        call.endpoint
                    );
                    fut.await.map_err(erase::<B>)
                }
                .instrument(trace_span!("tool execute")),
            )
        });

        Self {
            send_chat_fn,
            execute_tool_fn,
        }
    }

    /// Sends a chat request and returns the agent's answer.
    #[inline]
    pub async fn send_chat(
        &self,
        req: ChatRequest,
    ) -> BackendResult<ChatTurnResponse> {
        (self.send_chat_fn)(req).await
    }

    /// Executes a tool call and returns its output.
    #[inline]
    pub async fn execute_tool(
        &self,
        call: ToolCall,
    ) -> BackendResult<ToolOutput> {
        (self.execute_tool_fn)(call).await
    }
}

fn erase<B: AgentBackend>(err: B::Error) -> Box<dyn BackendError> {
    debug!("got an error: {err:?}");
    Box::new(err)
}

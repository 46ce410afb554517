use agent_console_model::AgentBackend;

use super::ChatDriver;
use crate::backend_client::BackendClient;
use crate::transcript::TranscriptEntry;

/// The number of rounds a turn may take unless configured otherwise.
pub const DEFAULT_MAX_ROUNDS: usize = 16;

/// [`ChatDriver`] builder.
pub struct ChatDriverBuilder {
    client: BackendClient,
    max_rounds: usize,
    on_transcript: Option<Box<dyn Fn(&TranscriptEntry) + Send + Sync>>,
}

impl ChatDriverBuilder {
    /// Creates a new builder with the specified backend.
    #[inline]
    pub fn with_backend<B: AgentBackend + 'static>(backend: B) -> Self {
        Self {
            client: BackendClient::new(backend),
            max_rounds: DEFAULT_MAX_ROUNDS,
            on_transcript: None,
        }
    }

    /// Sets how many tool-call rounds a single turn may take.
    #[inline]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Attaches a callback to be invoked whenever an entry is appended to
    /// the transcript during a turn.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&TranscriptEntry) + Send + Sync + 'static,
    ) -> Self {
        self.on_transcript = Some(Box::new(on_transcript));
        self
    }

    /// Builds the driver.
    #[inline]
    pub fn build(self) -> ChatDriver {
        let Self {
            client,
            max_rounds,
            on_transcript,
        } = self;
        ChatDriver {
            client,
            max_rounds,
            on_transcript,
        }
    }
}

//! Core logic of the console: the tool-call resolution loop, the chat
//! session context, and transcripts.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod backend_client;
mod driver;
mod session;
pub mod transcript;

pub use driver::{
    ChatDriver, ChatDriverBuilder, DEFAULT_MAX_ROUNDS, FailureStage,
    TurnError, TurnFailure, TurnSummary,
};
pub use session::ChatSession;
pub use transcript::{Role, Transcript, TranscriptEntry};

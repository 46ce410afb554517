//! Protocol types shared by every layer of the console.
//!
//! This crate describes what goes over the wire between the console and
//! the agent platform: chat requests, the segments an agent answers with,
//! tool calls and their outputs, and server-side chat history. The
//! [`AgentBackend`] trait is the seam through which the core reaches the
//! platform, so the core never depends on a particular transport.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that backend implementors should adhere to.

#![deny(missing_docs)]

mod backend;
mod error;
mod history;
mod request;
mod response;

pub use backend::*;
pub use error::*;
pub use history::*;
pub use request::*;
pub use response::*;

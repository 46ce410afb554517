//! A terminal console for agents hosted behind a chat API.
//!
//! The crate includes a CLI tool for using in the terminal. It can also be
//! used as a library: [`Console`] runs parsed [`Command`]s against the
//! service and keeps the session with the selected agent.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod command;
mod console;
mod input;

pub use command::{Command, HELP, ParseError, parse_max_rounds};
pub use console::{Console, ConsoleBuilder, ConsoleError, Output};
pub use input::read_line;

/// Re-exports of [`agent_console_core`] crate.
pub mod core {
    pub use agent_console_core::*;
}

/// Re-exports of [`agent_console_http_backend`] crate.
pub mod backend {
    pub use agent_console_http_backend::*;
}

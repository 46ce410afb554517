use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The kind of error that occurred while talking to the backend.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request never got a response (network failure, bad URL).
    Transport,
    /// The backend answered with a failure status or an error document.
    ErrorResponse,
    /// The response body is not JSON.
    NotJson,
    /// An expected field is absent from the response.
    MissingField,
    /// The response is JSON but has a shape we don't recognize.
    UnrecognizedShape,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::ErrorResponse => write!(f, "Error response"),
            ErrorKind::NotJson => write!(f, "Not JSON"),
            ErrorKind::MissingField => write!(f, "Missing field"),
            ErrorKind::UnrecognizedShape => write!(f, "Unrecognized shape"),
        }
    }
}

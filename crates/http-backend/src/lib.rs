//! A backend for the agent platform's Chat API, over HTTP.
//!
//! Besides the chat and tool endpoints the core drives through
//! [`AgentBackend`], [`HttpBackend`] also exposes the catalog operations
//! of the API: agents, chats and their history, knowledge bases, documents
//! and search.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod catalog;
mod config;
mod io;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use agent_console_model::{
    AgentBackend, BackendError, ChatRequest, ChatTurnResponse, ErrorKind,
    ToolCall, ToolOutput,
};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::Serialize;
use serde_json::Value;

pub use config::{
    ConsoleConfig, ConsoleConfigBuilder, DEFAULT_BASE_URL, DEFAULT_USER_EMAIL,
};
use io::RawResponse;

/// The header carrying the API token.
const API_TOKEN_HEADER: &str = "API-Token";

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        Self::new(format!("{err}"), ErrorKind::Transport)
    }

    fn unrecognized_shape(err: serde_json::Error) -> Self {
        Self::new(format!("{err}"), ErrorKind::UnrecognizedShape)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Chat API backend.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<ConsoleConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    #[inline]
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this backend.
    #[inline]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&format!("{}{path}", self.config.base_url))
            .map_err(|err| {
                Error::new(format!("invalid URL: {err}"), ErrorKind::Transport)
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!("{method} {path}");
        Ok(self
            .client
            .request(method, url)
            .header(API_TOKEN_HEADER, self.config.api_token.as_str())
            .header(header::ACCEPT, "application/json"))
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, Error> {
        let builder = self.request(Method::GET, path, query)?;
        RawResponse::fetch(builder).await?.into_json()
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let builder = self.request(method, path, &[])?.json(body);
        RawResponse::fetch(builder).await?.into_json()
    }
}

impl AgentBackend for HttpBackend {
    type Error = Error;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<ChatTurnResponse, Self::Error>> + Send + 'static
    {
        let body = proto::create_chat_request(req, &self.config.user_email);
        let builder = self
            .request(Method::POST, "/agents/chats/send", &[])
            .map(|builder| builder.json(&body));

        async move {
            let resp = RawResponse::fetch(builder?).await?;
            proto::parse_chat_response(resp.into_json()?)
        }
    }

    fn execute_tool(
        &self,
        call: &ToolCall,
    ) -> impl Future<Output = Result<ToolOutput, Self::Error>> + Send + 'static
    {
        let body = proto::create_execute_request(call);
        let builder = self
            .request(Method::POST, "/tools/execute", &[])
            .map(|builder| builder.json(&body));

        async move {
            let resp = RawResponse::fetch(builder?).await?;
            resp.into_opaque().map(ToolOutput)
        }
    }
}

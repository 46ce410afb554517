use agent_console_model::ErrorKind;
use bytes::Bytes;
use mime::Mime;
use reqwest::{RequestBuilder, StatusCode, header};
use serde_json::{Map, Value};

use crate::Error;

/// A response that has been fully received.
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<Mime>,
    pub body: Bytes,
}

impl RawResponse {
    /// Sends the request and reads the whole body.
    pub async fn fetch(builder: RequestBuilder) -> Result<Self, Error> {
        let resp = builder.send().await.map_err(Error::transport)?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = resp.bytes().await.map_err(Error::transport)?;
        trace!("got {status} with {} byte(s)", body.len());
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    /// Decodes the body as a JSON document, rejecting failure statuses,
    /// non-JSON bodies and error documents.
    pub fn into_json(self) -> Result<Value, Error> {
        self.check_status()?;
        if let Some(content_type) = &self.content_type {
            if !is_json(content_type) {
                return Err(Error::new(
                    format!("unexpected content type: {content_type}"),
                    ErrorKind::NotJson,
                ));
            }
        }
        let value = decode_body(&self.body)?;
        reject_error_document(value)
    }

    /// Decodes the body as an opaque value.
    ///
    /// JSON bodies are parsed, anything else is taken as text. Only a
    /// failure status is an error here.
    pub fn into_opaque(self) -> Result<Value, Error> {
        self.check_status()?;
        let declared_json = self.content_type.as_ref().is_none_or(is_json);
        if declared_json {
            if let Ok(value) = decode_body(&self.body) {
                return Ok(value);
            }
        }
        Ok(Value::String(String::from_utf8_lossy(&self.body).into_owned()))
    }

    fn check_status(&self) -> Result<(), Error> {
        if self.status.is_success() {
            return Ok(());
        }
        let body = String::from_utf8_lossy(&self.body);
        Err(Error::new(
            format!("{}: {}", self.status, body.trim()),
            ErrorKind::ErrorResponse,
        ))
    }
}

#[inline]
fn is_json(content_type: &Mime) -> bool {
    content_type.subtype() == mime::JSON
        || content_type.suffix() == Some(mime::JSON)
}

/// Parses a response body. An empty body is an empty object.
pub fn decode_body(body: &[u8]) -> Result<Value, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|err| {
        Error::new(format!("invalid JSON body: {err}"), ErrorKind::NotJson)
    })
}

/// Turns a document like `{"error": "..."}` into an error.
pub fn reject_error_document(value: Value) -> Result<Value, Error> {
    let Some(err) = value.as_object().and_then(|obj| obj.get("error")) else {
        return Ok(value);
    };
    let message = match err {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    };
    Err(Error::new(message, ErrorKind::ErrorResponse))
}

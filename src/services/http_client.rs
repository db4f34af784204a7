use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Failure of a backend call, carrying the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Non-2xx response; message is the body's `detail` or a generic status line.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("cannot read file: {0}")]
    File(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<JsonValue>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post_json(body: JsonValue) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a JSON request against `base_url + path`.
    pub fn request(&self, path: &str, options: RequestOptions) -> Result<JsonValue, RequestError> {
        let url = self.url(path);
        tracing::debug!(method = %options.method, %url, "request");
        let mut builder = self
            .client
            .request(options.method, &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }
        let resp = builder
            .send()
            .map_err(transport)?;
        finish(resp)
    }

    /// Same contract as [`HttpClient::request`] but sends `file` as multipart form data.
    pub fn upload_file(&self, path: &str, file: &Path) -> Result<JsonValue, RequestError> {
        let url = self.url(path);
        tracing::debug!(%url, file = %file.display(), "upload");
        let form = multipart::Form::new()
            .file("file", file)
            .map_err(|e| RequestError::File(format!("{}: {e}", file.display())))?;
        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(transport)?;
        finish(resp)
    }
}

/// A transport failure with its underlying cause, e.g.
/// "error sending request for url (...): tcp connect error: Connection refused".
fn transport(e: reqwest::Error) -> RequestError {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    RequestError::Transport(message)
}

fn finish(resp: Response) -> Result<JsonValue, RequestError> {
    let status = resp.status();
    let text = resp
        .text()
        .map_err(transport)?;
    if !status.is_success() {
        return Err(error_from_body(status.as_u16(), &text));
    }
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(&text).map_err(|e| RequestError::Decode(e.to_string()))
}

pub(crate) fn error_from_body(status: u16, body: &str) -> RequestError {
    let detail = serde_json::from_str::<JsonValue>(body).ok().and_then(|v| {
        v.get("detail")
            .and_then(|d| d.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    });
    RequestError::Status {
        status,
        message: detail.unwrap_or_else(|| format!("HTTP status {status}")),
    }
}

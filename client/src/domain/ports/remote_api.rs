//! Driven port for calling the remote administration API.
//!
//! The domain owns the request shape and the error taxonomy; adapters own
//! URLs, headers, credentials, and status mapping. Responses are returned as
//! untyped JSON because every synchronizer normalizes records itself.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

/// HTTP verb of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// Read a collection or a single record.
    Get,
    /// Create a record or trigger an action.
    Post,
    /// Replace a record.
    Put,
    /// Remove one record, or a batch when a body is attached.
    Delete,
}

impl ApiMethod {
    /// Upper-case verb as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One call against the remote API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: ApiMethod,
    /// Path below the API base, always starting with `/`.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, path)
    }

    /// `POST path` with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Post, path).with_body(body)
    }

    /// `PUT path` with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Put, path).with_body(body)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Delete, path)
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

define_port_error! {
    /// Errors surfaced by remote API adapters.
    ///
    /// Every variant carries the best-effort human-readable message extracted
    /// from the response body, or a generic fallback.
    pub enum ApiError {
        /// The API rejected the bearer credential (HTTP 401).
        Unauthorized { message: String } =>
            "remote rejected credentials: {message}",
        /// The credential lacks the permission for this call (HTTP 403).
        Forbidden { message: String } =>
            "remote denied access: {message}",
        /// The addressed record does not exist (HTTP 404).
        NotFound { message: String } =>
            "remote resource not found: {message}",
        /// Any other client error, typically validation (HTTP 4xx).
        Rejected { status: u16, message: String } =>
            "remote rejected request ({status}): {message}",
        /// The API failed while handling the call (HTTP 5xx).
        Server { status: u16, message: String } =>
            "remote server error ({status}): {message}",
        /// No response was received.
        Transport { message: String } =>
            "remote transport failed: {message}",
        /// The call exceeded the transport timeout.
        Timeout { message: String } =>
            "remote call timed out: {message}",
        /// The response body was not the expected JSON.
        Decode { message: String } =>
            "remote response decode failed: {message}",
    }
}

impl ApiError {
    /// The human-readable message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::NotFound { message }
            | Self::Rejected { message, .. }
            | Self::Server { message, .. }
            | Self::Transport { message }
            | Self::Timeout { message }
            | Self::Decode { message } => message.as_str(),
        }
    }

    /// HTTP status that produced the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Timeout { .. } | Self::Decode { .. } => None,
        }
    }
}

/// Port for sending requests to the remote API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Send one request and return the decoded JSON body.
    ///
    /// Empty bodies decode to [`Value::Null`].
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

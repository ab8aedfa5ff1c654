//! Reqwest-backed remote API adapter.
//!
//! This adapter owns transport details only: bearer and trace headers,
//! timeout and HTTP error mapping, JSON decoding, and the status side
//! effects on the session (401 clears it) and the auth event sink.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::domain::SessionHandle;
use crate::domain::ports::{ApiError, ApiMethod, ApiRequest, AuthEvent, AuthEventSink, RemoteApi};

/// Header carrying the per-request correlation id.
pub const TRACE_ID_HEADER: &str = "Trace-Id";

/// Remote API adapter sending JSON requests under one base URL.
pub struct HttpRemoteApi {
    client: Client,
    base_url: String,
    session: SessionHandle,
    events: Arc<dyn AuthEventSink>,
}

impl HttpRemoteApi {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// Request paths are appended to `base_url` verbatim, so
    /// `http://host/api/v1` plus `/employees` targets `http://host/api/v1/employees`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: &Url,
        timeout: Duration,
        session: SessionHandle,
        events: Arc<dyn AuthEventSink>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            session,
            events,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|err| ApiError::transport(format!("invalid request url {joined}: {err}")))
    }

    fn map_status_error(&self, status: StatusCode, body: &[u8]) -> ApiError {
        let error = map_status_error(status, body);
        if let Some(event) = AuthEvent::from_status(status.as_u16()) {
            if event == AuthEvent::SessionExpired {
                warn!("remote rejected credentials; clearing session");
                self.session.clear();
            }
            self.events.publish(event);
        }
        error
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let trace_id = Uuid::new_v4();
        let span = info_span!(
            "remote_api",
            method = request.method.as_str(),
            path = %request.path,
            %trace_id,
        );
        async move {
            let url = self.url_for(&request.path)?;
            let mut builder = self
                .client
                .request(method_for(request.method), url)
                .header(CONTENT_TYPE, "application/json")
                .header(TRACE_ID_HEADER, trace_id.to_string());
            if let Some(token) = self.session.token() {
                builder = builder.bearer_auth(token.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(map_transport_error)?;
            let status = response.status();
            let body = response.bytes().await.map_err(map_transport_error)?;
            if !status.is_success() {
                let err = self.map_status_error(status, body.as_ref());
                if status.is_server_error() {
                    error!(status = status.as_u16(), error = %err, "remote call failed");
                } else {
                    debug!(status = status.as_u16(), error = %err, "remote call rejected");
                }
                return Err(err);
            }
            debug!(status = status.as_u16(), bytes = body.len(), "remote call completed");
            decode_body(body.as_ref())
        }
        .instrument(span)
        .await
    }
}

fn method_for(method: ApiMethod) -> Method {
    match method {
        ApiMethod::Get => Method::GET,
        ApiMethod::Post => Method::POST,
        ApiMethod::Put => Method::PUT,
        ApiMethod::Delete => Method::DELETE,
    }
}

fn decode_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| {
        ApiError::decode(format!(
            "invalid JSON payload ({err}): {}",
            body_preview(body)
        ))
    })
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout(error.to_string())
    } else if error.is_decode() {
        ApiError::decode(error.to_string())
    } else {
        ApiError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = extract_message(body)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
    match status {
        StatusCode::UNAUTHORIZED => ApiError::unauthorized(message),
        StatusCode::FORBIDDEN => ApiError::forbidden(message),
        StatusCode::NOT_FOUND => ApiError::not_found(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ApiError::timeout(message),
        _ if status.is_server_error() => ApiError::server(status.as_u16(), message),
        _ => ApiError::rejected(status.as_u16(), message),
    }
}

/// The JSON body's `message`, else its `error`.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"].into_iter().find_map(|key| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    })
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

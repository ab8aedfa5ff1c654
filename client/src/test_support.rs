//! Test utilities for the client crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{ApiError, ApiMethod, ApiRequest, RemoteApi};

type Script = VecDeque<Result<Value, ApiError>>;

/// Remote API double answering from per-route scripts and recording calls.
///
/// Responses queued for the same method and path are returned in order; the
/// last one repeats. Unscripted routes answer with
/// [`ApiError::NotFound`].
///
/// # Examples
/// ```
/// use client::domain::ports::{ApiError, ApiMethod};
/// use client::test_support::ScriptedRemoteApi;
/// use serde_json::json;
///
/// let api = ScriptedRemoteApi::new();
/// api.on(ApiMethod::Get, "/warehouses", json!({ "data": [] }))
///     .fail(ApiMethod::Delete, "/warehouses/9", ApiError::not_found("Warehouse not found"));
/// assert!(api.requests().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ScriptedRemoteApi {
    scripts: Mutex<HashMap<(ApiMethod, String), Script>>,
    requests: Mutex<Vec<ApiRequest>>,
    latency: Option<Duration>,
}

impl ScriptedRemoteApi {
    /// Create an empty double.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, for exercising overlapping calls.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a successful response.
    pub fn on(&self, method: ApiMethod, path: &str, body: Value) -> &Self {
        self.respond(method, path, Ok(body))
    }

    /// Queue a failure.
    pub fn fail(&self, method: ApiMethod, path: &str, error: ApiError) -> &Self {
        self.respond(method, path, Err(error))
    }

    /// Queue any outcome.
    pub fn respond(&self, method: ApiMethod, path: &str, outcome: Result<Value, ApiError>) -> &Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(outcome);
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for `method` and `path`.
    pub fn count(&self, method: ApiMethod, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn next_outcome(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(script) = scripts.get_mut(&(request.method, request.path.clone())) else {
            return Err(ApiError::not_found(format!(
                "no scripted response for {} {}",
                request.method.as_str(),
                request.path
            )));
        };
        if script.len() > 1 {
            script
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::decode("script exhausted")))
        } else {
            script
                .front()
                .cloned()
                .unwrap_or_else(|| Err(ApiError::decode("script exhausted")))
        }
    }
}

#[async_trait]
impl RemoteApi for ScriptedRemoteApi {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let outcome = self.next_outcome(&request);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        outcome
    }
}

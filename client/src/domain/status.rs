//! Loading and last-error state shared by every synchronizer.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::Error;

/// Tracks in-flight calls and the message of the last failure.
///
/// ## Invariants
/// - `is_loading` is true exactly while a [`LoadingGuard`] is alive, on
///   every exit path including early returns and dropped futures.
/// - The error is cleared when a tracked call starts and set only when one
///   fails.
#[derive(Debug, Default)]
pub struct StatusTracker {
    in_flight: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

/// Marks a call as in flight until dropped.
#[derive(Debug)]
#[must_use = "the call stops counting as in flight when the guard is dropped"]
pub struct LoadingGuard<'a> {
    tracker: &'a StatusTracker,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl StatusTracker {
    /// Create an idle tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a call: clear the error and raise the loading flag.
    pub fn begin(&self) -> LoadingGuard<'_> {
        self.clear_error();
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        LoadingGuard { tracker: self }
    }

    /// Return whether any tracked call is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    /// Message of the last failed call, if not cleared since.
    pub fn error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget the last failure.
    pub fn clear_error(&self) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Record the outcome of a call, remembering the message on failure.
    pub fn record<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(err) = &result {
            *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(err.message().to_owned());
        }
        result
    }

    /// Run `call` as a tracked call.
    pub async fn track<T, F>(&self, call: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let _loading = self.begin();
        let result = call.await;
        self.record(result)
    }
}

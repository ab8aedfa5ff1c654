//! Broadcast-channel implementation of the auth event sink.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::ports::{AuthEvent, AuthEventSink};

const DEFAULT_CAPACITY: usize = 16;

/// Fans auth events out to every subscriber.
///
/// Publishing never blocks; events sent while nobody listens are dropped,
/// and slow subscribers observe `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastAuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl BroadcastAuthEvents {
    /// Create a channel holding up to `capacity` undelivered events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastAuthEvents {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl AuthEventSink for BroadcastAuthEvents {
    fn publish(&self, event: AuthEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!(?event, receivers, "auth event published"),
            Err(_) => debug!(?event, "auth event dropped; no subscribers"),
        }
    }
}

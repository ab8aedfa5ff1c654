//! TatApps client data layer.
//!
//! Session state, the permission-gated navigation guard, and the entity
//! cache synchronizers, over a remote JSON API.

pub mod config;
pub mod context;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::ClientSettings;
pub use context::{AppContext, ContextError};

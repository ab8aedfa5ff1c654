//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed `RemoteApi` acting as the request/response
//!   interceptor.
//! - **events**: broadcast channel implementing `AuthEventSink`.
//!
//! Adapters translate between transport details and domain types. They hold
//! no cache or navigation logic.

pub mod events;
pub mod http;

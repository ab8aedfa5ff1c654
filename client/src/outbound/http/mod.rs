//! HTTP outbound adapters.
//!
//! This module provides the reqwest implementation of the `RemoteApi` port.

mod remote_api;

pub use remote_api::HttpRemoteApi;

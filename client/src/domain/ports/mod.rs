//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_events;
mod profile_source;
mod remote_api;

#[cfg(test)]
pub use auth_events::MockAuthEventSink;
pub use auth_events::{AuthEvent, AuthEventSink};
#[cfg(test)]
pub use profile_source::MockProfileSource;
pub use profile_source::ProfileSource;
#[cfg(test)]
pub use remote_api::MockRemoteApi;
pub use remote_api::{ApiError, ApiMethod, ApiRequest, RemoteApi};

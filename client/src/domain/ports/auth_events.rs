//! Driven port for navigation-relevant events raised by the transport.
//!
//! The HTTP adapter never navigates. It publishes an [`AuthEvent`] and the
//! embedding application decides where to go.

use crate::domain::routes::{FORBIDDEN_PATH, LOGIN_PATH, SERVER_ERROR_PATH};

/// Event raised when a response status calls for a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    /// The API answered 401; the session has been cleared.
    SessionExpired,
    /// The API answered 403.
    Forbidden,
    /// The API answered with a 5xx status.
    ServerError,
}

impl AuthEvent {
    /// Route the application should navigate to.
    pub fn redirect_path(self) -> &'static str {
        match self {
            Self::SessionExpired => LOGIN_PATH,
            Self::Forbidden => FORBIDDEN_PATH,
            Self::ServerError => SERVER_ERROR_PATH,
        }
    }

    /// Map a response status to the event it raises, if any.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::SessionExpired),
            403 => Some(Self::Forbidden),
            500..=599 => Some(Self::ServerError),
            _ => None,
        }
    }
}

/// Port receiving [`AuthEvent`]s.
#[cfg_attr(test, mockall::automock)]
pub trait AuthEventSink: Send + Sync {
    /// Publish one event. Delivery is best effort.
    fn publish(&self, event: AuthEvent);
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(401, Some(AuthEvent::SessionExpired), "/login")]
    #[case(403, Some(AuthEvent::Forbidden), "/error/forbidden")]
    #[case(500, Some(AuthEvent::ServerError), "/error/server")]
    #[case(503, Some(AuthEvent::ServerError), "/error/server")]
    fn statuses_raise_events(
        #[case] status: u16,
        #[case] expected: Option<AuthEvent>,
        #[case] path: &str,
    ) {
        let event = AuthEvent::from_status(status);
        assert_eq!(event, expected);
        assert_eq!(event.map(AuthEvent::redirect_path), Some(path));
    }

    #[rstest]
    #[case(200)]
    #[case(404)]
    #[case(422)]
    fn other_statuses_are_silent(#[case] status: u16) {
        assert!(AuthEvent::from_status(status).is_none());
    }
}

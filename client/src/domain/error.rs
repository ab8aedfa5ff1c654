//! Domain-level error types.
//!
//! These errors are transport agnostic. Synchronizers and the auth service
//! surface them to views; the message is what a user-facing toast displays.

use serde::{Deserialize, Serialize};

use super::ports::ApiError;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The remote API could not be reached or timed out.
    ServiceUnavailable,
    /// The remote API answered with a 5xx status.
    ServerError,
    /// An unexpected error occurred inside the client.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is never blank; blank input falls back to a per-code default.
///
/// # Examples
/// ```
/// use client::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::not_found("  ").message(), "resource not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error; a blank message is replaced by the code's default.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            default_message(code).to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message for display.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

fn default_message(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::InvalidRequest => "invalid request",
        ErrorCode::Unauthorized => "authentication required",
        ErrorCode::Forbidden => "access forbidden",
        ErrorCode::NotFound => "resource not found",
        ErrorCode::ServiceUnavailable => "service unavailable",
        ErrorCode::ServerError => "server error",
        ErrorCode::InternalError => "internal error",
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<ApiError> for Error {
    fn from(value: ApiError) -> Self {
        let code = match &value {
            ApiError::Unauthorized { .. } => ErrorCode::Unauthorized,
            ApiError::Forbidden { .. } => ErrorCode::Forbidden,
            ApiError::NotFound { .. } => ErrorCode::NotFound,
            ApiError::Rejected { .. } => ErrorCode::InvalidRequest,
            ApiError::Server { .. } => ErrorCode::ServerError,
            ApiError::Transport { .. } | ApiError::Timeout { .. } => ErrorCode::ServiceUnavailable,
            ApiError::Decode { .. } => ErrorCode::InternalError,
        };
        Self::new(code, value.message())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ApiError::unauthorized("token expired"), ErrorCode::Unauthorized)]
    #[case(ApiError::forbidden("nope"), ErrorCode::Forbidden)]
    #[case(ApiError::not_found("gone"), ErrorCode::NotFound)]
    #[case(ApiError::rejected(422_u16, "name required"), ErrorCode::InvalidRequest)]
    #[case(ApiError::server(502_u16, "bad gateway"), ErrorCode::ServerError)]
    #[case(ApiError::timeout("30s elapsed"), ErrorCode::ServiceUnavailable)]
    #[case(ApiError::transport("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ApiError::decode("not json"), ErrorCode::InternalError)]
    fn api_errors_map_to_codes(#[case] api: ApiError, #[case] expected: ErrorCode) {
        let message = api.message().to_owned();
        let err = Error::from(api);
        assert_eq!(err.code(), expected);
        assert_eq!(err.message(), message);
    }

    #[test]
    fn blank_message_uses_default() {
        let err = Error::new(ErrorCode::Forbidden, "   ");
        assert_eq!(err.message(), "access forbidden");
        assert_eq!(err.to_string(), "access forbidden");
    }
}

//! Client configuration loaded via OrthoConfig.
//!
//! Values come from `TATAPPS_*` environment variables and the optional
//! configuration file; accessors apply defaults and validate.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{CredentialsValidationError, LoginCredentials};

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Errors raised while interpreting [`ClientSettings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `api_url` does not parse as an absolute URL.
    #[error("invalid api url {url}: {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// `request_timeout_seconds` was zero.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
    /// Only one of `email` and `password` was set.
    #[error("auto-login needs both email and password")]
    IncompleteCredentials,
    /// The configured credentials failed validation.
    #[error("invalid auto-login credentials: {0}")]
    InvalidCredentials(#[from] CredentialsValidationError),
}

/// Configuration values for the remote API client.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TATAPPS")]
pub struct ClientSettings {
    /// API base URL, including the version prefix.
    pub api_url: Option<String>,
    /// Per-request timeout.
    pub request_timeout_seconds: Option<u64>,
    /// Bearer token to start the session with.
    pub token: Option<String>,
    /// Email used for auto-login.
    pub email: Option<String>,
    /// Password used for auto-login.
    pub password: Option<String>,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("api_url", &self.api_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientSettings {
    /// Return the configured API URL, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when the value does not parse.
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        Url::parse(raw).map_err(|source| ConfigError::InvalidApiUrl {
            url: raw.to_owned(),
            source,
        })
    }

    /// Return the request timeout, falling back to thirty seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS)
        {
            0 => Err(ConfigError::ZeroTimeout),
            seconds => Ok(Duration::from_secs(seconds)),
        }
    }

    /// Pre-seeded bearer token, if any.
    pub fn token(&self) -> Option<Zeroizing<String>> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Zeroizing::new(token.to_owned()))
    }

    /// Auto-login credentials, when both halves are configured.
    ///
    /// # Errors
    ///
    /// Fails when only one half is set or the pair is invalid.
    pub fn credentials(&self) -> Result<Option<LoginCredentials>, ConfigError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (None, None) => Ok(None),
            (Some(email), Some(password)) => {
                Ok(Some(LoginCredentials::try_from_parts(email, password)?))
            }
            _ => Err(ConfigError::IncompleteCredentials),
        }
    }
}

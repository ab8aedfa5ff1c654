//! Driving port the route guard uses to restore the signed-in user.

use async_trait::async_trait;

use crate::domain::{Error, UserProfile};

/// Fetches the current user's profile and stores it in the session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the profile for the session's token and record it.
    async fn refresh_profile(&self) -> Result<UserProfile, Error>;
}

//! Authentication use-cases: login, registration, profile refresh, logout.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::envelope::{unwrap_data, unwrap_key};
use super::ports::{ApiRequest, ProfileSource, RemoteApi};
use super::{Error, LoginCredentials, Registration, SessionHandle, UserProfile};

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const PROFILE_PATH: &str = "/auth/profile";

fn decode_user(body: Value) -> Result<UserProfile, Error> {
    serde_json::from_value(unwrap_key(unwrap_data(body), "user"))
        .map_err(|err| Error::internal(format!("malformed user payload: {err}")))
}

/// Authentication service operating on the shared [`SessionHandle`].
pub struct AuthService<A> {
    api: Arc<A>,
    session: SessionHandle,
}

impl<A> Clone for AuthService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
        }
    }
}

impl<A: RemoteApi> AuthService<A> {
    /// Create a service backed by `api` and mutating `session`.
    pub fn new(api: Arc<A>, session: SessionHandle) -> Self {
        Self { api, session }
    }

    /// Session this service writes to.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Exchange credentials for a token and, when echoed, the user's identity.
    ///
    /// A response without a user stores the token alone and returns `None`;
    /// the route guard fetches the profile on the next navigation.
    ///
    /// # Errors
    ///
    /// Propagates remote failures; a response without a token is an
    /// [`ErrorCode::InternalError`](super::ErrorCode::InternalError).
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<UserProfile>, Error> {
        let body = self
            .api
            .send(ApiRequest::post(LOGIN_PATH, credentials.to_payload()))
            .await?;
        let body = unwrap_data(body);
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| Zeroizing::new(token.to_owned()))
            .ok_or_else(|| Error::internal("login response carried no token"))?;
        let user: Option<UserProfile> = body
            .get("user")
            .filter(|user| !user.is_null())
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| Error::internal(format!("malformed user payload: {err}")))?;

        match &user {
            Some(user) => {
                info!(email = %credentials.email(), role = ?user.role_name(), "signed in");
                self.session.sign_in(token, user.clone());
            }
            None => {
                info!(email = %credentials.email(), "signed in, profile pending");
                self.session.set_token(token);
            }
        }
        Ok(user)
    }

    /// Create a new account. The session is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates remote failures such as a duplicate email.
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, Error> {
        let payload = serde_json::to_value(registration)
            .map_err(|err| Error::internal(format!("registration not serialisable: {err}")))?;
        let body = self
            .api
            .send(ApiRequest::post(REGISTER_PATH, payload))
            .await?;
        debug!(email = %registration.email(), "registered account");
        decode_user(body)
    }

    /// Fetch the profile for the current token and store it.
    ///
    /// # Errors
    ///
    /// Propagates remote failures. The session is not cleared here.
    pub async fn fetch_profile(&self) -> Result<UserProfile, Error> {
        let body = self.api.send(ApiRequest::get(PROFILE_PATH)).await?;
        let user = decode_user(body)?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Forget token and user.
    pub fn logout(&self) {
        self.session.clear();
        info!("signed out");
    }

    /// Revalidate a held token by refetching the profile.
    ///
    /// Returns whether the client is still signed in. A failed fetch clears
    /// the session instead of returning an error.
    pub async fn check_auth(&self) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }
        match self.fetch_profile().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "profile check failed, clearing session");
                self.session.clear();
                false
            }
        }
    }
}

#[async_trait]
impl<A: RemoteApi> ProfileSource for AuthService<A> {
    async fn refresh_profile(&self) -> Result<UserProfile, Error> {
        self.fetch_profile().await
    }
}

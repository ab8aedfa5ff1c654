//! Navigation guard deciding whether a destination may be entered.
//!
//! The guard is a user-experience filter, not a security boundary: the
//! remote API enforces the same permissions on every call.
//!
//! Rules run in order and the first that fires decides:
//! 1. a token without a user triggers a profile refresh; a failed refresh
//!    clears the session and sends auth-only destinations to login;
//! 2. auth-only destinations without a token go to login;
//! 3. guest-only destinations with a token go home;
//! 4. unmet ALL-of requirements go to the forbidden page;
//! 5. unmet ANY-of requirements go to the forbidden page;
//! 6. everything else is allowed.

use std::sync::Arc;

use tracing::{debug, warn};

use super::ports::ProfileSource;
use super::routes::{FORBIDDEN_PATH, HOME_PATH, LOGIN_PATH, MatchedRoute, RouteTable};
use super::session::SessionHandle;

/// Outcome of evaluating a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Proceed to the requested path.
    Allow,
    /// Navigate to the contained path instead.
    Redirect(String),
}

impl GuardDecision {
    /// Return whether navigation proceeds as requested.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Redirect target, if any.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(target) => Some(target.as_str()),
        }
    }
}

/// Where the guard sends rejected navigations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRedirects {
    /// Target when a token is required.
    pub login: String,
    /// Target when a signed-in user opens a guest-only page.
    pub home: String,
    /// Target when permissions are missing.
    pub forbidden: String,
}

impl Default for GuardRedirects {
    fn default() -> Self {
        Self {
            login: LOGIN_PATH.to_owned(),
            home: HOME_PATH.to_owned(),
            forbidden: FORBIDDEN_PATH.to_owned(),
        }
    }
}

/// Route guard bound to a session, a route table, and a profile source.
pub struct RouteGuard<P> {
    profiles: Arc<P>,
    session: SessionHandle,
    routes: Arc<RouteTable>,
    redirects: GuardRedirects,
}

impl<P: ProfileSource> RouteGuard<P> {
    /// Create a guard with the default redirect targets.
    pub fn new(profiles: Arc<P>, session: SessionHandle, routes: Arc<RouteTable>) -> Self {
        Self {
            profiles,
            session,
            routes,
            redirects: GuardRedirects::default(),
        }
    }

    /// Override the redirect targets.
    #[must_use]
    pub fn with_redirects(mut self, redirects: GuardRedirects) -> Self {
        self.redirects = redirects;
        self
    }

    /// Route table used to resolve destinations.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Decide whether navigating to `path` may proceed.
    ///
    /// A path that follows a redirect record is allowed by redirecting to the
    /// record's target. Unknown paths carry no requirements.
    pub async fn evaluate(&self, path: &str) -> GuardDecision {
        let destination = self.routes.resolve(path);
        let decision = self.decide(destination.as_ref()).await;
        let decision = match (decision, destination.as_ref()) {
            (GuardDecision::Allow, Some(matched)) if matched.redirected_from().is_some() => {
                GuardDecision::Redirect(matched.path().to_owned())
            }
            (decision, _) => decision,
        };
        debug!(path, ?decision, "navigation evaluated");
        decision
    }

    async fn decide(&self, destination: Option<&MatchedRoute>) -> GuardDecision {
        let requires_auth = destination.is_some_and(MatchedRoute::requires_auth);

        if self.session.is_authenticated() && !self.session.has_user() {
            if let Err(err) = self.profiles.refresh_profile().await {
                warn!(error = %err, "profile refresh failed, clearing session");
                self.session.clear();
                if requires_auth {
                    return GuardDecision::Redirect(self.redirects.login.clone());
                }
            }
        }

        let session = self.session.snapshot();
        if requires_auth && !session.is_authenticated() {
            return GuardDecision::Redirect(self.redirects.login.clone());
        }

        let guest_only = destination.is_some_and(MatchedRoute::is_guest_only);
        if guest_only && session.is_authenticated() {
            return GuardDecision::Redirect(self.redirects.home.clone());
        }

        let Some(destination) = destination else {
            return GuardDecision::Allow;
        };
        let requirements = destination.requirements();
        if requirements.is_empty() {
            return GuardDecision::Allow;
        }
        match session.grants().satisfies(&requirements) {
            Ok(()) => GuardDecision::Allow,
            Err(denial) => {
                debug!(path = destination.path(), %denial, "permission check failed");
                GuardDecision::Redirect(self.redirects.forbidden.clone())
            }
        }
    }
}

#[cfg(test)]
#[path = "route_guard_tests.rs"]
mod tests;

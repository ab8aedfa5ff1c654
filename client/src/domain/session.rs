//! Session state: bearer credential plus the signed-in user's identity.
//!
//! The session is the single source of truth for "who is signed in". Every
//! permission decision is derived from it on demand, never cached.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use permissions::{Grants, PermissionSet};
use serde::{Deserialize, Deserializer, Serialize};
use zeroize::Zeroizing;

use super::ids::EntityId;

/// Role name that bypasses every permission check.
pub const ADMIN_ROLE: &str = "admin";
/// Role name flagged as a manager for menu purposes.
pub const MANAGER_ROLE: &str = "manager";

/// Go-style APIs serialise empty slices as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One permission attached to a role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Permission name such as `employee.view`.
    #[serde(default)]
    pub name: String,
}

/// Role assigned to a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role id, when the API includes it.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Role name; `admin` and `manager` carry special meaning.
    #[serde(default)]
    pub name: String,
    /// Permissions granted through this role.
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<PermissionGrant>,
}

/// Identity returned by login and by the profile endpoint.
///
/// # Examples
/// ```
/// use client::domain::UserProfile;
///
/// let user: UserProfile = serde_json::from_str(
///     r#"{"id": 3, "email": "hr@tatapps.id", "full_name": "Hana",
///         "role": {"name": "hr", "permissions": [{"name": "employee.view"}]}}"#,
/// ).expect("valid profile");
/// assert!(user.permission_set().contains("employee.view"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User id.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default, alias = "fullName")]
    pub full_name: String,
    /// Assigned role; absent for half-provisioned accounts.
    #[serde(default)]
    pub role: Option<Role>,
}

impl UserProfile {
    /// Name of the assigned role, if any.
    pub fn role_name(&self) -> Option<&str> {
        self.role.as_ref().map(|role| role.name.as_str())
    }

    /// Deduplicated permission names granted through the role.
    pub fn permission_set(&self) -> PermissionSet {
        self.role
            .as_ref()
            .map(|role| {
                PermissionSet::from_names(role.permissions.iter().map(|grant| grant.name.as_str()))
            })
            .unwrap_or_default()
    }

    /// Return whether the role is `admin`.
    pub fn is_admin(&self) -> bool {
        self.role_name() == Some(ADMIN_ROLE)
    }

    /// Return whether the role is `manager`.
    pub fn is_manager(&self) -> bool {
        self.role_name() == Some(MANAGER_ROLE)
    }
}

/// Credential and identity of the current client.
///
/// ## Invariants
/// - Authenticated exactly when a token is present; a token may exist before
///   the user has been fetched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<Zeroizing<String>>,
    user: Option<UserProfile>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

impl Session {
    /// Return whether a bearer token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Bearer token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|token| token.as_str())
    }

    /// Signed-in user, once fetched.
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Return whether the user holds the `admin` role.
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_admin)
    }

    /// Return whether the user holds the `manager` role.
    pub fn is_manager(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_manager)
    }

    /// Permission names derived from the user's role.
    pub fn permission_set(&self) -> PermissionSet {
        self.user
            .as_ref()
            .map(UserProfile::permission_set)
            .unwrap_or_default()
    }

    /// Grants used by the permission evaluator.
    pub fn grants(&self) -> Grants {
        Grants::new(self.permission_set(), self.is_admin())
    }
}

/// Shared handle to the process-wide [`Session`].
///
/// Clones share state. The lock is only held for synchronous reads and
/// writes; a poisoned lock is recovered since every write is a whole-field
/// replacement.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle(Arc<RwLock<Session>>);

impl SessionHandle {
    /// Create an empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Session {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Current bearer token as an owned secret.
    pub fn token(&self) -> Option<Zeroizing<String>> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    /// Return whether a bearer token is held.
    pub fn is_authenticated(&self) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    /// Return whether the user has been fetched.
    pub fn has_user(&self) -> bool {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .is_some()
    }

    /// Replace token and user after a successful login.
    pub fn sign_in(&self, token: Zeroizing<String>, user: UserProfile) {
        let mut session = self.0.write().unwrap_or_else(PoisonError::into_inner);
        session.token = Some(token);
        session.user = Some(user);
    }

    /// Seed a token without a user; the guard fetches the profile later.
    ///
    /// Any previously stored user is dropped.
    pub fn set_token(&self, token: Zeroizing<String>) {
        let mut session = self.0.write().unwrap_or_else(PoisonError::into_inner);
        session.token = Some(token);
        session.user = None;
    }

    /// Replace the user after a profile fetch.
    pub fn set_user(&self, user: UserProfile) {
        self.0.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    /// Drop token and user.
    pub fn clear(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Session::default();
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn profile(role: &str, names: &[&str]) -> UserProfile {
        let permissions: Vec<_> = names.iter().map(|name| json!({ "name": name })).collect();
        serde_json::from_value(json!({
            "id": 1,
            "email": "user@tatapps.id",
            "full_name": "User",
            "role": { "name": role, "permissions": permissions },
        }))
        .expect("valid profile")
    }

    #[rstest]
    #[case("admin", true, false)]
    #[case("manager", false, true)]
    #[case("Admin", false, false)]
    fn role_flags_follow_exact_names(
        #[case] role: &str,
        #[case] admin: bool,
        #[case] manager: bool,
    ) {
        let user = profile(role, &[]);
        assert_eq!(user.is_admin(), admin);
        assert_eq!(user.is_manager(), manager);
    }

    #[test]
    fn null_permissions_deserialize_as_empty() {
        let user: UserProfile = serde_json::from_value(json!({
            "email": "x@tatapps.id",
            "role": { "name": "staff", "permissions": null },
        }))
        .expect("null slice accepted");
        assert!(user.permission_set().is_empty());
    }

    #[test]
    fn handle_tracks_token_and_user_independently() {
        let handle = SessionHandle::new();
        assert!(!handle.is_authenticated());

        handle.set_token(Zeroizing::new("t0k".to_owned()));
        assert!(handle.is_authenticated());
        assert!(!handle.has_user());

        handle.set_user(profile("staff", &["employee.view", "employee.view"]));
        let session = handle.snapshot();
        assert_eq!(session.permission_set().len(), 1);
        assert!(session.grants().has_permission("employee.view"));

        handle.set_token(Zeroizing::new("t1k".to_owned()));
        assert!(!handle.has_user());

        handle.clear();
        assert!(!handle.is_authenticated());
        assert!(!handle.has_user());
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let handle = SessionHandle::new();
        handle.set_token(Zeroizing::new("very-secret".to_owned()));
        let rendered = format!("{:?}", handle.snapshot());
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

//! Evaluation of requirements against a principal's grants.

use thiserror::Error;

use crate::name::PermissionSet;
use crate::requirements::PermissionRequirements;

/// Reason a [`PermissionRequirements`] check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// At least one ALL-of name is not granted.
    #[error("missing required permissions: {}", .missing.join(", "))]
    MissingAll {
        /// Required names that are not granted, in lexical order.
        missing: Vec<String>,
    },
    /// No ANY-of name is granted.
    #[error("none of the accepted permissions is granted: {}", .accepted.join(", "))]
    NoneOfAny {
        /// Names that would each have satisfied the requirement.
        accepted: Vec<String>,
    },
}

/// What a principal has been granted.
///
/// ## Invariants
/// - An admin principal satisfies every non-empty check.
/// - Empty names and empty lists are never satisfied, admin or not; callers
///   only evaluate requirements that actually declare something.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    granted: PermissionSet,
    is_admin: bool,
}

impl Grants {
    /// Construct grants from a permission set and the admin flag.
    #[must_use]
    pub const fn new(granted: PermissionSet, is_admin: bool) -> Self {
        Self { granted, is_admin }
    }

    /// Grants of a principal with no identity: nothing granted, no bypass.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::new(PermissionSet::new(), false)
    }

    /// Whether the admin bypass is active.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// The granted permission names.
    #[must_use]
    pub const fn granted(&self) -> &PermissionSet {
        &self.granted
    }

    /// Return whether `permission` is granted.
    ///
    /// # Examples
    /// ```
    /// use permissions::{Grants, PermissionSet};
    ///
    /// let admin = Grants::new(PermissionSet::new(), true);
    /// assert!(admin.has_permission("anything.at.all"));
    /// assert!(!admin.has_permission(""));
    /// ```
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        if permission.is_empty() {
            return false;
        }
        self.is_admin || self.granted.contains(permission)
    }

    /// Return whether at least one of `permissions` is granted.
    ///
    /// An empty list is never satisfied.
    #[must_use]
    pub fn has_any_permission<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut permissions = permissions.into_iter().peekable();
        if permissions.peek().is_none() {
            return false;
        }
        if self.is_admin {
            return true;
        }
        permissions.any(|permission| self.granted.contains(permission.as_ref()))
    }

    /// Return whether every one of `permissions` is granted.
    ///
    /// An empty list is never satisfied.
    #[must_use]
    pub fn has_all_permissions<I, S>(&self, permissions: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut permissions = permissions.into_iter().peekable();
        if permissions.peek().is_none() {
            return false;
        }
        if self.is_admin {
            return true;
        }
        permissions.all(|permission| self.granted.contains(permission.as_ref()))
    }

    /// Check aggregated requirements, ALL-of first, then ANY-of.
    ///
    /// Empty halves are skipped, so requirements that declare nothing pass.
    ///
    /// # Errors
    ///
    /// Returns the first [`Denial`] encountered.
    pub fn satisfies(&self, requirements: &PermissionRequirements) -> Result<(), Denial> {
        let all = requirements.all();
        if !all.is_empty() && !self.has_all_permissions(all) {
            let missing = all
                .iter()
                .filter(|name| !self.granted.contains(name.as_str()))
                .cloned()
                .collect();
            return Err(Denial::MissingAll { missing });
        }

        let any = requirements.any();
        if !any.is_empty() && !self.has_any_permission(any) {
            return Err(Denial::NoneOfAny {
                accepted: any.iter().cloned().collect(),
            });
        }
        Ok(())
    }
}

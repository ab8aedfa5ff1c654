//! Permission names and deduplicated permission sets.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors returned when constructing a [`PermissionName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionNameError {
    /// Name is empty after trimming whitespace.
    #[error("permission name must not be empty")]
    Empty,
    /// Name carries leading or trailing whitespace.
    #[error("permission name must not contain surrounding whitespace")]
    ContainsWhitespace,
}

/// Validated permission identifier, conventionally `<module>.<action>`.
///
/// ## Invariants
/// - Never empty.
/// - Never padded with whitespace, so set lookups by `&str` are exact.
///
/// # Examples
/// ```
/// use permissions::PermissionName;
///
/// let name = PermissionName::new("warehouse.view").expect("valid name");
/// assert_eq!(name.as_str(), "warehouse.view");
/// assert!(PermissionName::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionName(String);

impl PermissionName {
    /// Validate and construct a permission name.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionNameError`] when the name is blank or padded.
    pub fn new(value: impl Into<String>) -> Result<Self, PermissionNameError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(PermissionNameError::Empty);
        }
        if raw.trim() != raw {
            return Err(PermissionNameError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for PermissionName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for PermissionName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for PermissionName {
    type Error = PermissionNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionName> for String {
    fn from(value: PermissionName) -> Self {
        value.0
    }
}

/// Deduplicated set of permission names granted to a principal.
///
/// Built from whatever the identity provider returned; blank or malformed
/// entries are skipped rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<PermissionName>);

impl PermissionSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Collect raw names into a set, dropping entries that fail validation.
    ///
    /// # Examples
    /// ```
    /// use permissions::PermissionSet;
    ///
    /// let set = PermissionSet::from_names(["lead.view", "", "lead.view"]);
    /// assert_eq!(set.len(), 1);
    /// ```
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| PermissionName::new(name.as_ref()).ok())
            .collect()
    }

    /// Return whether `permission` is in the set.
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Insert a validated name, returning whether it was new.
    pub fn insert(&mut self, permission: PermissionName) -> bool {
        self.0.insert(permission)
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the set holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate names in lexical order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &PermissionName> {
        self.0.iter()
    }
}

impl FromIterator<PermissionName> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = PermissionName>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

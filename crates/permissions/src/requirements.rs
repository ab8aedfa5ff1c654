//! Aggregated ALL-of / ANY-of permission requirements.

use std::collections::BTreeSet;

/// Permission requirements collected from one or more declarations.
///
/// `all` holds names that must every one be granted; `any` holds names of
/// which at least one must be granted. Either set may be empty, meaning that
/// half of the requirement is absent.
///
/// # Examples
/// ```
/// use permissions::PermissionRequirements;
///
/// let mut requirements = PermissionRequirements::new().with_all(["employee.view"]);
/// requirements.merge(&PermissionRequirements::new().with_all(["employee.update"]));
/// assert_eq!(requirements.all().len(), 2);
/// assert!(requirements.any().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionRequirements {
    all: BTreeSet<String>,
    any: BTreeSet<String>,
}

impl PermissionRequirements {
    /// Create requirements with both sets empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            all: BTreeSet::new(),
            any: BTreeSet::new(),
        }
    }

    /// Add names to the ALL-of set.
    #[must_use]
    pub fn with_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.all.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add names to the ANY-of set.
    #[must_use]
    pub fn with_any<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any.extend(names.into_iter().map(Into::into));
        self
    }

    /// Union `other` into `self`, set by set.
    pub fn merge(&mut self, other: &Self) {
        self.all.extend(other.all.iter().cloned());
        self.any.extend(other.any.iter().cloned());
    }

    /// Names that must all be granted.
    #[must_use]
    pub const fn all(&self) -> &BTreeSet<String> {
        &self.all
    }

    /// Names of which at least one must be granted.
    #[must_use]
    pub const fn any(&self) -> &BTreeSet<String> {
        &self.any
    }

    /// Return whether neither set declares anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }
}

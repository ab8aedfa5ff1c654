//! Permission evaluation primitives for TatApps clients.
//!
//! The crate answers one question: given what a principal has been granted,
//! is a declared requirement satisfied? Everything here is pure and
//! synchronous so that navigation guards, menu builders, and tests can share
//! the same rules.
//!
//! Public surface:
//! - [`PermissionName`]: validated permission identifier (`employee.view`).
//! - [`PermissionSet`]: deduplicated set of granted names.
//! - [`Grants`]: granted set plus the admin bypass flag.
//! - [`PermissionRequirements`]: ALL-of and ANY-of sets aggregated from
//!   one or more declarations.
//! - [`Denial`]: why a requirement check failed.
//!
//! # Examples
//! ```
//! use permissions::{Grants, PermissionRequirements, PermissionSet};
//!
//! let grants = Grants::new(PermissionSet::from_names(["employee.view"]), false);
//! assert!(grants.has_permission("employee.view"));
//! assert!(!grants.has_all_permissions(["employee.view", "employee.update"]));
//!
//! let requirements = PermissionRequirements::new().with_all(["employee.view"]);
//! assert!(grants.satisfies(&requirements).is_ok());
//! ```

mod grants;
mod name;
mod requirements;

pub use grants::{Denial, Grants};
pub use name::{PermissionName, PermissionNameError, PermissionSet};
pub use requirements::PermissionRequirements;

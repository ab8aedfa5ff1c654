//! Domain primitives, services, and cache synchronizers.
//!
//! Purpose: hold the session, decide navigations, and keep cached entity
//! collections consistent with the remote API. Everything here talks to the
//! outside world through the traits in [`ports`]; adapters live in
//! `crate::outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`): failure returned by every service.
//! - SessionHandle / AuthService: shared session and the calls mutating it.
//! - RouteTable / RouteGuard: route resolution and the navigation decision.
//! - HrSynchronizer, WarehouseSynchronizer, InventorySynchronizer and
//!   SiteSynchronizer: per-group entity caches.

pub mod envelope;
pub mod normalize;
pub mod ports;

mod auth;
mod auth_service;
mod error;
mod hr;
mod hr_sync;
mod ids;
mod inventory;
mod inventory_sync;
mod route_guard;
mod routes;
mod session;
mod site;
mod site_sync;
mod status;
mod warehouse;
mod warehouse_sync;

pub use self::auth::{CredentialsValidationError, LoginCredentials, Registration};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode};
pub use self::hr::{
    DEFAULT_EMPLOYEE_STATUS, DEFAULT_RECRUITMENT_STATUS, DEFAULT_TIMEZONE, Division, Employee,
    Position,
};
pub use self::hr_sync::{HrCollections, HrSynchronizer};
pub use self::ids::{EntityId, IdBatch};
pub use self::inventory::{InventoryItem, InventoryTransaction, TransactionKind};
pub use self::inventory_sync::InventorySynchronizer;
pub use self::route_guard::{GuardDecision, GuardRedirects, RouteGuard};
pub use self::routes::{
    FORBIDDEN_PATH, HOME_PATH, LOGIN_PATH, MAX_REDIRECT_HOPS, MatchedRoute, RouteMeta,
    RouteRecord, RouteTable, RouteTableError, SERVER_ERROR_PATH,
};
pub use self::session::{
    ADMIN_ROLE, MANAGER_ROLE, PermissionGrant, Role, Session, SessionHandle, UserProfile,
};
pub use self::site::{AssetResolver, Branding, DEFAULT_APP_NAME, DEFAULT_FAVICON, SiteSettings};
pub use self::site_sync::SiteSynchronizer;
pub use self::status::{LoadingGuard, StatusTracker};
pub use self::warehouse::{DEFAULT_WAREHOUSE_COLOR, Warehouse};
pub use self::warehouse_sync::WarehouseSynchronizer;

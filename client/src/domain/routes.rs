//! Declarative route table and path resolution.
//!
//! Routes are declared as a tree of [`RouteRecord`]s. Resolving a path yields
//! the chain of records from the root to the matched leaf, because access
//! rules are aggregated over every record in that chain.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use permissions::PermissionRequirements;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::warn;

/// Sign-in route.
pub const LOGIN_PATH: &str = "/login";
/// Landing route for signed-in users.
pub const HOME_PATH: &str = "/";
/// Shown when a permission check fails.
pub const FORBIDDEN_PATH: &str = "/error/forbidden";
/// Shown when the API answers with a 5xx status.
pub const SERVER_ERROR_PATH: &str = "/error/server";

/// Redirect records followed before a path is treated as unmatched.
pub const MAX_REDIRECT_HOPS: usize = 8;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

/// Access rules and display data attached to one route record.
///
/// Every permission key accepts a single string or a list.
///
/// # Examples
/// ```
/// use client::domain::RouteMeta;
///
/// let meta: RouteMeta = serde_json::from_str(
///     r#"{"requiresAuth": true, "anyPermission": "po.approve"}"#,
/// ).expect("valid meta");
/// assert!(meta.requires_auth);
/// assert!(meta.requirements().any().contains("po.approve"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteMeta {
    /// Only reachable with a session token.
    pub requires_auth: bool,
    /// Only reachable without a session token.
    #[serde(rename = "guest", alias = "guestOnly")]
    pub guest_only: bool,
    /// Every name must be granted.
    #[serde(deserialize_with = "one_or_many")]
    pub permissions: Vec<String>,
    /// Every name must be granted; merged with `permissions`.
    #[serde(deserialize_with = "one_or_many")]
    pub all_permissions: Vec<String>,
    /// At least one name must be granted.
    #[serde(deserialize_with = "one_or_many")]
    pub any_permissions: Vec<String>,
    /// At least one name must be granted; merged with `any_permissions`.
    #[serde(deserialize_with = "one_or_many")]
    pub any_permission: Vec<String>,
    /// Page title.
    pub title: Option<String>,
}

impl RouteMeta {
    /// Meta with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a session token.
    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Restrict to visitors without a token.
    #[must_use]
    pub fn guest_only(mut self) -> Self {
        self.guest_only = true;
        self
    }

    /// Require every one of `names`.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Require at least one of `names`.
    #[must_use]
    pub fn with_any_permissions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.any_permissions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the page title.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Permission requirements declared by this record alone.
    pub fn requirements(&self) -> PermissionRequirements {
        PermissionRequirements::new()
            .with_all(self.permissions.iter().chain(&self.all_permissions).cloned())
            .with_any(self.any_permissions.iter().chain(&self.any_permission).cloned())
    }
}

/// One node of the route tree.
///
/// A child path starting with `/` is absolute; otherwise it is appended to
/// the parent's path, and an empty child path shares the parent's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouteRecord {
    /// Path pattern: static segments, `:param`, or a `:name(.*)*` catch-all.
    pub path: String,
    /// Route name.
    pub name: Option<String>,
    /// Access rules.
    pub meta: RouteMeta,
    /// Path to navigate to instead of this record.
    pub redirect: Option<String>,
    /// Nested records.
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    /// Record for `path` with no rules.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Name the record.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach access rules.
    #[must_use]
    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Turn the record into a redirect.
    #[must_use]
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }

    /// Attach nested records.
    #[must_use]
    pub fn with_children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

/// Errors raised while loading a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    /// The JSON document is not a list of route records.
    #[error("route table is malformed: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let Some(param) = raw.strip_prefix(':') else {
            return Self::Static(raw.to_owned());
        };
        let name = param.split('(').next().unwrap_or(param);
        let name = name.trim_end_matches(['*', '+', '?']).to_owned();
        if param.contains(".*") {
            Self::CatchAll(name)
        } else {
            Self::Param(name)
        }
    }

    fn score(&self) -> u8 {
        match self {
            Self::Static(_) => 4,
            Self::Param(_) => 2,
            Self::CatchAll(_) => 0,
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    name: Option<String>,
    segments: Vec<Segment>,
    chain: Vec<RouteMeta>,
    redirect: Option<String>,
}

impl CompiledRoute {
    fn is_catch_all(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::CatchAll(_)))
    }

    fn rank(&self, other: &Self) -> Ordering {
        (!self.is_catch_all())
            .cmp(&!other.is_catch_all())
            .then_with(|| {
                let mine = self.segments.iter().map(Segment::score);
                let theirs = other.segments.iter().map(Segment::score);
                mine.cmp(theirs)
            })
            .then_with(|| self.chain.len().cmp(&other.chain.len()))
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        let mut remaining = parts;
        for segment in &self.segments {
            match segment {
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), remaining.join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    let (head, tail) = remaining.split_first()?;
                    if !head.eq_ignore_ascii_case(expected) {
                        return None;
                    }
                    remaining = tail;
                }
                Segment::Param(name) => {
                    let (head, tail) = remaining.split_first()?;
                    params.insert(name.clone(), (*head).to_owned());
                    remaining = tail;
                }
            }
        }
        remaining.is_empty().then_some(params)
    }
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute {
    path: String,
    name: Option<String>,
    params: BTreeMap<String, String>,
    chain: Vec<RouteMeta>,
    redirected_from: Option<String>,
}

impl MatchedRoute {
    /// Resolved path, after any redirects, without query or fragment.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Name of the matched record.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Requested path when a redirect record was followed.
    pub fn redirected_from(&self) -> Option<&str> {
        self.redirected_from.as_deref()
    }

    /// Captured path parameters.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Meta of every record from the root to the leaf.
    pub fn chain(&self) -> &[RouteMeta] {
        &self.chain
    }

    /// Return whether any record in the chain requires a token.
    pub fn requires_auth(&self) -> bool {
        self.chain.iter().any(|meta| meta.requires_auth)
    }

    /// Return whether any record in the chain is guest-only.
    pub fn is_guest_only(&self) -> bool {
        self.chain.iter().any(|meta| meta.guest_only)
    }

    /// Union of the requirements declared along the chain.
    pub fn requirements(&self) -> PermissionRequirements {
        self.chain
            .iter()
            .fold(PermissionRequirements::new(), |mut acc, meta| {
                acc.merge(&meta.requirements());
                acc
            })
    }

    /// Title of the deepest record that declares one.
    pub fn title(&self) -> Option<&str> {
        self.chain.iter().rev().find_map(|meta| meta.title.as_deref())
    }
}

/// Compiled, flattened route tree.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile a route tree.
    pub fn from_records(records: Vec<RouteRecord>) -> Self {
        let mut routes = Vec::new();
        for record in records {
            compile(record, "", &[], &mut routes);
        }
        Self { routes }
    }

    /// Parse and compile a JSON list of route records.
    ///
    /// # Errors
    ///
    /// Returns [`RouteTableError::Malformed`] when the document does not
    /// describe a list of records.
    pub fn from_json(json: &str) -> Result<Self, RouteTableError> {
        let records: Vec<RouteRecord> =
            serde_json::from_str(json).map_err(|err| RouteTableError::Malformed {
                message: err.to_string(),
            })?;
        Ok(Self::from_records(records))
    }

    /// Number of matchable records.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Return whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve `path`, following redirect records.
    ///
    /// Returns `None` when nothing matches or when redirects loop.
    ///
    /// # Examples
    /// ```
    /// use client::domain::RouteTable;
    ///
    /// let table = RouteTable::application();
    /// let matched = table.resolve("/profile?tab=security").expect("known route");
    /// assert_eq!(matched.path(), "/settings/profile");
    /// assert_eq!(matched.redirected_from(), Some("/profile"));
    /// assert!(matched.requires_auth());
    /// ```
    pub fn resolve(&self, path: &str) -> Option<MatchedRoute> {
        let requested = strip_suffixes(path);
        let mut current = requested.to_owned();
        for _ in 0..=MAX_REDIRECT_HOPS {
            let parts: Vec<&str> = split_path(&current).collect();
            let (route, params) = self.best_match(&parts)?;
            match &route.redirect {
                Some(target) => current = strip_suffixes(target).to_owned(),
                None => {
                    let redirected_from = (current != requested).then(|| requested.to_owned());
                    return Some(MatchedRoute {
                        path: current,
                        name: route.name.clone(),
                        params,
                        chain: route.chain.clone(),
                        redirected_from,
                    });
                }
            }
        }
        warn!(path, "redirect chain exceeded hop limit");
        None
    }

    fn best_match(&self, parts: &[&str]) -> Option<(&CompiledRoute, BTreeMap<String, String>)> {
        let mut best: Option<(&CompiledRoute, BTreeMap<String, String>)> = None;
        for route in &self.routes {
            let Some(params) = route.matches(parts) else {
                continue;
            };
            let better = best
                .as_ref()
                .is_none_or(|(current, _)| route.rank(current) == Ordering::Greater);
            if better {
                best = Some((route, params));
            }
        }
        best
    }

    /// Route tree of the TatApps administration UI.
    pub fn application() -> Self {
        let page = |path: &str, name: &str, title: &str| {
            RouteRecord::new(path)
                .named(name)
                .with_meta(RouteMeta::new().titled(title))
        };
        let guarded = |path: &str, name: &str, title: &str, permission: &str| {
            RouteRecord::new(path).named(name).with_meta(
                RouteMeta::new()
                    .titled(title)
                    .with_permissions([permission]),
            )
        };

        Self::from_records(vec![
            RouteRecord::new(LOGIN_PATH)
                .named("Login")
                .with_meta(RouteMeta::new().guest_only()),
            page(FORBIDDEN_PATH, "ErrorForbidden", "Akses Ditolak"),
            page(SERVER_ERROR_PATH, "ErrorServer", "Kesalahan Sistem"),
            RouteRecord::new(HOME_PATH)
                .with_meta(RouteMeta::new().requires_auth())
                .with_children(vec![
                    page("", "Dashboard", "Dashboard"),
                    page("/warehouses", "Warehouses", "Warehouses"),
                    page("/warehouses/:id", "WarehouseDetail", "Warehouse Detail"),
                    page("/inventory", "Inventory", "Inventory"),
                    page("/inventory/:id", "InventoryDetail", "Inventory Detail"),
                    guarded(
                        "/inventory/categories",
                        "InventoryCategories",
                        "Categories",
                        "category.view",
                    ),
                    page(
                        "/inventory/transactions",
                        "InventoryTransactions",
                        "Transactions",
                    ),
                    guarded("/employees", "EmployeeData", "Data Karyawan", "employee.view"),
                    guarded(
                        "/employees/create",
                        "EmployeeCreate",
                        "Tambah Karyawan",
                        "employee.create",
                    ),
                    guarded(
                        "/employees/:id/edit",
                        "EmployeeEdit",
                        "Edit Karyawan",
                        "employee.update",
                    ),
                    guarded(
                        "/employees/divisions",
                        "EmployeeDivisions",
                        "Divisi",
                        "employee.view",
                    ),
                    guarded(
                        "/employees/positions",
                        "EmployeePositions",
                        "Jabatan",
                        "employee.view",
                    ),
                    guarded(
                        "/employees/positions/hierarchy",
                        "EmployeeHierarchy",
                        "Hierarki Jabatan",
                        "employee.view",
                    ),
                    page("/leads", "Leads", "Leads"),
                    page("/projects", "Projects", "Projects"),
                    page("/purchase-orders", "PurchaseOrders", "Purchase Orders"),
                    page("/purchase-orders/:id", "PODetail", "Purchase Order Detail"),
                    page("/support", "Support", "Support"),
                    page("/settings/profile", "Profile", "Profile"),
                    page("/settings/company", "CompanyProfile", "Profil Perusahaan"),
                    page(
                        "/settings/notifications",
                        "NotificationSettings",
                        "Notification Settings",
                    ),
                    page("/settings/sites", "SiteSettings", "Site Settings"),
                    page("/settings/users", "UserManagement", "User Management"),
                    RouteRecord::new("/profile").redirect_to("/settings/profile"),
                ]),
            page("/:pathMatch(.*)*", "NotFound", "Halaman Tidak Ditemukan"),
        ])
    }
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_owned()
    } else if child.is_empty() {
        parent.to_owned()
    } else {
        format!("{}/{child}", parent.trim_end_matches('/'))
    }
}

fn compile(record: RouteRecord, parent: &str, chain: &[RouteMeta], out: &mut Vec<CompiledRoute>) {
    let path = join_paths(parent, &record.path);
    let mut chain = chain.to_vec();
    chain.push(record.meta);

    out.push(CompiledRoute {
        name: record.name,
        segments: split_path(&path).map(Segment::parse).collect(),
        chain: chain.clone(),
        redirect: record.redirect,
    });
    for child in record.children {
        compile(child, &path, &chain, out);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> RouteTable {
        RouteTable::application()
    }

    #[rstest]
    #[case("/inventory/categories", Some("InventoryCategories"))]
    #[case("/inventory/42", Some("InventoryDetail"))]
    #[case("/employees/7/edit", Some("EmployeeEdit"))]
    #[case("/employees/positions/hierarchy", Some("EmployeeHierarchy"))]
    #[case("/", Some("Dashboard"))]
    #[case("/Warehouses/", Some("Warehouses"))]
    #[case("/no/such/page", Some("NotFound"))]
    fn static_segments_outrank_params(
        table: RouteTable,
        #[case] path: &str,
        #[case] expected: Option<&str>,
    ) {
        let matched = table.resolve(path).expect("every path matches something");
        assert_eq!(matched.name(), expected);
    }

    #[rstest]
    fn params_are_captured(table: RouteTable) {
        let matched = table.resolve("/warehouses/12#stock").expect("detail route");
        assert_eq!(matched.params().get("id").map(String::as_str), Some("12"));
        assert_eq!(matched.title(), Some("Warehouse Detail"));
    }

    #[rstest]
    fn children_inherit_requires_auth_and_aggregate_permissions(table: RouteTable) {
        let matched = table.resolve("/employees/create").expect("create route");
        assert!(matched.requires_auth());
        let requirements = matched.requirements();
        assert!(requirements.all().contains("employee.create"));
        assert!(requirements.any().is_empty());
    }

    #[rstest]
    fn login_is_guest_only_and_public(table: RouteTable) {
        let matched = table.resolve("/login").expect("login route");
        assert!(matched.is_guest_only());
        assert!(!matched.requires_auth());
    }

    #[test]
    fn redirect_loops_resolve_to_nothing() {
        let table = RouteTable::from_records(vec![
            RouteRecord::new("/a").redirect_to("/b"),
            RouteRecord::new("/b").redirect_to("/a"),
        ]);
        assert!(table.resolve("/a").is_none());
    }

    #[test]
    fn json_tables_accept_single_or_listed_permissions() {
        let table = RouteTable::from_json(
            r#"[{
                "path": "/po",
                "meta": { "requiresAuth": true, "permissions": "po.view" },
                "children": [{
                    "path": "approve",
                    "meta": { "allPermissions": ["po.view", "po.approve"],
                              "anyPermissions": ["po.manager"], "anyPermission": "po.director" }
                }]
            }]"#,
        )
        .expect("valid table");

        let matched = table.resolve("/po/approve").expect("nested route");
        let requirements = matched.requirements();
        assert_eq!(requirements.all().len(), 2);
        assert_eq!(requirements.any().len(), 2);
        assert!(matched.requires_auth());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = RouteTable::from_json(r#"{"path": "/"}"#).expect_err("not a list");
        assert!(matches!(err, RouteTableError::Malformed { .. }));
    }

    #[test]
    fn unmatched_paths_resolve_to_nothing_without_a_catch_all() {
        let table = RouteTable::from_records(vec![RouteRecord::new("/only")]);
        assert!(table.resolve("/other").is_none());
        assert_eq!(table.len(), 1);
    }
}

//! Warehouse cache synchronizer.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::envelope::{collection, record};
use super::ids::EntityId;
use super::ports::{ApiRequest, RemoteApi};
use super::status::StatusTracker;
use super::warehouse::Warehouse;
use super::Error;

const WAREHOUSES_PATH: &str = "/warehouses";

#[derive(Debug, Default)]
struct WarehouseState {
    warehouses: Vec<Warehouse>,
    current: Option<Warehouse>,
    hydrated: bool,
}

/// Synchronizer for the warehouse list and the warehouse being viewed.
pub struct WarehouseSynchronizer<A> {
    api: Arc<A>,
    state: RwLock<WarehouseState>,
    hydration: Mutex<()>,
    status: StatusTracker,
}

impl<A: RemoteApi> WarehouseSynchronizer<A> {
    /// Create an unhydrated synchronizer.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(WarehouseState::default()),
            hydration: Mutex::new(()),
            status: StatusTracker::new(),
        }
    }

    /// Loading flag and last error.
    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Return whether the list has been loaded.
    pub fn is_hydrated(&self) -> bool {
        self.read(|state| state.hydrated)
    }

    /// Cached warehouses.
    pub fn warehouses(&self) -> Vec<Warehouse> {
        self.read(|state| state.warehouses.clone())
    }

    /// Warehouse last fetched by id.
    pub fn current(&self) -> Option<Warehouse> {
        self.read(|state| state.current.clone())
    }

    /// Cached warehouse by id.
    pub fn find_warehouse(&self, id: EntityId) -> Option<Warehouse> {
        self.read(|state| state.warehouses.iter().find(|w| w.id == Some(id)).cloned())
    }

    fn read<R>(&self, f: impl FnOnce(&WarehouseState) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut WarehouseState) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Load the list unless already hydrated.
    pub async fn hydrate(&self) -> Result<(), Error> {
        let _single_flight = self.hydration.lock().await;
        if self.is_hydrated() {
            return Ok(());
        }
        self.status.track(self.load_all()).await
    }

    /// Reload the list.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _single_flight = self.hydration.lock().await;
        self.status.track(self.load_all()).await
    }

    async fn load_all(&self) -> Result<(), Error> {
        let body = self.api.send(ApiRequest::get(WAREHOUSES_PATH)).await?;
        let warehouses: Vec<Warehouse> = collection(body).iter().map(Warehouse::from_raw).collect();
        debug!(count = warehouses.len(), "warehouses loaded");
        self.write(|state| {
            state.warehouses = warehouses;
            state.hydrated = true;
        });
        Ok(())
    }

    /// Fetch one warehouse, make it current, and refresh its cached entry.
    pub async fn fetch_warehouse(&self, id: EntityId) -> Result<Warehouse, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::get(format!("{WAREHOUSES_PATH}/{id}")))
                    .await?;
                let raw =
                    record(body).ok_or_else(|| Error::not_found(format!("warehouse {id}")))?;
                let mut warehouse = Warehouse::from_raw(&raw);
                warehouse.id.get_or_insert(id);
                self.write(|state| {
                    if let Some(slot) = state.warehouses.iter_mut().find(|w| w.id == Some(id)) {
                        *slot = warehouse.clone();
                    }
                    state.current = Some(warehouse.clone());
                });
                Ok(warehouse)
            })
            .await
    }

    /// Create a warehouse.
    pub async fn create_warehouse(&self, payload: Value) -> Result<Warehouse, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::post(WAREHOUSES_PATH, payload))
                    .await?;
                let warehouse = record(body)
                    .map(|raw| Warehouse::from_raw(&raw))
                    .unwrap_or_default();
                if warehouse.id.is_some() {
                    self.write(|state| state.warehouses.push(warehouse.clone()));
                }
                Ok(warehouse)
            })
            .await
    }

    /// Update a warehouse; unknown ids have no local effect.
    pub async fn update_warehouse(&self, id: EntityId, payload: Value) -> Result<Warehouse, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::put(format!("{WAREHOUSES_PATH}/{id}"), payload))
                    .await?;
                let Some(raw) = record(body) else {
                    debug!(%id, "warehouse update echoed no record");
                    return Ok(self.find_warehouse(id).unwrap_or_else(|| Warehouse {
                        id: Some(id),
                        ..Warehouse::default()
                    }));
                };
                let mut warehouse = Warehouse::from_raw(&raw);
                warehouse.id.get_or_insert(id);
                self.write(|state| {
                    if let Some(slot) = state.warehouses.iter_mut().find(|w| w.id == Some(id)) {
                        *slot = warehouse.clone();
                    }
                    if let Some(current) = state.current.as_mut().filter(|c| c.id == Some(id)) {
                        *current = warehouse.clone();
                    }
                });
                Ok(warehouse)
            })
            .await
    }

    /// Delete a warehouse.
    pub async fn delete_warehouse(&self, id: EntityId) -> Result<(), Error> {
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(format!("{WAREHOUSES_PATH}/{id}")))
                    .await?;
                self.write(|state| {
                    state.warehouses.retain(|w| w.id != Some(id));
                    if state.current.as_ref().is_some_and(|c| c.id == Some(id)) {
                        state.current = None;
                    }
                });
                debug!(%id, "warehouse removed");
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{ApiError, ApiMethod, MockRemoteApi};
    use serde_json::json;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).expect("positive id")
    }

    fn listing() -> Value {
        json!({ "data": [
            { "id": 1, "code": "WH-01", "name": "Bandung" },
            { "id": 2, "code": "WH-02", "name": "Jakarta" },
        ]})
    }

    #[tokio::test]
    async fn hydrate_is_idempotent() {
        let mut api = MockRemoteApi::new();
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Get && req.path == "/warehouses")
            .times(1)
            .returning(|_| Ok(listing()));
        let sync = WarehouseSynchronizer::new(Arc::new(api));

        sync.hydrate().await.expect("first");
        sync.hydrate().await.expect("second");

        assert_eq!(sync.warehouses().len(), 2);
    }

    #[tokio::test]
    async fn fetch_sets_current_and_refreshes_the_cached_entry() {
        let mut api = MockRemoteApi::new();
        api.expect_send()
            .withf(|req| req.path == "/warehouses")
            .returning(|_| Ok(listing()));
        api.expect_send()
            .withf(|req| req.path == "/warehouses/2")
            .returning(|_| Ok(json!({ "data": { "code": "WH-02", "name": "Jakarta Utara" } })));
        let sync = WarehouseSynchronizer::new(Arc::new(api));
        sync.hydrate().await.expect("hydrate");

        let fetched = sync.fetch_warehouse(id(2)).await.expect("fetch");

        assert_eq!(fetched.id, Some(id(2)));
        assert_eq!(sync.current().map(|w| w.name), Some("Jakarta Utara".to_owned()));
        assert_eq!(
            sync.find_warehouse(id(2)).map(|w| w.name),
            Some("Jakarta Utara".to_owned())
        );
    }

    #[tokio::test]
    async fn delete_clears_the_matching_current_warehouse() {
        let mut api = MockRemoteApi::new();
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Get && req.path == "/warehouses")
            .returning(|_| Ok(listing()));
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Get && req.path == "/warehouses/1")
            .returning(|_| Ok(json!({ "id": 1, "name": "Bandung" })));
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Delete && req.path == "/warehouses/1")
            .times(1)
            .returning(|_| Ok(Value::Null));
        let sync = WarehouseSynchronizer::new(Arc::new(api));
        sync.hydrate().await.expect("hydrate");
        sync.fetch_warehouse(id(1)).await.expect("fetch");

        sync.delete_warehouse(id(1)).await.expect("delete");

        assert!(sync.current().is_none());
        assert_eq!(sync.warehouses().len(), 1);
    }

    #[tokio::test]
    async fn create_appends_and_not_found_surfaces_message() {
        let mut api = MockRemoteApi::new();
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Post)
            .returning(|_| Ok(json!({ "data": { "id": 3, "code": "WH-03", "name": "Surabaya" } })));
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Put)
            .returning(|_| Err(ApiError::not_found("Warehouse not found")));
        let sync = WarehouseSynchronizer::new(Arc::new(api));

        let created = sync
            .create_warehouse(json!({ "code": "WH-03", "name": "Surabaya" }))
            .await
            .expect("create");
        let err = sync
            .update_warehouse(id(9), json!({ "name": "Ghost" }))
            .await
            .expect_err("missing");

        assert_eq!(created.color, "#6366F1");
        assert_eq!(sync.warehouses().len(), 1);
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(sync.status().error().as_deref(), Some("Warehouse not found"));
    }
    #[tokio::test]
    async fn empty_mutation_responses_keep_cached_warehouses() {
        let mut api = MockRemoteApi::new();
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Get && req.path == "/warehouses")
            .returning(|_| Ok(listing()));
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Put && req.path == "/warehouses/1")
            .returning(|_| Ok(Value::Null));
        api.expect_send()
            .withf(|req| req.method == ApiMethod::Post)
            .returning(|_| Ok(json!({})));
        let sync = WarehouseSynchronizer::new(Arc::new(api));
        sync.hydrate().await.expect("hydrate");
        let before = sync.warehouses();

        let updated = sync
            .update_warehouse(id(1), json!({ "name": "Cimahi" }))
            .await
            .expect("update");
        sync.create_warehouse(json!({ "code": "WH-04" }))
            .await
            .expect("create");

        assert_eq!(updated.name, "Bandung");
        assert_eq!(sync.warehouses(), before);
    }

    #[tokio::test]
    async fn fetching_an_empty_body_is_not_found() {
        let mut api = MockRemoteApi::new();
        api.expect_send()
            .withf(|req| req.path == "/warehouses/4")
            .returning(|_| Ok(Value::Null));
        let sync = WarehouseSynchronizer::new(Arc::new(api));

        let err = sync.fetch_warehouse(id(4)).await.expect_err("no record");

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(sync.current().is_none());
    }
}

//! Inventory cache synchronizer: items and their stock movements.

use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::envelope::{collection, record};
use super::ids::{EntityId, IdBatch};
use super::inventory::{InventoryItem, InventoryTransaction};
use super::ports::{ApiRequest, RemoteApi};
use super::status::StatusTracker;
use super::Error;

const INVENTORY_PATH: &str = "/inventory";
const ITEMS_PATH: &str = "/inventory/items";
const TRANSACTIONS_PATH: &str = "/inventory/transactions";
const LOW_STOCK_PATH: &str = "/inventory/low-stock";

#[derive(Debug, Default)]
struct InventoryState {
    items: Vec<InventoryItem>,
    transactions: Vec<InventoryTransaction>,
    current: Option<InventoryItem>,
    hydrated: bool,
}

impl InventoryState {
    fn replace_item(&mut self, item: &InventoryItem) {
        let Some(id) = item.id else {
            return;
        };
        if let Some(slot) = self.items.iter_mut().find(|i| i.id == Some(id)) {
            *slot = item.clone();
        }
        if let Some(current) = self.current.as_mut().filter(|c| c.id == Some(id)) {
            *current = item.clone();
        }
    }

    fn remove_items(&mut self, batch: &IdBatch) {
        self.items.retain(|item| !batch.contains(item.id));
        if self.current.as_ref().is_some_and(|c| batch.contains(c.id)) {
            self.current = None;
        }
        for transaction in self
            .transactions
            .iter_mut()
            .filter(|t| batch.contains(t.item_id))
        {
            transaction.item_id = None;
            transaction.item_name.clear();
        }
    }

    fn item_name(&self, id: Option<EntityId>) -> Option<String> {
        let id = id?;
        self.items
            .iter()
            .find(|item| item.id == Some(id))
            .map(|item| item.name.clone())
    }
}

/// Synchronizer for inventory items and transactions.
pub struct InventorySynchronizer<A> {
    api: Arc<A>,
    state: RwLock<InventoryState>,
    hydration: Mutex<()>,
    status: StatusTracker,
}

impl<A: RemoteApi> InventorySynchronizer<A> {
    /// Create an unhydrated synchronizer.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: RwLock::new(InventoryState::default()),
            hydration: Mutex::new(()),
            status: StatusTracker::new(),
        }
    }

    /// Loading flag and last error.
    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Return whether items and transactions have been loaded.
    pub fn is_hydrated(&self) -> bool {
        self.read(|state| state.hydrated)
    }

    /// Cached items.
    pub fn items(&self) -> Vec<InventoryItem> {
        self.read(|state| state.items.clone())
    }

    /// Cached transactions, newest first.
    pub fn transactions(&self) -> Vec<InventoryTransaction> {
        self.read(|state| state.transactions.clone())
    }

    /// Item last fetched by id.
    pub fn current_item(&self) -> Option<InventoryItem> {
        self.read(|state| state.current.clone())
    }

    /// Forget the current item.
    pub fn clear_current_item(&self) {
        self.write(|state| state.current = None);
    }

    /// Cached item by id.
    pub fn find_item(&self, id: EntityId) -> Option<InventoryItem> {
        self.read(|state| state.items.iter().find(|i| i.id == Some(id)).cloned())
    }

    /// Items at or below their minimum stock.
    pub fn low_stock_items(&self) -> Vec<InventoryItem> {
        self.read(|state| {
            state
                .items
                .iter()
                .filter(|item| item.is_low_stock())
                .cloned()
                .collect()
        })
    }

    /// Items stored in `warehouse`.
    pub fn items_by_warehouse(&self, warehouse: EntityId) -> Vec<InventoryItem> {
        self.read(|state| {
            state
                .items
                .iter()
                .filter(|item| item.warehouse_id == Some(warehouse))
                .cloned()
                .collect()
        })
    }

    /// Items in `category`.
    pub fn items_by_category(&self, category: &str) -> Vec<InventoryItem> {
        self.read(|state| {
            state
                .items
                .iter()
                .filter(|item| item.category == category)
                .cloned()
                .collect()
        })
    }

    /// Sum of quantity times unit price over cached items.
    pub fn total_inventory_value(&self) -> f64 {
        self.read(|state| state.items.iter().map(InventoryItem::stock_value).sum())
    }

    fn read<R>(&self, f: impl FnOnce(&InventoryState) -> R) -> R {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut InventoryState) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Load items and transactions unless already hydrated.
    pub async fn hydrate(&self) -> Result<(), Error> {
        let _single_flight = self.hydration.lock().await;
        if self.is_hydrated() {
            return Ok(());
        }
        self.status.track(self.load_all()).await
    }

    /// Reload items and transactions.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _single_flight = self.hydration.lock().await;
        self.status.track(self.load_all()).await
    }

    async fn load_all(&self) -> Result<(), Error> {
        let (items, transactions) = tokio::try_join!(
            self.api.send(ApiRequest::get(INVENTORY_PATH)),
            self.api.send(ApiRequest::get(TRANSACTIONS_PATH)),
        )?;
        let items: Vec<InventoryItem> = collection(items)
            .iter()
            .map(InventoryItem::from_raw)
            .collect();
        let transactions: Vec<InventoryTransaction> = collection(transactions)
            .iter()
            .map(InventoryTransaction::from_raw)
            .collect();
        debug!(
            items = items.len(),
            transactions = transactions.len(),
            "inventory loaded"
        );
        self.write(|state| {
            state.items = items;
            state.transactions = transactions;
            state.hydrated = true;
        });
        Ok(())
    }

    async fn read_item(&self, id: EntityId) -> Result<InventoryItem, Error> {
        let body = self
            .api
            .send(ApiRequest::get(format!("{ITEMS_PATH}/{id}")))
            .await?;
        let raw =
            record(body).ok_or_else(|| Error::not_found(format!("inventory item {id}")))?;
        let mut item = InventoryItem::from_raw(&raw);
        item.id.get_or_insert(id);
        Ok(item)
    }

    /// Fetch one item, make it current, and refresh its cached entry.
    pub async fn fetch_item(&self, id: EntityId) -> Result<InventoryItem, Error> {
        self.status
            .track(async {
                let item = self.read_item(id).await?;
                self.write(|state| {
                    state.replace_item(&item);
                    state.current = Some(item.clone());
                });
                Ok(item)
            })
            .await
    }

    /// Items the API reports as low on stock. The cache is not touched.
    pub async fn fetch_low_stock(&self) -> Result<Vec<InventoryItem>, Error> {
        self.status
            .track(async {
                let body = self.api.send(ApiRequest::get(LOW_STOCK_PATH)).await?;
                Ok(collection(body).iter().map(InventoryItem::from_raw).collect())
            })
            .await
    }

    /// Create an item.
    pub async fn create_item(&self, payload: Value) -> Result<InventoryItem, Error> {
        self.status
            .track(async {
                let body = self.api.send(ApiRequest::post(ITEMS_PATH, payload)).await?;
                let item = record(body)
                    .map(|raw| InventoryItem::from_raw(&raw))
                    .unwrap_or_default();
                if item.id.is_some() {
                    self.write(|state| state.items.push(item.clone()));
                }
                Ok(item)
            })
            .await
    }

    /// Update an item; unknown ids have no local effect.
    pub async fn update_item(&self, id: EntityId, payload: Value) -> Result<InventoryItem, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::put(format!("{ITEMS_PATH}/{id}"), payload))
                    .await?;
                let Some(raw) = record(body) else {
                    debug!(%id, "item update echoed no record");
                    return Ok(self.find_item(id).unwrap_or_else(|| InventoryItem {
                        id: Some(id),
                        ..InventoryItem::default()
                    }));
                };
                let mut item = InventoryItem::from_raw(&raw);
                item.id.get_or_insert(id);
                self.write(|state| {
                    state.replace_item(&item);
                    if !item.name.is_empty() {
                        for transaction in state
                            .transactions
                            .iter_mut()
                            .filter(|t| t.item_id == Some(id))
                        {
                            transaction.item_name.clone_from(&item.name);
                        }
                    }
                });
                Ok(item)
            })
            .await
    }

    /// Delete one item; its transactions lose their item reference.
    pub async fn delete_item(&self, id: EntityId) -> Result<(), Error> {
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(format!("{ITEMS_PATH}/{id}")))
                    .await?;
                self.write(|state| state.remove_items(&IdBatch::from_ids([id])));
                debug!(%id, "inventory item removed");
                Ok(())
            })
            .await
    }

    /// Delete several items in one call.
    ///
    /// Malformed ids are dropped; an empty batch sends nothing. Returns the
    /// number of ids sent.
    pub async fn delete_items_batch(&self, raw_ids: &[Value]) -> Result<usize, Error> {
        let batch = IdBatch::from_raw(raw_ids);
        let dropped = raw_ids.len().saturating_sub(batch.len());
        if dropped > 0 {
            warn!(dropped, "ignoring malformed or repeated item ids");
        }
        if batch.is_empty() {
            return Ok(0);
        }
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(ITEMS_PATH).with_body(batch.to_payload()))
                    .await?;
                self.write(|state| state.remove_items(&batch));
                debug!(count = batch.len(), "inventory items removed");
                Ok(batch.len())
            })
            .await
    }

    /// Fetch the movements of one item, refreshing cached copies.
    pub async fn fetch_item_transactions(
        &self,
        item: EntityId,
    ) -> Result<Vec<InventoryTransaction>, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::get(format!("{ITEMS_PATH}/{item}/transactions")))
                    .await?;
                let fetched: Vec<InventoryTransaction> = collection(body)
                    .iter()
                    .map(InventoryTransaction::from_raw)
                    .collect();
                self.write(|state| {
                    for transaction in &fetched {
                        if let Some(slot) = state
                            .transactions
                            .iter_mut()
                            .find(|t| t.id.is_some() && t.id == transaction.id)
                        {
                            *slot = transaction.clone();
                        }
                    }
                });
                Ok(fetched)
            })
            .await
    }

    /// Record a stock movement for `item`.
    ///
    /// The new transaction is prepended, then only the affected item is
    /// re-read so its quantity reflects the movement.
    pub async fn record_transaction(
        &self,
        item: EntityId,
        payload: Value,
    ) -> Result<InventoryTransaction, Error> {
        self.status
            .track(async {
                let body = self
                    .api
                    .send(ApiRequest::post(
                        format!("{ITEMS_PATH}/{item}/transactions"),
                        payload,
                    ))
                    .await?;
                let mut transaction = record(body)
                    .map(|raw| InventoryTransaction::from_raw(&raw))
                    .unwrap_or_default();
                transaction.item_id.get_or_insert(item);
                self.write(|state| {
                    if transaction.item_name.is_empty() {
                        if let Some(name) = state.item_name(transaction.item_id) {
                            transaction.item_name = name;
                        }
                    }
                    if transaction.id.is_some() {
                        state.transactions.insert(0, transaction.clone());
                    }
                });

                let tracked = self.read(|state| {
                    state.items.iter().any(|i| i.id == Some(item))
                        || state.current.as_ref().is_some_and(|c| c.id == Some(item))
                });
                if tracked {
                    let refreshed = self.read_item(item).await?;
                    self.write(|state| state.replace_item(&refreshed));
                }
                Ok(transaction)
            })
            .await
    }

    /// Delete one transaction.
    pub async fn delete_transaction(&self, id: EntityId) -> Result<(), Error> {
        self.status
            .track(async {
                self.api
                    .send(ApiRequest::delete(format!("{TRANSACTIONS_PATH}/{id}")))
                    .await?;
                self.write(|state| state.transactions.retain(|t| t.id != Some(id)));
                Ok(())
            })
            .await
    }
}

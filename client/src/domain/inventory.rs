//! Inventory items and stock movements.

use serde::Serialize;
use serde_json::Value;

use super::ids::EntityId;
use super::normalize::RawRecord;

/// Stock-keeping record held in one warehouse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Option<EntityId>,
    pub warehouse_id: Option<EntityId>,
    /// Label of `warehouse_id`.
    pub warehouse_name: String,
    /// Serial number; older payloads call it `sku`.
    pub sn: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub unit: String,
    pub quantity: f64,
    pub min_stock: f64,
    pub max_stock: f64,
    pub unit_price: f64,
    pub is_active: bool,
}

impl InventoryItem {
    /// Normalize an API record.
    pub fn from_raw(value: &Value) -> Self {
        let raw = RawRecord::new(value);
        Self {
            id: raw.field("id").id(),
            warehouse_id: raw
                .field("warehouseId")
                .or("warehouse_id")
                .or_nested("warehouse", "id")
                .id(),
            warehouse_name: raw
                .field("warehouseName")
                .or("warehouse_name")
                .or_nested("warehouse", "name")
                .text(),
            sn: raw.field("sn").or("sku").text(),
            name: raw.field("name").text(),
            description: raw.field("description").text(),
            category: raw.field("category").text(),
            unit: raw.field("unit").text(),
            quantity: raw.field("quantity").number_or(0.0),
            min_stock: raw.field("minStock").or("min_stock").number_or(0.0),
            max_stock: raw.field("maxStock").or("max_stock").number_or(0.0),
            unit_price: raw.field("unitPrice").or("unit_price").number_or(0.0),
            is_active: raw.field("isActive").or("is_active").flag_or(true),
        }
    }

    /// Return whether stock is at or below the minimum.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// Quantity times unit price.
    pub fn stock_value(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    In,
    Out,
    Transfer,
    Adjustment,
    #[default]
    Unknown,
}

impl TransactionKind {
    /// Parse the API's `type` string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "in" => Self::In,
            "out" => Self::Out,
            "transfer" => Self::Transfer,
            "adjustment" => Self::Adjustment,
            _ => Self::Unknown,
        }
    }
}

/// One recorded stock movement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTransaction {
    pub id: Option<EntityId>,
    pub item_id: Option<EntityId>,
    /// Label of `item_id`.
    pub item_name: String,
    pub kind: TransactionKind,
    pub quantity: f64,
    pub from_warehouse_id: Option<EntityId>,
    pub from_warehouse_name: String,
    pub to_warehouse_id: Option<EntityId>,
    pub to_warehouse_name: String,
    pub reference: String,
    pub notes: String,
    pub created_by_id: Option<EntityId>,
    pub created_by_name: String,
    pub created_at: Option<String>,
}

impl InventoryTransaction {
    /// Normalize an API record.
    pub fn from_raw(value: &Value) -> Self {
        let raw = RawRecord::new(value);
        Self {
            id: raw.field("id").id(),
            item_id: raw
                .field("itemId")
                .or("item_id")
                .or_nested("item", "id")
                .id(),
            item_name: raw
                .field("itemName")
                .or("item_name")
                .or_nested("item", "name")
                .text(),
            kind: TransactionKind::parse(&raw.field("type").or("kind").text()),
            quantity: raw.field("quantity").number_or(0.0),
            from_warehouse_id: raw
                .field("fromWarehouseId")
                .or("from_warehouse_id")
                .or_nested("from_warehouse", "id")
                .id(),
            from_warehouse_name: raw
                .field("fromWarehouseName")
                .or("from_warehouse_name")
                .or_nested("from_warehouse", "name")
                .text(),
            to_warehouse_id: raw
                .field("toWarehouseId")
                .or("to_warehouse_id")
                .or_nested("to_warehouse", "id")
                .id(),
            to_warehouse_name: raw
                .field("toWarehouseName")
                .or("to_warehouse_name")
                .or_nested("to_warehouse", "name")
                .text(),
            reference: raw.field("reference").text(),
            notes: raw.field("notes").text(),
            created_by_id: raw
                .field("createdById")
                .or("created_by_id")
                .or_nested("created_by", "id")
                .id(),
            created_by_name: raw
                .field("createdByName")
                .or("created_by_name")
                .or_nested("created_by", "full_name")
                .text(),
            created_at: raw.field("createdAt").or("created_at").optional_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn items_read_sku_and_nested_warehouse() {
        let item = InventoryItem::from_raw(&json!({
            "id": 4,
            "sku": "SN-001",
            "warehouse_id": 2,
            "warehouse": { "id": 2, "name": "Jakarta" },
            "quantity": 3,
            "min_stock": "5",
            "unit_price": 2500.5,
        }));
        assert_eq!(item.sn, "SN-001");
        assert_eq!(item.warehouse_name, "Jakarta");
        assert!(item.is_low_stock());
        assert!((item.stock_value() - 7501.5).abs() < 1e-9);
        assert!(item.is_active);
    }

    #[rstest]
    #[case("in", TransactionKind::In)]
    #[case("OUT", TransactionKind::Out)]
    #[case("transfer", TransactionKind::Transfer)]
    #[case("adjustment", TransactionKind::Adjustment)]
    #[case("loan", TransactionKind::Unknown)]
    fn kinds_parse_case_insensitively(#[case] raw: &str, #[case] expected: TransactionKind) {
        assert_eq!(TransactionKind::parse(raw), expected);
    }

    #[test]
    fn transactions_label_warehouses_and_author() {
        let transaction = InventoryTransaction::from_raw(&json!({
            "id": 9,
            "item_id": 4,
            "item": { "id": 4, "name": "Kabel" },
            "type": "transfer",
            "quantity": 2,
            "from_warehouse": { "id": 1, "name": "Bandung" },
            "to_warehouse_id": 2,
            "created_by": { "id": 7, "full_name": "Admin" },
            "created_at": "2024-05-01T08:00:00Z",
        }));
        assert_eq!(transaction.item_name, "Kabel");
        assert_eq!(transaction.kind, TransactionKind::Transfer);
        assert_eq!(transaction.from_warehouse_id, EntityId::new(1));
        assert_eq!(transaction.from_warehouse_name, "Bandung");
        assert_eq!(transaction.to_warehouse_id, EntityId::new(2));
        assert_eq!(transaction.created_by_name, "Admin");
    }
}

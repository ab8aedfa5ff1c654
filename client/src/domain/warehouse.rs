//! Warehouse records.

use serde::Serialize;
use serde_json::Value;

use super::ids::EntityId;
use super::normalize::RawRecord;

/// Colour assigned to warehouses created without one.
pub const DEFAULT_WAREHOUSE_COLOR: &str = "#6366F1";

/// Storage location holding inventory items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Option<EntityId>,
    pub code: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub manager_id: Option<EntityId>,
    /// Label of `manager_id`.
    pub manager_name: String,
    pub color: String,
    pub is_active: bool,
}

impl Warehouse {
    /// Normalize an API record.
    ///
    /// ```
    /// use client::domain::Warehouse;
    /// use serde_json::json;
    ///
    /// let warehouse = Warehouse::from_raw(&json!({ "id": 2, "code": "WH-02" }));
    /// assert_eq!(warehouse.color, "#6366F1");
    /// assert!(warehouse.is_active);
    /// ```
    pub fn from_raw(value: &Value) -> Self {
        let raw = RawRecord::new(value);
        Self {
            id: raw.field("id").id(),
            code: raw.field("code").text(),
            name: raw.field("name").text(),
            address: raw.field("address").text(),
            city: raw.field("city").text(),
            province: raw.field("province").text(),
            postal_code: raw.field("postalCode").or("postal_code").text(),
            phone: raw.field("phone").text(),
            email: raw.field("email").text(),
            manager_id: raw
                .field("managerId")
                .or("manager_id")
                .or_nested("manager", "id")
                .id(),
            manager_name: raw
                .field("managerName")
                .or("manager_name")
                .or_nested("manager", "full_name")
                .text(),
            color: raw.field("color").text_or(DEFAULT_WAREHOUSE_COLOR),
            is_active: raw.field("isActive").or("is_active").flag_or(true),
        }
    }
}

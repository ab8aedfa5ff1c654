//! Behavioural tests for the entity caches over a scripted remote API.

use std::sync::Arc;

use client::domain::ports::ApiMethod;
use client::domain::{EntityId, HrSynchronizer, InventorySynchronizer};
use client::test_support::ScriptedRemoteApi;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn id(raw: u64) -> EntityId {
    EntityId::new(raw).expect("positive id")
}

#[fixture]
fn api() -> Arc<ScriptedRemoteApi> {
    let api = ScriptedRemoteApi::new();
    api.on(
        ApiMethod::Get,
        "/employees/divisions",
        json!({ "data": [
            { "id": 1, "name": "Gudang", "head_employee_id": 3, "head": "Rina" },
            { "id": 2, "name": "Keuangan" },
        ]}),
    )
    .on(
        ApiMethod::Get,
        "/employees/positions",
        json!({ "data": [
            { "id": 5, "title": "Kepala Gudang", "division_id": 1, "division_name": "Gudang" },
        ]}),
    )
    .on(
        ApiMethod::Get,
        "/employees",
        json!({ "data": [
            { "id": 1, "employee_code": "E1", "full_name": "Adi", "division_id": 1,
              "division_name": "Gudang", "position_id": 5 },
            { "id": 2, "nik": "E2", "full_name": "Budi", "division_id": 2 },
            { "id": 3, "fullName": "Rina", "divisionId": 1, "positionId": 5,
              "position": { "title": "Kepala Gudang" } },
        ]}),
    );
    Arc::new(api)
}

#[rstest]
#[tokio::test]
async fn batch_delete_sends_only_valid_ids(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Delete, "/employees", json!({ "message": "deleted" }));
    let hr = HrSynchronizer::new(Arc::clone(&api));
    hr.hydrate().await.expect("hydrate");

    let sent = hr
        .delete_employees_batch(&[json!(1), json!("x"), json!(2.5), json!(3)])
        .await
        .expect("batch delete");

    assert_eq!(sent, 2);
    let request = api
        .requests()
        .into_iter()
        .find(|request| request.method == ApiMethod::Delete)
        .expect("delete sent");
    assert_eq!(request.path, "/employees");
    assert_eq!(request.body, Some(json!({ "ids": [1, 3] })));

    let remaining: Vec<_> = hr.employees().into_iter().map(|e| e.full_name).collect();
    assert_eq!(remaining, vec!["Budi".to_owned()]);
    let gudang = hr.find_division(id(1)).expect("division kept");
    assert_eq!((gudang.head_employee_id, gudang.head.as_str()), (None, ""));
}

#[rstest]
#[tokio::test]
async fn empty_batch_makes_no_call(api: Arc<ScriptedRemoteApi>) {
    let hr = HrSynchronizer::new(Arc::clone(&api));

    let sent = hr
        .delete_employees_batch(&[json!("x"), json!(-4), Value::Null])
        .await
        .expect("nothing to send");

    assert_eq!(sent, 0);
    assert!(api.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn division_delete_cascades_to_dependants(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Delete, "/employees/divisions/1", Value::Null);
    let hr = HrSynchronizer::new(Arc::clone(&api));
    hr.hydrate().await.expect("hydrate");
    hr.hydrate().await.expect("second hydrate is a no-op");

    hr.delete_division(id(1)).await.expect("delete");

    assert_eq!(api.count(ApiMethod::Get, "/employees"), 1);
    assert!(hr.find_division(id(1)).is_none());
    let position = hr.find_position(id(5)).expect("position kept");
    assert_eq!((position.division_id, position.division_name.as_str()), (None, ""));
    for employee in hr.employees() {
        assert_ne!(employee.division_id, Some(id(1)), "{}", employee.full_name);
        if employee.id != Some(id(2)) {
            assert!(employee.division_name.is_empty());
        }
    }
    assert_eq!(hr.employee_count_by_division(id(2)), 1);
}

#[rstest]
#[tokio::test]
async fn hydrated_records_are_normalized(api: Arc<ScriptedRemoteApi>) {
    let hr = HrSynchronizer::new(Arc::clone(&api));
    hr.hydrate().await.expect("hydrate");

    let adi = hr.find_employee(id(1)).expect("adi");
    assert_eq!((adi.employee_code.as_str(), adi.nik.as_str()), ("E1", "E1"));
    assert_eq!(adi.division_name, "Gudang");
    assert_eq!(adi.status, "Aktif");
    assert_eq!(adi.timezone, "WIB (+7)");

    let rina = hr.find_employee(id(3)).expect("rina");
    assert_eq!(rina.division_id, Some(id(1)));
    assert_eq!(rina.position_title, "Kepala Gudang");

    let budi = hr.find_employee(id(2)).expect("budi");
    assert_eq!(budi.employee_code, "E2");

    assert_eq!(hr.find_division(id(2)).expect("keuangan").recruitment_status, "Stabil");
}

#[tokio::test]
async fn inventory_hydrates_items_and_transactions_together() {
    let api = ScriptedRemoteApi::new();
    api.on(
        ApiMethod::Get,
        "/inventory",
        json!({ "data": [{ "id": 1, "name": "Kabel", "quantity": 4, "unit_price": 2500 }] }),
    )
    .on(
        ApiMethod::Get,
        "/inventory/transactions",
        json!([{ "id": 3, "item_id": 1, "type": "out", "quantity": 1 }]),
    );
    let api = Arc::new(api);
    let inventory = InventorySynchronizer::new(Arc::clone(&api));

    inventory.hydrate().await.expect("hydrate");

    assert_eq!(inventory.items().len(), 1);
    assert_eq!(inventory.transactions().len(), 1);
    assert!((inventory.total_inventory_value() - 10_000.0).abs() < f64::EPSILON);
    assert!(!inventory.status().is_loading());
}

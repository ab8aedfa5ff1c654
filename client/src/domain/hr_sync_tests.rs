//! Tests for the HR synchronizer.

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{ApiError, ApiMethod};
use crate::test_support::ScriptedRemoteApi;

fn id(raw: u64) -> EntityId {
    EntityId::new(raw).expect("positive id")
}

fn script_collections(api: &ScriptedRemoteApi) {
    api.on(
        ApiMethod::Get,
        DIVISIONS_PATH,
        json!({ "data": [
            { "id": 1, "name": "Ops", "head_employee_id": 10, "head_position_id": 20,
              "head": "Budi", "head_title": "Ops Manager" },
            { "id": 2, "name": "Finance" },
        ]}),
    )
    .on(
        ApiMethod::Get,
        POSITIONS_PATH,
        json!({ "data": [
            { "id": 20, "title": "Ops Manager", "division_id": 1, "division": { "name": "Ops" } },
            { "id": 21, "title": "Ops Staff", "division_id": 1, "parent_id": 20,
              "division_name": "Ops" },
        ]}),
    )
    .on(
        ApiMethod::Get,
        EMPLOYEES_PATH,
        json!({ "data": [
            { "id": 10, "full_name": "Budi", "division_id": 1, "position_id": 20,
              "division": { "name": "Ops" }, "position": { "title": "Ops Manager" } },
            { "id": 11, "full_name": "Sari", "division_id": 1, "position_id": 21,
              "division_name": "Ops", "position_title": "Ops Staff" },
            { "id": 12, "full_name": "Tono", "division_id": 2, "division_name": "Finance" },
        ]}),
    );
}

#[fixture]
fn api() -> Arc<ScriptedRemoteApi> {
    let api = ScriptedRemoteApi::new();
    script_collections(&api);
    Arc::new(api)
}

async fn hydrated(api: &Arc<ScriptedRemoteApi>) -> HrSynchronizer<ScriptedRemoteApi> {
    let sync = HrSynchronizer::new(Arc::clone(api));
    sync.hydrate().await.expect("hydrate succeeds");
    sync
}

#[rstest]
#[tokio::test]
async fn hydrate_reads_each_collection_once(api: Arc<ScriptedRemoteApi>) {
    let sync = HrSynchronizer::new(Arc::clone(&api));
    assert!(!sync.is_hydrated());

    sync.hydrate().await.expect("first hydrate");
    sync.hydrate().await.expect("second hydrate");

    assert!(sync.is_hydrated());
    for path in [DIVISIONS_PATH, POSITIONS_PATH, EMPLOYEES_PATH] {
        assert_eq!(api.count(ApiMethod::Get, path), 1, "{path}");
    }
    assert_eq!(sync.employees().len(), 3);
}

#[tokio::test]
async fn concurrent_hydrations_share_one_load() {
    let api = ScriptedRemoteApi::new().with_latency(Duration::from_millis(20));
    script_collections(&api);
    let api = Arc::new(api);
    let sync = HrSynchronizer::new(Arc::clone(&api));

    let (first, second) = tokio::join!(sync.hydrate(), sync.hydrate());

    assert!(first.is_ok() && second.is_ok());
    assert_eq!(api.count(ApiMethod::Get, EMPLOYEES_PATH), 1);
    assert!(!sync.status().is_loading());
}

#[rstest]
#[tokio::test]
async fn refresh_always_reloads(api: Arc<ScriptedRemoteApi>) {
    let sync = hydrated(&api).await;
    sync.refresh().await.expect("refresh");
    assert_eq!(api.count(ApiMethod::Get, DIVISIONS_PATH), 2);
}

#[tokio::test]
async fn failed_hydration_records_the_error_and_stays_unhydrated() {
    let api = ScriptedRemoteApi::new();
    script_collections(&api);
    api.fail(ApiMethod::Get, POSITIONS_PATH, ApiError::server(500_u16, "db down"));
    let sync = HrSynchronizer::new(Arc::new(api));

    let err = sync.hydrate().await.expect_err("positions fail");

    assert_eq!(err.code(), ErrorCode::ServerError);
    assert!(!sync.is_hydrated());
    assert_eq!(sync.status().error().as_deref(), Some("db down"));
    assert!(!sync.status().is_loading());
}

#[rstest]
#[tokio::test]
async fn deleting_a_division_clears_references(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Delete, "/employees/divisions/1", json!({ "message": "ok" }));
    let sync = hydrated(&api).await;

    sync.delete_division(id(1)).await.expect("delete");

    let state = sync.snapshot();
    assert!(state.divisions.iter().all(|d| d.id != Some(id(1))));
    for position in &state.positions {
        assert_eq!(position.division_id, None);
        assert_eq!(position.division_name, "");
    }
    let sari = sync.find_employee(id(11)).expect("cached");
    assert_eq!(sari.division_id, None);
    assert_eq!(sari.division_name, "");
    let tono = sync.find_employee(id(12)).expect("cached");
    assert_eq!(tono.division_name, "Finance");
}

#[rstest]
#[tokio::test]
async fn deleting_a_position_clears_children_employees_and_heads(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Delete, "/employees/positions/20", json!(null));
    let sync = hydrated(&api).await;

    sync.delete_position(id(20)).await.expect("delete");

    let staff = sync.find_position(id(21)).expect("child kept");
    assert_eq!(staff.parent_id, None);
    let budi = sync.find_employee(id(10)).expect("cached");
    assert_eq!((budi.position_id, budi.position_title.as_str()), (None, ""));
    let ops = sync.find_division(id(1)).expect("cached");
    assert_eq!((ops.head_position_id, ops.head_title.as_str()), (None, ""));
}

#[rstest]
#[tokio::test]
async fn renaming_a_division_propagates_labels(api: Arc<ScriptedRemoteApi>) {
    api.on(
        ApiMethod::Put,
        "/employees/divisions/1",
        json!({ "data": { "id": 1, "name": "Operations", "head_employee_id": 10,
                          "head_position_id": 20 } }),
    );
    let sync = hydrated(&api).await;

    let updated = sync
        .update_division(id(1), json!({ "name": "Operations" }))
        .await
        .expect("update");

    assert_eq!(updated.head, "Budi");
    assert_eq!(updated.head_title, "Ops Manager");
    assert_eq!(sync.find_position(id(21)).expect("cached").division_name, "Operations");
    assert_eq!(sync.find_employee(id(11)).expect("cached").division_name, "Operations");
}

#[rstest]
#[tokio::test]
async fn retitling_a_position_reaches_employees_and_division_heads(api: Arc<ScriptedRemoteApi>) {
    api.on(
        ApiMethod::Put,
        "/employees/positions/20",
        json!({ "title": "Head of Ops", "division_id": 1 }),
    );
    let sync = hydrated(&api).await;

    let updated = sync
        .update_position(id(20), json!({ "title": "Head of Ops" }))
        .await
        .expect("update");

    assert_eq!(updated.id, Some(id(20)));
    assert_eq!(updated.division_name, "Ops");
    assert_eq!(sync.find_employee(id(10)).expect("cached").position_title, "Head of Ops");
    assert_eq!(sync.find_division(id(1)).expect("cached").head_title, "Head of Ops");
}

#[rstest]
#[tokio::test]
async fn employee_labels_prefer_the_response_then_local_lookup(api: Arc<ScriptedRemoteApi>) {
    api.on(
        ApiMethod::Post,
        EMPLOYEES_PATH,
        json!({ "data": { "id": 13, "employee_code": "E13", "full_name": "Wati",
                          "division_id": 2, "position_id": 21,
                          "position": { "title": "Senior Staff" } } }),
    );
    let sync = hydrated(&api).await;

    let created = sync
        .create_employee(json!({ "full_name": "Wati" }))
        .await
        .expect("create");

    assert_eq!(created.division_name, "Finance");
    assert_eq!(created.position_title, "Senior Staff");
    assert_eq!(sync.employee_count_by_division(id(2)), 2);
}

#[rstest]
#[tokio::test]
async fn updating_an_unknown_employee_has_no_local_effect(api: Arc<ScriptedRemoteApi>) {
    api.on(
        ApiMethod::Put,
        "/employees/99",
        json!({ "id": 99, "full_name": "Ghost" }),
    );
    let sync = hydrated(&api).await;
    let before = sync.snapshot();

    let updated = sync
        .update_employee(id(99), json!({ "full_name": "Ghost" }))
        .await
        .expect("remote accepted");

    assert_eq!(updated.full_name, "Ghost");
    assert_eq!(sync.snapshot(), before);
}

#[rstest]
#[tokio::test]
async fn renaming_an_employee_updates_division_head(api: Arc<ScriptedRemoteApi>) {
    api.on(
        ApiMethod::Put,
        "/employees/10",
        json!({ "id": 10, "full_name": "Budi Santoso", "division_id": 1, "position_id": 20 }),
    );
    let sync = hydrated(&api).await;

    sync.update_employee(id(10), json!({ "full_name": "Budi Santoso" }))
        .await
        .expect("update");

    assert_eq!(sync.find_division(id(1)).expect("cached").head, "Budi Santoso");
}

#[rstest]
#[tokio::test]
async fn batch_delete_filters_malformed_ids(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Delete, EMPLOYEES_PATH, json!({ "message": "deleted" }));
    let sync = hydrated(&api).await;

    let sent = sync
        .delete_employees_batch(&[json!(10), json!("x"), json!(2.5), json!(12)])
        .await
        .expect("batch delete");

    assert_eq!(sent, 2);
    let deletes: Vec<_> = api
        .requests()
        .into_iter()
        .filter(|request| request.method == ApiMethod::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].body, Some(json!({ "ids": [10, 12] })));
    let remaining: Vec<_> = sync.employees().into_iter().filter_map(|e| e.id).collect();
    assert_eq!(remaining, vec![id(11)]);
    let ops = sync.find_division(id(1)).expect("cached");
    assert_eq!((ops.head_employee_id, ops.head.as_str()), (None, ""));
}

#[rstest]
#[case(vec![])]
#[case(vec![json!("x"), json!(-4), json!(null)])]
#[tokio::test]
async fn empty_batches_never_reach_the_api(#[case] raw: Vec<Value>) {
    let api = Arc::new(ScriptedRemoteApi::new());
    let sync = HrSynchronizer::new(Arc::clone(&api));

    let sent = sync.delete_employees_batch(&raw).await.expect("no-op");

    assert_eq!(sent, 0);
    assert!(api.requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_mutations_leave_collections_untouched(api: Arc<ScriptedRemoteApi>) {
    api.fail(
        ApiMethod::Delete,
        "/employees/divisions/2",
        ApiError::rejected(409_u16, "Division still has employees"),
    );
    let sync = hydrated(&api).await;
    let before = sync.snapshot();

    let err = sync.delete_division(id(2)).await.expect_err("rejected");

    assert_eq!(err.message(), "Division still has employees");
    assert_eq!(sync.snapshot(), before);
    assert_eq!(
        sync.status().error().as_deref(),
        Some("Division still has employees")
    );
}

#[test]
fn positions_without_a_division_drop_stale_labels() {
    let mut state = HrCollections::default();
    let position = state.insert_position(Position::from_raw(&json!({
        "id": 5, "title": "Intern", "division_name": "Stale",
    })));
    assert_eq!(position.division_name, "");
}

#[rstest]
#[tokio::test]
async fn empty_mutation_responses_leave_collections_untouched(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Put, "/employees/divisions/1", Value::Null)
        .on(ApiMethod::Put, "/employees/positions/20", json!({}))
        .on(ApiMethod::Put, "/employees/11", json!({ "data": null, "message": "ok" }))
        .on(ApiMethod::Post, DIVISIONS_PATH, Value::Null)
        .on(ApiMethod::Post, EMPLOYEES_PATH, json!({ "success": true }));
    let sync = hydrated(&api).await;
    let before = sync.snapshot();

    let division = sync
        .update_division(id(1), json!({ "name": "Operations" }))
        .await
        .expect("update division");
    sync.update_position(id(20), json!({ "title": "Lead" }))
        .await
        .expect("update position");
    sync.update_employee(id(11), json!({ "full_name": "Sari W" }))
        .await
        .expect("update employee");
    let created = sync
        .create_division(json!({ "name": "Legal" }))
        .await
        .expect("create division");
    sync.create_employee(json!({ "full_name": "Ani" }))
        .await
        .expect("create employee");

    assert_eq!(division.name, "Ops");
    assert_eq!(created.id, None);
    assert_eq!(sync.snapshot(), before);
    assert_eq!(sync.find_employee(id(11)).expect("cached").division_name, "Ops");
}

#[rstest]
#[tokio::test]
async fn empty_update_for_an_uncached_id_returns_a_bare_record(api: Arc<ScriptedRemoteApi>) {
    api.on(ApiMethod::Put, "/employees/divisions/9", Value::Null);
    let sync = hydrated(&api).await;

    let division = sync
        .update_division(id(9), json!({ "name": "Ghost" }))
        .await
        .expect("update");

    assert_eq!(division.id, Some(id(9)));
    assert!(sync.find_division(id(9)).is_none());
}

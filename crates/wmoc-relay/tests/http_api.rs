//! End-to-end tests of the relay's HTTP surface, driven through the router
//! without binding a socket.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wmoc_relay::{relay_router, Relay};
use wmoc_store::{ExpiringStore, MemoryStore, StoreError, StoreResult};

const DAY: Duration = Duration::from_secs(24 * 3600);

// =============================================================================
// Helpers
// =============================================================================

fn app() -> Router {
    app_with_limit(1024 * 1024)
}

fn app_with_limit(max_body_bytes: usize) -> Router {
    let relay = Arc::new(Relay::new(Arc::new(MemoryStore::new()), DAY));
    relay_router(relay, max_body_bytes)
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn call_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = call(app, request).await;
    let body = serde_json::from_slice(&bytes).expect("response should be JSON");
    (status, body)
}

async fn send_command(app: &Router, body: Value) -> (StatusCode, Value) {
    call_json(app, post("/send_miner_command", body.to_string())).await
}

async fn miner_log(app: &Router, miner_id: &str) -> Vec<Value> {
    let (status, body) = call_json(app, get(&format!("/miner_log?miner_id={}", miner_id))).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().expect("log should be an array")
}

fn entry_types(entries: &[Value]) -> Vec<&str> {
    entries
        .iter()
        .map(|e| e["type"].as_str().unwrap_or_default())
        .collect()
}

// =============================================================================
// Agent / Operator Flow
// =============================================================================

#[tokio::test]
async fn queued_command_is_delivered_once_and_logged() {
    let app = app();

    let (status, queued) = send_command(
        &app,
        json!({
            "miner_id": "rig-7",
            "command_type": "execute_api",
            "target_api_command_cmd": "get.miner.status"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queued["status"], "success");
    assert_eq!(queued["message"], "Command queued");
    let command_id = queued["wmoc_command_id"].as_str().unwrap().to_string();

    let (status, first) = call_json(
        &app,
        post("/sync?wmoc_assigned_id=rig-7", r#"{"hashrate":95}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "success");
    assert_eq!(first["message"], "Data received");
    assert!(first["server_timestamp_utc"].is_string());
    assert_eq!(first["next_command"]["wmoc_command_id"], command_id.as_str());
    assert_eq!(first["next_command"]["target_api_command_cmd"], "get.miner.status");
    assert_eq!(first["next_command"]["target_api_command_param_json"], json!({}));

    let entries = miner_log(&app, "rig-7").await;
    assert_eq!(
        entry_types(&entries),
        vec!["command_queued_by_server", "received_from_miner", "sent_to_miner"]
    );
    assert_eq!(entries[0]["payload"]["wmoc_command_id"], command_id.as_str());
    assert_eq!(entries[1]["payload"], json!({"hashrate": 95}));
    assert_eq!(entries[2]["payload"]["wmoc_command_id"], command_id.as_str());

    let (_, second) = call_json(
        &app,
        post("/sync?wmoc_assigned_id=rig-7", r#"{"hashrate":95}"#),
    )
    .await;
    assert!(second["next_command"].is_null());
    assert_eq!(miner_log(&app, "rig-7").await.len(), 4);
}

#[tokio::test]
async fn commands_are_delivered_in_queue_order() {
    let app = app();
    let mut ids = Vec::new();
    for cmd in ["summary", "pools", "restart"] {
        let (_, queued) = send_command(
            &app,
            json!({
                "miner_id": "rig-3",
                "command_type": "execute_api",
                "target_api_command_cmd": cmd
            }),
        )
        .await;
        ids.push(queued["wmoc_command_id"].as_str().unwrap().to_string());
    }

    for id in &ids {
        let (_, response) = call_json(&app, post("/sync", r#"{"wmoc_assigned_id":"rig-3"}"#)).await;
        assert_eq!(response["next_command"]["wmoc_command_id"], id.as_str());
    }

    let (_, response) = call_json(&app, post("/sync", r#"{"wmoc_assigned_id":"rig-3"}"#)).await;
    assert!(response["next_command"].is_null());
}

#[tokio::test]
async fn body_device_id_wins_over_query() {
    let app = app();
    call_json(
        &app,
        post("/sync?wmoc_assigned_id=from-query", r#"{"wmoc_assigned_id":"from-body"}"#),
    )
    .await;

    assert_eq!(miner_log(&app, "from-body").await.len(), 1);
    assert!(miner_log(&app, "from-query").await.is_empty());
}

#[tokio::test]
async fn missing_device_id_uses_sentinel() {
    let app = app();
    let (status, _) = call_json(&app, post("/sync", "")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call_json(&app, get("/miner_log")).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["payload"], json!({}));
    assert_eq!(miner_log(&app, "unknown_miner").await.len(), 1);
}

#[tokio::test]
async fn commands_without_miner_id_go_to_sentinel_device() {
    let app = app();

    let (_, blank) = send_command(
        &app,
        json!({
            "miner_id": "",
            "command_type": "execute_api",
            "target_api_command_cmd": "summary"
        }),
    )
    .await;
    let (_, omitted) = send_command(
        &app,
        json!({
            "command_type": "execute_api",
            "target_api_command_cmd": "pools"
        }),
    )
    .await;

    let (_, first) = call_json(&app, post("/sync", "{}")).await;
    assert_eq!(first["next_command"]["wmoc_command_id"], blank["wmoc_command_id"]);

    let (_, second) = call_json(&app, post("/sync", r#"{"wmoc_assigned_id":"  "}"#)).await;
    assert_eq!(second["next_command"]["wmoc_command_id"], omitted["wmoc_command_id"]);

    assert_eq!(miner_log(&app, "unknown_miner").await.len(), 6);
}

#[tokio::test]
async fn numeric_device_id_is_keyed_by_its_text() {
    let app = app();
    call_json(&app, post("/sync", r#"{"wmoc_assigned_id":42,"temp":61}"#)).await;

    assert_eq!(miner_log(&app, "42").await.len(), 1);
    assert!(miner_log(&app, "unknown_miner").await.is_empty());
}

#[tokio::test]
async fn extension_fields_reach_the_agent() {
    let app = app();
    send_command(
        &app,
        json!({
            "miner_id": "rig-7",
            "command_type": "execute_api",
            "target_api_command_cmd": "ascset",
            "target_api_command_param_json": null,
            "wmoc_command_id": "00000000-0000-0000-0000-000000000000",
            "issued_by": "night-shift"
        }),
    )
    .await;

    let (_, response) = call_json(&app, post("/sync?wmoc_assigned_id=rig-7", "{}")).await;
    let command = &response["next_command"];
    assert_eq!(command["target_api_command_param_json"], json!({}));
    assert_eq!(command["issued_by"], "night-shift");
    assert_ne!(command["wmoc_command_id"], "00000000-0000-0000-0000-000000000000");
}

// =============================================================================
// Clearing
// =============================================================================

#[tokio::test]
async fn clear_drops_log_and_pending_commands() {
    let app = app();
    send_command(
        &app,
        json!({
            "miner_id": "rig-7",
            "command_type": "execute_api",
            "target_api_command_cmd": "restart"
        }),
    )
    .await;

    let (status, body) = call_json(&app, post("/clear_miner_log", r#"{"miner_id":"rig-7"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Data cleared for miner: rig-7");

    assert!(miner_log(&app, "rig-7").await.is_empty());
    let (_, response) = call_json(&app, post("/sync?wmoc_assigned_id=rig-7", "{}")).await;
    assert!(response["next_command"].is_null());

    // Clearing again is harmless
    let (status, _) = call_json(&app, post("/clear_miner_log", r#"{"miner_id":"rig-7"}"#)).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn missing_command_fields_are_rejected() {
    let app = app();
    let (status, body) = send_command(
        &app,
        json!({"miner_id": "rig-7", "command_type": "execute_api"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Command type and target API command are required.");

    // Nothing was queued or logged
    assert!(miner_log(&app, "rig-7").await.is_empty());
    let (_, response) = call_json(&app, post("/sync?wmoc_assigned_id=rig-7", "{}")).await;
    assert!(response["next_command"].is_null());
}

#[tokio::test]
async fn empty_send_body_is_a_validation_error() {
    let app = app();
    let (status, body) = call_json(&app, post("/send_miner_command", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Command type and target API command are required.");
}

#[tokio::test]
async fn malformed_report_is_recorded_and_drained() {
    let app = app();
    let (_, queued) = send_command(
        &app,
        json!({
            "miner_id": "rig-7",
            "command_type": "execute_api",
            "target_api_command_cmd": "summary"
        }),
    )
    .await;

    let (status, body) = call_json(&app, post("/sync?wmoc_assigned_id=rig-7", "hashrate=95")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["next_command"]["wmoc_command_id"], queued["wmoc_command_id"]);

    let entries = miner_log(&app, "rig-7").await;
    assert_eq!(
        entry_types(&entries),
        vec!["command_queued_by_server", "received_from_miner", "sent_to_miner"]
    );
    assert_eq!(entries[1]["payload"], json!({}));
}

#[tokio::test]
async fn malformed_operator_body_is_rejected() {
    let app = app();
    let (status, body) = call_json(&app, post("/send_miner_command", "{miner_id")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let app = app_with_limit(64);
    let big = json!({"blob": "x".repeat(256)}).to_string();

    let (status, body) = call_json(&app, post("/sync?wmoc_assigned_id=rig-7", big.clone())).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());

    let (status, body) = call_json(&app, post("/send_miner_command", big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn bad_query_string_is_a_structured_error() {
    let app = app();
    let (status, body) = call_json(&app, get("/miner_log?miner_id=a&miner_id=b")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

/// A backend that is always down.
struct DownStore;

#[async_trait]
impl ExpiringStore for DownStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::ConnectionFailed("connection refused".into()))
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> StoreResult<()> {
        Err(StoreError::ConnectionFailed("connection refused".into()))
    }

    async fn forget(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::ConnectionFailed("connection refused".into()))
    }

    fn backend_name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn storage_outage_is_a_server_error() {
    let relay = Arc::new(Relay::new(Arc::new(DownStore), DAY));
    let app = relay_router(relay, 1024 * 1024);

    let (status, body) = call_json(&app, post("/sync?wmoc_assigned_id=rig-7", "{}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");

    let (status, _) = call_json(&app, get("/miner_log?miner_id=rig-7")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_check() {
    let (status, body) = call(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

//! End-to-end tests for the xhub HTTP API.
//!
//! Requests go through the full stack: axum router -> handler ->
//! ResourceRepository -> ordered store -> HTTP response. Each test builds a
//! fresh in-memory AppState and drives the router with
//! `tower::ServiceExt::oneshot`; no network server is started.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use xhub_server::config::ServerConfig;
use xhub_server::router::build_router;
use xhub_server::state::AppState;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn test_app() -> Router {
    build_router(AppState::in_memory())
}

/// Sends a request and returns (status, content type, raw body).
async fn request_raw(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<String>,
) -> (StatusCode, Option<String>, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(text) => {
            builder = builder.header("content-type", "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, bytes.to_vec())
}

async fn request_json(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let body = body.map(|v| v.to_string());
    let (status, _, bytes) = request_raw(app, method, path, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
    (status, json)
}

async fn post_json(
    app: &Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(app, Method::POST, path, Some(body)).await
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    request_json(app, Method::GET, path, None).await
}

async fn delete_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    request_json(app, Method::DELETE, path, None).await
}

async fn create(app: &Router, collection: &str, id: &str, data: serde_json::Value) {
    let (status, body) = post_json(app, collection, json!({ "id": id, "data": data })).await;
    assert_eq!(status, StatusCode::CREATED, "create {id} failed: {body:?}");
}

fn ids(list: &serde_json::Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Studies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn study_create_list_get() {
    let app = test_app();
    let envelope = json!({
        "version": "1",
        "resource": "study",
        "id": "/studies/test_study",
        "data": { "Name": "test_study" }
    });

    let (status, created) = post_json(&app, "/studies", envelope).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["version"], "1");
    assert_eq!(created["resource"], "study");
    assert_eq!(created["id"], "/studies/test_study");
    assert_eq!(created["url"], "http://localhost:8081/studies/test_study");
    assert_eq!(created["data"], json!({ "Name": "test_study" }));
    assert!(created["created"].is_string());

    let (status, list) = get_json(&app, "/studies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&list), ["/studies/test_study"]);
    assert_eq!(list[0]["created"], created["created"]);

    let (status, payload) = get_json(&app, "/studies/test_study").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "Name": "test_study" }));
}

#[tokio::test]
async fn get_serves_payload_bytes_verbatim() {
    let app = test_app();
    let body = r#"{"id":"S1","data":{"z": 1,   "a" : [true, null]}}"#.to_string();
    let (status, _, _) = request_raw(&app, Method::POST, "/studies", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, content_type, bytes) = request_raw(&app, Method::GET, "/studies/S1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(bytes, br#"{"z": 1,   "a" : [true, null]}"#);
}

#[tokio::test]
async fn study_listing_does_not_confuse_numeric_siblings() {
    let app = test_app();
    create(&app, "/studies", "S1", json!(1)).await;
    create(&app, "/studies", "S10", json!(10)).await;
    create(&app, "/studies/S1/trials", "T1", json!("t")).await;
    create(&app, "/studies/S10/trials", "T1", json!("t10")).await;

    let (_, list) = get_json(&app, "/studies").await;
    assert_eq!(ids(&list), ["/studies/S1", "/studies/S10"]);

    let (_, trials) = get_json(&app, "/studies/S1/trials").await;
    assert_eq!(ids(&trials), ["/studies/S1/trials/T1"]);
    assert_eq!(trials[0]["data"], json!("t"));
    assert!(trials[0].get("created").is_none());
}

#[tokio::test]
async fn recreate_replaces_payload() {
    let app = test_app();
    create(&app, "/studies", "S1", json!({ "rev": 1 })).await;
    create(&app, "/studies", "S1", json!({ "rev": 2 })).await;

    let (_, list) = get_json(&app, "/studies").await;
    assert_eq!(ids(&list), ["/studies/S1"]);
    let (_, payload) = get_json(&app, "/studies/S1").await;
    assert_eq!(payload, json!({ "rev": 2 }));
}

#[tokio::test]
async fn empty_collection_lists_as_empty_array() {
    let app = test_app();
    let (status, list) = get_json(&app, "/studies/nobody/trials").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

// ---------------------------------------------------------------------------
// Trials and files
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trial_files_live_under_parallel_root() {
    let app = test_app();
    create(&app, "/studies", "S1", json!({})).await;
    create(&app, "/studies/S1/trials", "/studies/S1/trials/T1", json!({})).await;
    create(&app, "/files/S1/T1", "/files/S1/T1/F1", json!({ "size": 3 })).await;
    create(&app, "/files/S1/T1", "F2", json!({ "size": 4 })).await;
    create(&app, "/studies/S1/files", "protocol", json!("pdf")).await;

    let (status, files) = get_json(&app, "/files/S1/T1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&files), ["/files/S1/T1/F1", "/files/S1/T1/F2"]);
    assert_eq!(files[0]["resource"], "file");
    assert_eq!(files[0]["url"], "http://localhost:8081/files/S1/T1/F1");

    let (_, study_files) = get_json(&app, "/studies/S1/files").await;
    assert_eq!(ids(&study_files), ["/studies/S1/files/protocol"]);

    let (status, payload) = get_json(&app, "/files/S1/T1/F2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "size": 4 }));
}

#[tokio::test]
async fn delete_trial_cascades_to_its_files_only() {
    let app = test_app();
    create(&app, "/studies", "S1", json!({})).await;
    create(&app, "/studies/S1/trials", "T1", json!({})).await;
    create(&app, "/studies/S1/trials", "T2", json!({})).await;
    create(&app, "/files/S1/T1", "F1", json!(1)).await;
    create(&app, "/files/S1/T2", "F1", json!(2)).await;
    create(&app, "/studies/S1/files", "F1", json!(3)).await;

    let (status, body) = delete_json(&app, "/studies/S1/trials/T1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = get_json(&app, "/studies/S1/trials/T1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_json(&app, "/files/S1/T1/F1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, files) = get_json(&app, "/files/S1/T1").await;
    assert_eq!(files, json!([]));

    let (_, trials) = get_json(&app, "/studies/S1/trials").await;
    assert_eq!(ids(&trials), ["/studies/S1/trials/T2"]);
    let (status, _) = get_json(&app, "/files/S1/T2/F1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get_json(&app, "/studies/S1/files/F1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_study_removes_whole_hierarchy() {
    let app = test_app();
    create(&app, "/studies", "S1", json!({})).await;
    create(&app, "/studies", "S10", json!({})).await;
    create(&app, "/studies/S1/trials", "T1", json!({})).await;
    create(&app, "/files/S1/T1", "F1", json!({})).await;
    create(&app, "/studies/S1/files", "F1", json!({})).await;
    create(&app, "/files/S10/T1", "F1", json!({})).await;

    let (status, _) = delete_json(&app, "/studies/S1").await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = get_json(&app, "/studies").await;
    assert_eq!(ids(&list), ["/studies/S10"]);
    for path in [
        "/studies/S1",
        "/studies/S1/trials/T1",
        "/files/S1/T1/F1",
        "/studies/S1/files/F1",
    ] {
        let (status, _) = get_json(&app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path} survived");
    }
    let (status, _) = get_json(&app, "/files/S10/T1/F1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = test_app();
    let (status, _) = delete_json(&app, "/studies/ghost").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete_json(&app, "/files/ghost/T1/F1").await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_resources_are_404_on_every_route() {
    let app = test_app();
    for path in [
        "/studies/S1",
        "/studies/S1/trials/T1",
        "/studies/S1/files/F1",
        "/files/S1/T1/F1",
    ] {
        let (status, body) = get_json(&app, path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn id_outside_collection_is_rejected() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/studies/S1/trials",
        json!({ "id": "/studies/S2/trials/T1", "data": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (_, trials) = get_json(&app, "/studies/S2/trials").await;
    assert_eq!(trials, json!([]));
}

#[tokio::test]
async fn invalid_names_are_rejected() {
    let app = test_app();
    for id in ["", "a/b", "tab\there"] {
        let (status, body) = post_json(&app, "/studies", json!({ "id": id, "data": 1 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{id:?} accepted");
        assert_eq!(body["success"], false);
    }

    // An encoded separator inside a path parameter is still a separator.
    let (status, _) = get_json(&app, "/studies/a%2Fb").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = get_json(&app, "/studies").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn malformed_body_is_json_400() {
    let app = test_app();
    let (status, _, bytes) =
        request_raw(&app, Method::POST, "/studies", Some("{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = post_json(&app, "/studies", json!({ "id": "S1" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Health and backends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app();
    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn sqlite_state_persists_across_restarts() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = ServerConfig {
        db_path: dir.path().join("xhub.db").to_str().unwrap().to_string(),
        base_url: "https://xhub.example.org/".to_string(),
        ..ServerConfig::default()
    };

    let app = build_router(AppState::new(&config).unwrap());
    create(&app, "/studies", "S1", json!({ "n": 1 })).await;
    create(&app, "/files/S1/T1", "F1", json!("blob")).await;
    drop(app);

    let app = build_router(AppState::new(&config).unwrap());
    let (_, list) = get_json(&app, "/studies").await;
    assert_eq!(ids(&list), ["/studies/S1"]);
    assert_eq!(list[0]["url"], "https://xhub.example.org/studies/S1");
    let (status, payload) = get_json(&app, "/files/S1/T1/F1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!("blob"));
}

//! End-to-end integration tests for the linkcard HTTP API.
//!
//! Tests exercise the full stack: HTTP request -> axum router -> handler ->
//! ProfileService -> SnapshotClient -> store -> HTTP response.
//!
//! Each test builds a fresh AppState over its own InMemoryStore and sends
//! requests with `tower::ServiceExt::oneshot`, without starting a network
//! server. Keeping a handle on the store lets tests inspect what was
//! written and simulate outages.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use linkcard_core::DEFAULT_TITLE;
use linkcard_server::config::SavePolicy;
use linkcard_server::router::build_router;
use linkcard_server::state::AppState;
use linkcard_storage::{InMemoryStore, LinkEncoding, SINGLETON_ID};

const PASSWORD: &str = "open-sesame";

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn test_app(policy: SavePolicy) -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::with_store(store.clone(), LinkEncoding::Json, PASSWORD, policy);
    (build_router(state), store)
}

/// Sends a request and returns (status, raw body).
async fn send_raw(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    content_type: &str,
    body: Vec<u8>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", content_type);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body_bytes.to_vec())
}

/// Sends a JSON request and returns (status, json).
async fn send_json(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let bytes = body
        .map(|b| serde_json::to_vec(&b).unwrap())
        .unwrap_or_default();
    let (status, body) = send_raw(app, method, path, token, "application/json", bytes).await;
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!(null));
    (status, json)
}

async fn login(app: &Router) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/admin/login",
        None,
        Some(json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {:?}", body);
    body["token"].as_str().unwrap().to_string()
}

fn sample_payload() -> Value {
    json!({
        "title": "My links",
        "profileData": {
            "userIcon": "me.png",
            "userName": "Aki",
            "userComment": "hello"
        },
        "links": [
            { "name": "X", "url": "https://x.com", "icon": "x.png" },
            { "name": "Blog", "url": "https://blog.example", "icon": "b.png", "comment": "weekly" }
        ]
    })
}

// ---------------------------------------------------------------------------
// Data endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_data_on_empty_store_is_500() {
    let (app, _) = test_app(SavePolicy::Immediate);
    let (status, body) = send_json(&app, "GET", "/api/get-data", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch data" }));
}

#[tokio::test]
async fn save_then_get_data_roundtrip() {
    let (app, store) = test_app(SavePolicy::Immediate);

    let (status, body) =
        send_json(&app, "POST", "/api/save-data", None, Some(sample_payload())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Data saved successfully" }));
    assert_eq!(store.stored().unwrap().id, SINGLETON_ID);

    let (status, body) = send_json(&app, "GET", "/api/get-data", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, sample_payload());
}

#[tokio::test]
async fn save_data_overwrites_whole_record() {
    let (app, _) = test_app(SavePolicy::Immediate);
    send_json(&app, "POST", "/api/save-data", None, Some(sample_payload())).await;

    let replacement = json!({ "title": "Only title", "profileData": {}, "links": [] });
    let (status, _) =
        send_json(&app, "POST", "/api/save-data", None, Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, "GET", "/api/get-data", None, None).await;
    assert_eq!(body["title"], "Only title");
    assert_eq!(body["profileData"]["userName"], "");
    assert_eq!(body["links"], json!([]));
}

#[tokio::test]
async fn save_data_rejects_other_methods() {
    let (app, _) = test_app(SavePolicy::Immediate);
    for method in ["GET", "PUT", "DELETE"] {
        let (status, body) =
            send_raw(&app, method, "/api/save-data", None, "text/plain", Vec::new()).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(body, b"Method Not Allowed");
    }
}

#[tokio::test]
async fn save_data_with_malformed_body_is_500() {
    let (app, store) = test_app(SavePolicy::Immediate);
    let (status, body) = send_raw(
        &app,
        "POST",
        "/api/save-data",
        None,
        "application/json",
        b"{not json".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "error": "Failed to save data" }));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn save_data_during_outage_is_500() {
    let (app, store) = test_app(SavePolicy::Immediate);
    store.set_offline(true);
    let (status, body) =
        send_json(&app, "POST", "/api/save-data", None, Some(sample_payload())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to save data" }));
}

// ---------------------------------------------------------------------------
// Public page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn index_renders_default_then_saved_snapshot() {
    let (app, _) = test_app(SavePolicy::Immediate);

    let (status, body) = send_raw(&app, "GET", "/", None, "text/html", Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains(DEFAULT_TITLE));

    send_json(&app, "POST", "/api/save-data", None, Some(sample_payload())).await;

    let (_, body) = send_raw(&app, "GET", "/", None, "text/html", Vec::new()).await;
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("My links"));
    assert!(html.contains("https://blog.example"));
    assert!(html.contains("weekly"));
}

// ---------------------------------------------------------------------------
// Editor sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let (app, _) = test_app(SavePolicy::Immediate);
    let (status, body) = send_json(
        &app,
        "POST",
        "/admin/login",
        None,
        Some(json!({ "password": "guess" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn editor_routes_require_token() {
    let (app, _) = test_app(SavePolicy::Immediate);
    let (status, _) = send_json(&app, "GET", "/admin/snapshot", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let bogus = "00000000-0000-4000-8000-000000000000";
    let (status, _) = send_json(&app, "GET", "/admin/snapshot", Some(bogus), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(&app, "GET", "/admin/snapshot", Some("not-a-uuid"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_link_on_empty_snapshot_saves_exact_record() {
    let (app, store) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/admin/links",
        Some(&token),
        Some(json!({ "name": "X", "url": "https://x.com", "icon": "i.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{:?}", body);
    assert_eq!(body["persistence"]["status"], "saved");
    assert_eq!(body["dirty"], false);
    assert_eq!(
        body["snapshot"]["links"],
        json!([{ "name": "X", "url": "https://x.com", "icon": "i.png" }])
    );

    let stored = store.stored().unwrap();
    assert_eq!(stored.id, SINGLETON_ID);
    assert_eq!(stored.title.as_deref(), Some(DEFAULT_TITLE));
    assert_eq!(stored.user_name.as_deref(), Some(""));
    assert_eq!(
        stored.links,
        Some(json!([{ "name": "X", "url": "https://x.com", "icon": "i.png" }]))
    );
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn each_edit_costs_one_write() {
    let (app, store) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;

    send_json(&app, "PUT", "/admin/title", Some(&token), Some(json!({ "title": "T" }))).await;
    send_json(
        &app,
        "PATCH",
        "/admin/profile",
        Some(&token),
        Some(json!({ "userName": "Aki" })),
    )
    .await;
    send_json(
        &app,
        "POST",
        "/admin/edits",
        Some(&token),
        Some(json!({
            "type": "AddLink",
            "link": { "name": "A", "url": "https://a.example", "icon": "a.png" }
        })),
    )
    .await;

    assert_eq!(store.write_count(), 3);
    let (_, body) = send_json(&app, "GET", "/api/get-data", None, None).await;
    assert_eq!(body["title"], "T");
    assert_eq!(body["profileData"]["userName"], "Aki");
    assert_eq!(body["links"][0]["name"], "A");
}

#[tokio::test]
async fn update_and_delete_by_index() {
    let (app, _) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;
    for name in ["A", "B", "C"] {
        send_json(
            &app,
            "POST",
            "/admin/links",
            Some(&token),
            Some(json!({ "name": name, "url": "https://e.example", "icon": "i.png" })),
        )
        .await;
    }

    let (status, body) = send_json(
        &app,
        "PUT",
        "/admin/links/1",
        Some(&token),
        Some(json!({ "name": "B2", "url": "https://b2.example", "icon": "b2.png", "comment": "new" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshot"]["links"][1]["name"], "B2");
    assert_eq!(body["snapshot"]["links"][1]["comment"], "new");
    assert_eq!(body["snapshot"]["links"][0]["name"], "A");

    let (status, body) = send_json(&app, "DELETE", "/admin/links/0", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["snapshot"]["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["B2", "C"]);

    let (status, body) = send_json(&app, "DELETE", "/admin/links/5", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn incomplete_link_is_rejected() {
    let (app, store) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/admin/links",
        Some(&token),
        Some(json!({ "name": "X", "url": "https://x.com", "icon": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn outage_keeps_edit_in_session() {
    let (app, store) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;
    store.set_offline(true);

    let (status, body) = send_json(
        &app,
        "PUT",
        "/admin/title",
        Some(&token),
        Some(json!({ "title": "Unsaved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["persistence"]["status"], "failed");
    assert_eq!(body["dirty"], true);

    let (_, body) = send_json(&app, "GET", "/admin/snapshot", Some(&token), None).await;
    assert_eq!(body["snapshot"]["title"], "Unsaved");
    assert_eq!(body["dirty"], true);

    let (status, _) = send_json(&app, "POST", "/admin/save", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    store.set_offline(false);
    let (status, body) = send_json(&app, "POST", "/admin/save", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["persistence"]["status"], "saved");
    assert_eq!(store.stored().unwrap().title.as_deref(), Some("Unsaved"));
}

#[tokio::test]
async fn explicit_policy_waits_for_save() {
    let (app, store) = test_app(SavePolicy::Explicit);
    let token = login(&app).await;

    let (_, body) = send_json(
        &app,
        "PUT",
        "/admin/title",
        Some(&token),
        Some(json!({ "title": "Draft" })),
    )
    .await;
    assert_eq!(body["persistence"]["status"], "pending");
    assert_eq!(store.write_count(), 0);

    let (status, _) = send_json(&app, "POST", "/admin/save", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.write_count(), 1);
    assert_eq!(store.stored().unwrap().title.as_deref(), Some("Draft"));
}

#[tokio::test]
async fn icon_upload_becomes_data_url() {
    let (app, _) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;

    let (status, body) = send_raw(
        &app,
        "POST",
        "/admin/profile/icon",
        Some(&token),
        "image/png",
        vec![0x89, 0x50, 0x4e, 0x47],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["snapshot"]["profileData"]["userIcon"],
        "data:image/png;base64,iVBORw=="
    );

    let (status, _) = send_raw(
        &app,
        "POST",
        "/admin/profile/icon",
        Some(&token),
        "text/plain",
        b"hello".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_ends_session() {
    let (app, _) = test_app(SavePolicy::Immediate);
    let token = login(&app).await;

    let (status, _) = send_json(&app, "POST", "/admin/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, "GET", "/admin/snapshot", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

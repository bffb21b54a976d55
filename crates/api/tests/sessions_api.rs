//! Session command handlers over HTTP, against an in-memory external API.

mod common;

use std::sync::atomic::Ordering;

use axum::extract::ws::Message;
use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get_auth, get_with_cookie, post_json_auth,
    session_record,
};
use serde_json::json;
use whaileys_core::activity::{action_types, entity_types};
use whaileys_api::ws::protocol::SESSIONS_TOPIC;

/// Hand the activity sink its own subscribed connection, so it can tell
/// whether an event was published before the entry was recorded.
async fn watch_sessions(app: &common::TestApp) {
    let rx = app.relay.register("activity-watch".into(), None).await;
    app.relay.subscribe("activity-watch", SESSIONS_TOPIC).await;
    app.activity.watch(rx);
}

fn frame(msg: Message) -> serde_json::Value {
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Create calls the API, then records, then publishes, then responds.
#[tokio::test]
async fn create_session_records_and_publishes() {
    let app = build_test_app(None);
    let token = app.token(7, "user");
    let mut rx = app.relay.register("browser".into(), None).await;
    app.relay.subscribe("browser", SESSIONS_TOPIC).await;
    watch_sessions(&app).await;

    let response = post_json_auth(
        app.app(),
        "/api/sessions",
        json!({ "sessionId": "  demo-1 " }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["sessionId"], "demo-1");
    assert_eq!(json["data"]["status"], "connecting");

    let entries = app.activity.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor, 7);
    assert_eq!(entries[0].action, action_types::CREATE_SESSION);
    assert_eq!(entries[0].entity_type, Some(entity_types::SESSION));
    assert_eq!(entries[0].entity_id.as_deref(), Some("demo-1"));
    assert_eq!(entries[0].details, Some(json!({ "sessionId": "demo-1" })));

    let event = frame(rx.try_recv().expect("session:created should be queued"));
    assert_eq!(event["event"], "session:created");
    assert_eq!(event["data"]["sessionId"], "demo-1");
    assert!(event["data"]["timestamp"].is_string());
    assert!(rx.try_recv().is_err(), "exactly one session:created");

    // Nothing was queued yet when the entry was written; the event followed.
    assert_eq!(app.activity.frames_before_record(), [false]);
    assert_eq!(app.activity.drain_watched(), 1);
}

#[tokio::test]
async fn create_session_with_blank_id_is_rejected_before_api() {
    let app = build_test_app(None);
    let token = app.token(7, "user");

    let response =
        post_json_auth(app.app(), "/api/sessions", json!({ "sessionId": "   " }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Digite um ID para a sessão");
    assert_eq!(app.api.call_count(), 0);
    assert!(app.activity.entries().is_empty());
}

/// An upstream refusal surfaces its message and has no side effects.
#[tokio::test]
async fn create_duplicate_session_surfaces_upstream_message() {
    let app = build_test_app(None);
    app.api.insert(session_record("demo-1", "connected"));
    let token = app.token(7, "user");
    let mut rx = app.relay.register("browser".into(), None).await;
    app.relay.subscribe("browser", SESSIONS_TOPIC).await;

    let response =
        post_json_auth(app.app(), "/api/sessions", json!({ "sessionId": "demo-1" }), &token).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Sessão já existe");
    assert!(app.activity.entries().is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn create_session_accepts_cookie_identity() {
    let app = build_test_app(None);
    let token = app.token(3, "admin");

    let request = axum::http::Request::post("/api/sessions")
        .header("content-type", "application/json")
        .header("cookie", format!("app_session_id={token}"))
        .body(axum::body::Body::from(json!({ "sessionId": "via-cookie" }).to_string()))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.app(), request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.activity.entries()[0].actor, 3);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_session_records_and_publishes() {
    let app = build_test_app(None);
    app.api.insert(session_record("demo-1", "connected"));
    let token = app.token(9, "admin");
    let mut rx = app.relay.register("browser".into(), None).await;
    app.relay.subscribe("browser", SESSIONS_TOPIC).await;
    watch_sessions(&app).await;

    let response = delete_auth(app.app(), "/api/sessions/demo-1", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));

    let entries = app.activity.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, action_types::DELETE_SESSION);
    assert_eq!(entries[0].entity_id.as_deref(), Some("demo-1"));

    let event = frame(rx.try_recv().unwrap());
    assert_eq!(event["event"], "session:deleted");
    assert_eq!(event["data"]["sessionId"], "demo-1");
    assert!(rx.try_recv().is_err(), "exactly one session:deleted");

    assert_eq!(app.activity.frames_before_record(), [false]);
    assert_eq!(app.activity.drain_watched(), 1);
}

#[tokio::test]
async fn failed_delete_reports_fixed_message_without_side_effects() {
    let app = build_test_app(None);
    app.api.insert(session_record("demo-1", "connected"));
    app.api.fail_delete.store(true, Ordering::SeqCst);
    let token = app.token(9, "admin");
    let mut rx = app.relay.register("browser".into(), None).await;
    app.relay.subscribe("browser", SESSIONS_TOPIC).await;

    let response = delete_auth(app.app(), "/api/sessions/demo-1", &token).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Falha ao deletar sessão");
    assert!(app.activity.entries().is_empty());
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_sessions_wraps_records_in_data() {
    let app = build_test_app(None);
    app.api.insert(session_record("a", "connected"));
    app.api.insert(session_record("b", "disconnected"));
    let token = app.token(1, "user");

    let response = get_auth(app.app(), "/api/sessions", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["sessionId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["a", "b"]);
}

#[tokio::test]
async fn get_unknown_session_is_404() {
    let app = build_test_app(None);
    let token = app.token(1, "user");

    let response = get_auth(app.app(), "/api/sessions/ghost", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn qr_code_prefers_record_value() {
    let app = build_test_app(None);
    let mut record = session_record("demo-1", "connecting");
    record.qr_code = Some("data:image/png;base64,AAA".into());
    app.api.insert(record);
    let token = app.token(1, "user");

    let response = get_with_cookie(
        app.app(),
        "/api/sessions/demo-1/qrcode",
        &format!("app_session_id={token}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["qrCode"], "data:image/png;base64,AAA");
}

#[tokio::test]
async fn qr_code_falls_back_to_endpoint_while_connecting() {
    let app = build_test_app(None);
    app.api.insert(session_record("demo-1", "connecting"));
    app.api
        .qr_codes
        .lock()
        .unwrap()
        .insert("demo-1".into(), "qr-from-endpoint".into());
    let token = app.token(1, "user");

    let response = get_auth(app.app(), "/api/sessions/demo-1/qrcode", &token).await;

    let json = body_json(response).await;
    assert_eq!(json["data"]["qrCode"], "qr-from-endpoint");
}

#[tokio::test]
async fn qr_code_is_null_for_connected_or_unknown_sessions() {
    let app = build_test_app(None);
    app.api.insert(session_record("demo-1", "connected"));
    let token = app.token(1, "user");

    let connected = get_auth(app.app(), "/api/sessions/demo-1/qrcode", &token).await;
    assert!(body_json(connected).await["data"]["qrCode"].is_null());

    let unknown = get_auth(app.app(), "/api/sessions/ghost/qrcode", &token).await;
    assert_eq!(unknown.status(), StatusCode::OK);
    assert!(body_json(unknown).await["data"]["qrCode"].is_null());
}

#[tokio::test]
async fn health_reports_unreachable_api() {
    let app = build_test_app(None);
    app.api.healthy.store(false, Ordering::SeqCst);

    let response = common::get(app.app(), "/api/sessions/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["healthy"], false);
}

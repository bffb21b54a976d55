#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;
use whaileys_api::activity::{ActivityEntry, ActivitySink};
use whaileys_api::auth::jwt::{generate_token, JwtConfig};
use whaileys_api::config::{ServerConfig, SessionApiSettings};
use whaileys_api::router::build_app_router;
use whaileys_api::state::AppState;
use whaileys_api::ws::Relay;
use whaileys_client::{SessionApi, SessionRecord, WhaileysApiError};
use whaileys_core::types::DbId;

/// Build a test `ServerConfig` with safe defaults and the watcher disabled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            expiry_days: 1,
        },
        cookie_secure: false,
        status_poll_interval_secs: 0,
        session_api: SessionApiSettings {
            url: None,
            token: None,
            timeout_secs: 5,
        },
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// In-memory stand-in for the external session API.
#[derive(Default)]
pub struct FakeSessionApi {
    pub sessions: Mutex<Vec<SessionRecord>>,
    /// QR codes served by the dedicated endpoint.
    pub qr_codes: Mutex<HashMap<String, String>>,
    pub fail_delete: AtomicBool,
    pub healthy: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeSessionApi {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn insert(&self, record: SessionRecord) {
        self.sessions.lock().unwrap().push(record);
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn session_record(session_id: &str, status: &str) -> SessionRecord {
    SessionRecord {
        id: format!("id-{session_id}"),
        session_id: session_id.to_string(),
        name: None,
        number: None,
        status: status.to_string(),
        qr_code: None,
        is_connected: status == "connected",
        created_at: "2026-03-01T10:00:00Z".to_string(),
        updated_at: "2026-03-01T10:00:00Z".to_string(),
        last_connected: None,
    }
}

#[async_trait]
impl SessionApi for FakeSessionApi {
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>, WhaileysApiError> {
        self.hit();
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, WhaileysApiError> {
        self.hit();
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned())
    }

    async fn qr_code(&self, session_id: &str) -> Result<Option<String>, WhaileysApiError> {
        self.hit();
        Ok(self.qr_codes.lock().unwrap().get(session_id).cloned())
    }

    async fn create_session(&self, session_id: &str) -> Result<SessionRecord, WhaileysApiError> {
        self.hit();
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.iter().any(|s| s.session_id == session_id) {
            return Err(WhaileysApiError::Api {
                status: 409,
                message: "Sessão já existe".to_string(),
            });
        }
        let record = session_record(session_id, "connecting");
        sessions.push(record.clone());
        Ok(record)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), WhaileysApiError> {
        self.hit();
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(WhaileysApiError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        self.sessions
            .lock()
            .unwrap()
            .retain(|s| s.session_id != session_id);
        Ok(())
    }

    async fn health(&self) -> Result<(), WhaileysApiError> {
        self.hit();
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WhaileysApiError::Api {
                status: 503,
                message: "API Error: 503".to_string(),
            })
        }
    }
}

/// Activity sink that keeps entries in memory.
///
/// With [`RecordingSink::watch`] it also notes, per entry, whether a relay
/// frame had already been queued on the watched connection.
#[derive(Default)]
pub struct RecordingSink {
    pub entries: Mutex<Vec<ActivityEntry>>,
    watched: Mutex<Option<UnboundedReceiver<Message>>>,
    frames_before: Mutex<Vec<bool>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Watch a relay connection reserved for this check.
    pub fn watch(&self, rx: UnboundedReceiver<Message>) {
        *self.watched.lock().unwrap() = Some(rx);
    }

    /// For each recorded entry, whether a frame was already queued.
    pub fn frames_before_record(&self) -> Vec<bool> {
        self.frames_before.lock().unwrap().clone()
    }

    /// Frames queued on the watched connection since the last record.
    pub fn drain_watched(&self) -> usize {
        let mut watched = self.watched.lock().unwrap();
        let Some(rx) = watched.as_mut() else {
            return 0;
        };
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

#[async_trait]
impl ActivitySink for RecordingSink {
    async fn record(&self, entry: ActivityEntry) {
        if let Some(rx) = self.watched.lock().unwrap().as_mut() {
            self.frames_before.lock().unwrap().push(rx.try_recv().is_ok());
        }
        self.entries.lock().unwrap().push(entry);
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub api: Arc<FakeSessionApi>,
    pub activity: Arc<RecordingSink>,
    pub relay: Arc<Relay>,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// A bearer token for a user with the given id and role.
    pub fn token(&self, user_id: DbId, role: &str) -> String {
        generate_token(user_id, role, Some("operador@example.com"), &self.config.jwt)
            .expect("token generation should succeed")
    }
}

/// Build the full application router, using the same builder as `main.rs`.
pub fn build_test_app(pool: Option<PgPool>) -> TestApp {
    let config = test_config();
    let api = Arc::new(FakeSessionApi::default());
    api.healthy.store(true, Ordering::SeqCst);
    let activity = Arc::new(RecordingSink::default());
    let relay = Arc::new(Relay::new());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        relay: Arc::clone(&relay),
        session_api: api.clone(),
        activity: activity.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        api,
        activity,
        relay,
        config,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should be handled")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response {
    let request = Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// The `name=value` pair of the session cookie set by `response`, if any.
pub fn session_cookie_pair(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("app_session_id="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

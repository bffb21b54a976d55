pub mod activity_logs;
pub mod auth;
pub mod health;
pub mod sessions;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                               live channel (public)
///
/// /auth/login                       login (public)
/// /auth/register                    register (public)
/// /auth/me                          current caller (public)
/// /auth/logout                      logout (public)
///
/// /sessions                         list, create
/// /sessions/health                  external API health (public)
/// /sessions/{session_id}            get, delete
/// /sessions/{session_id}/qrcode     pairing QR code
///
/// /activity-logs                    list (scoped to caller unless admin)
/// ```
///
/// Access levels are enforced in the handlers through [`crate::gate`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/sessions", sessions::router())
        .nest("/activity-logs", activity_logs::router())
}

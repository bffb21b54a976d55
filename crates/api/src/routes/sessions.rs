//! Route definitions for the `/sessions` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /                      -> list_sessions
/// POST   /                      -> create_session
/// GET    /health                -> health
/// GET    /{session_id}          -> get_session
/// DELETE /{session_id}          -> delete_session
/// GET    /{session_id}/qrcode   -> get_qr_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/health", get(sessions::health))
        .route(
            "/{session_id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/{session_id}/qrcode", get(sessions::get_qr_code))
}

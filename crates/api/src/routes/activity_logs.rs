//! Route definitions for the `/activity-logs` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::activity_logs;
use crate::state::AppState;

/// Routes mounted at `/activity-logs`.
///
/// ```text
/// GET /   -> list_activity_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(activity_logs::list_activity_logs))
}

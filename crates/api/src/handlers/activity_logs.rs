//! Handler for the `/activity-logs` listing.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use whaileys_core::activity::clamp_limit;
use whaileys_core::types::DbId;
use whaileys_db::models::activity_log::{ActivityLog, ActivityLogQuery};
use whaileys_db::repositories::ActivityLogRepo;

use crate::error::{AppError, AppResult};
use crate::gate::{scope_activity_filter, Operation, RequestContext};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /activity-logs`. Dates are RFC 3339.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogParams {
    pub user_id: Option<DbId>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

/// Parse an optional RFC 3339 timestamp.
fn parse_timestamp(value: Option<&str>, field: &str) -> AppResult<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            v.parse::<DateTime<Utc>>()
                .map_err(|_| AppError::BadRequest(format!("Invalid date format for {field}")))
        })
        .transpose()
}

/// GET /api/activity-logs
///
/// Newest first. Non-admin callers only ever see their own entries. A
/// missing or failing store yields an empty list.
pub async fn list_activity_logs(
    State(state): State<AppState>,
    ctx: RequestContext,
    params: Result<Query<ActivityLogParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<ActivityLog>>>> {
    let caller = ctx.require(Operation::ActivityLogsList)?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let query = ActivityLogQuery {
        user_id: scope_activity_filter(caller, params.user_id),
        action: params.action.filter(|a| !a.is_empty()),
        entity_type: params.entity_type.filter(|t| !t.is_empty()),
        from: parse_timestamp(params.start_date.as_deref(), "startDate")?,
        to: parse_timestamp(params.end_date.as_deref(), "endDate")?,
        limit: clamp_limit(params.limit),
    };

    let Some(pool) = &state.pool else {
        tracing::warn!("Cannot list activity: database not available");
        return Ok(Json(DataResponse { data: Vec::new() }));
    };

    let logs = match ActivityLogRepo::query(pool, &query).await {
        Ok(logs) => logs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list activity");
            Vec::new()
        }
    };
    Ok(Json(DataResponse { data: logs }))
}

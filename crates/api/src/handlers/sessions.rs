//! Handlers for the `/sessions` resource.
//!
//! Every protected handler passes the gate before calling
//! [`SessionCommands`](crate::commands::SessionCommands); request bodies are
//! only decoded once the caller is known.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use whaileys_client::SessionRecord;

use crate::error::{AppError, AppResult};
use crate::gate::{Operation, RequestContext};
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

/// Request body for `POST /sessions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Missing is treated like empty so the validation message applies.
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeResponse {
    pub qr_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<Json<DataResponse<Vec<SessionRecord>>>> {
    ctx.require(Operation::SessionsList)?;
    let sessions = state.session_commands().list().await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/sessions/{session_id}
pub async fn get_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(session_id): Path<String>,
) -> AppResult<Json<DataResponse<SessionRecord>>> {
    ctx.require(Operation::SessionsGet)?;
    let session = state.session_commands().get(&session_id).await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/sessions
///
/// Returns 201 with the record reported by the external API.
pub async fn create_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionRecord>>)> {
    let caller = ctx.require(Operation::SessionsCreate)?;
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let session = state
        .session_commands()
        .create(caller, &ctx.origin, &input.session_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// DELETE /api/sessions/{session_id}
pub async fn delete_session(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(session_id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let caller = ctx.require(Operation::SessionsDelete)?;
    state
        .session_commands()
        .delete(caller, &ctx.origin, &session_id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/sessions/{session_id}/qrcode
pub async fn get_qr_code(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(session_id): Path<String>,
) -> AppResult<Json<DataResponse<QrCodeResponse>>> {
    ctx.require(Operation::SessionsQrCode)?;
    let qr_code = state.session_commands().qr_code(&session_id).await?;
    Ok(Json(DataResponse {
        data: QrCodeResponse { qr_code },
    }))
}

/// GET /api/sessions/health
///
/// Public. Never fails; an unreachable API reports `healthy: false`.
pub async fn health(State(state): State<AppState>) -> Json<DataResponse<HealthStatus>> {
    let healthy = state.session_commands().health().await;
    Json(DataResponse {
        data: HealthStatus { healthy },
    })
}

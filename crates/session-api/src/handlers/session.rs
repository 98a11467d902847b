// ============================================================================
// Session API - Session Handlers
// File: crates/session-api/src/handlers/session.rs
// ============================================================================
//! Session inspection and data endpoints under `/api/session`.

use axum::{extract::Path, Json};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use session_core::Session;
use validator::Validate;

use crate::context::{SessionContext, SessionStatus};
use crate::error::ApiError;
use crate::response::ApiResponse;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Set-data request payload
#[derive(Debug, Deserialize, Validate)]
pub struct SetDataRequest {
    #[validate(length(min = 1, message = "key must not be empty"))]
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct DataEntry {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct RemovedEntry {
    pub key: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/session
pub async fn get_session(ctx: SessionContext) -> ApiResult<Session> {
    let session = ctx
        .session()
        .ok_or_else(|| ApiError::NotFound("no active session".to_string()))?;
    Ok(Json(ApiResponse::success(session)))
}

/// GET /api/session/status
pub async fn session_status(ctx: SessionContext) -> Json<ApiResponse<SessionStatus>> {
    Json(ApiResponse::success(ctx.status()))
}

/// POST /api/session/data
pub async fn set_data(
    ctx: SessionContext,
    WithRejection(Json(payload), _): WithRejection<Json<SetDataRequest>, ApiError>,
) -> ApiResult<DataEntry> {
    payload.validate()?;

    ctx.set(&payload.key, payload.value.clone())?;

    Ok(Json(ApiResponse::success(DataEntry {
        key: payload.key,
        value: payload.value,
    })))
}

/// GET /api/session/data/{key}
pub async fn get_data(ctx: SessionContext, Path(key): Path<String>) -> ApiResult<DataEntry> {
    let value = ctx.get(&key)?;
    Ok(Json(ApiResponse::success(DataEntry { key, value })))
}

/// DELETE /api/session/data/{key}
pub async fn remove_data(ctx: SessionContext, Path(key): Path<String>) -> ApiResult<RemovedEntry> {
    let removed = ctx.remove(&key)?.is_some();
    Ok(Json(ApiResponse::success(RemovedEntry { key, removed })))
}

/// POST /api/session/refresh
pub async fn refresh(ctx: SessionContext) -> ApiResult<RefreshResponse> {
    let session = ctx.refresh().await?;
    Ok(Json(ApiResponse::success(RefreshResponse {
        session_id: session.id().to_string(),
        expires_at: session.expires_at(),
    })))
}

/// DELETE /api/session
pub async fn destroy(ctx: SessionContext) -> ApiResult<MessageResponse> {
    ctx.destroy().await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Session destroyed".to_string(),
    })))
}

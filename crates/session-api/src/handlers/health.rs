use axum::{extract::State, Json};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions_enabled: bool,
    pub session_store: &'static str,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let config = state.sessions.config();
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        sessions_enabled: config.enabled,
        session_store: config.store.as_str(),
    }))
}

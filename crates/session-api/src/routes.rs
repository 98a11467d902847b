use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::{health, session};
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Session endpoints, each wrapped by the binding middleware.
pub fn session_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/session", get(session::get_session).delete(session::destroy))
        .route("/api/session/status", get(session::session_status))
        .route("/api/session/data", post(session::set_data))
        .route(
            "/api/session/data/{key}",
            get(session::get_data).delete(session::remove_data),
        )
        .route("/api/session/refresh", post(session::refresh))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(session_routes(&state))
        .with_state(state)
}

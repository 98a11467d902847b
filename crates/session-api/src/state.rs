use session_core::SessionManager;
use session_infrastructure::SessionBackend;
use std::sync::Arc;

/// Manager shared by the binding middleware and every bound context.
pub type SharedSessionManager = Arc<SessionManager<SessionBackend>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SharedSessionManager,
}

impl AppState {
    pub fn new(sessions: SharedSessionManager) -> Self {
        Self { sessions }
    }
}

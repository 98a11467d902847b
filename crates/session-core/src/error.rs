//! Session errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Session backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionError {
    /// Missing or expired; callers may recover by starting a new session.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::SessionExpired(_))
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

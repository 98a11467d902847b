//! Session store trait (port)

use async_trait::async_trait;

use crate::domain::Session;
use crate::error::SessionError;

/// Persistence backend for [`Session`] records.
///
/// Every call is a future; dropping it abandons the operation. Backends that
/// talk to the network bound each call with their own operation timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session. Absent ids are `NotFound`.
    async fn get(&self, id: &str) -> Result<Session, SessionError>;

    /// Upsert the session, expiring it at `session.expires_at()`.
    async fn set(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove the session. Absent ids are not an error.
    async fn delete(&self, id: &str) -> Result<(), SessionError>;

    /// Whether a live session exists under `id`.
    async fn exists(&self, id: &str) -> Result<bool, SessionError>;

    /// Sweep expired sessions and return how many were removed.
    async fn cleanup(&self) -> Result<usize, SessionError>;

    /// Release backend resources. Safe to call more than once.
    async fn close(&self) -> Result<(), SessionError>;
}

// ============================================================================
// Session API - Request Session Context
// File: crates/session-api/src/context.rs
// ============================================================================
//! Per-request handle on the bound session.
//!
//! The middleware binds one [`SessionContext`] into the request extensions.
//! Handlers read and mutate the in-memory session through it; the middleware
//! persists whatever is still bound once the handler returns.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use serde_json::Value;
use session_core::{Session, SessionError};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

use crate::state::SharedSessionManager;

struct Slot {
    session: Option<Session>,
    destroyed: bool,
}

struct Bound {
    manager: SharedSessionManager,
    slot: Mutex<Slot>,
}

/// Cloneable handle; all clones share one session slot.
///
/// An empty context (sessions disabled or the backend degraded) answers
/// every lookup with `NotFound`.
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Option<Arc<Bound>>,
}

/// Snapshot returned by the status endpoint.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_exists: bool,
    pub session_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub time_to_expire_secs: Option<i64>,
    pub data_count: usize,
    pub is_expired: bool,
}

impl SessionContext {
    pub(crate) fn bind(manager: SharedSessionManager, session: Session) -> Self {
        Self {
            inner: Some(Arc::new(Bound {
                manager,
                slot: Mutex::new(Slot {
                    session: Some(session),
                    destroyed: false,
                }),
            })),
        }
    }

    fn slot(&self) -> Option<MutexGuard<'_, Slot>> {
        self.inner.as_ref().map(|bound| bound.slot.lock())
    }

    fn no_session() -> SessionError {
        SessionError::NotFound("no active session".to_string())
    }

    /// Copy of the bound session, if any.
    pub fn session(&self) -> Option<Session> {
        self.slot().and_then(|slot| slot.session.clone())
    }

    pub fn id(&self) -> Option<String> {
        self.slot()
            .and_then(|slot| slot.session.as_ref().map(|s| s.id().to_string()))
    }

    pub fn get(&self, key: &str) -> Result<Value, SessionError> {
        let slot = self.slot().ok_or_else(Self::no_session)?;
        let session = slot.session.as_ref().ok_or_else(Self::no_session)?;
        session
            .get(key)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(format!("session data key: {}", key)))
    }

    /// Set a value on the in-memory session; persisted after the handler.
    pub fn set(&self, key: &str, value: Value) -> Result<(), SessionError> {
        if key.is_empty() {
            return Err(SessionError::InvalidArgument("session data key is empty".to_string()));
        }

        let mut slot = self.slot().ok_or_else(Self::no_session)?;
        let session = slot.session.as_mut().ok_or_else(Self::no_session)?;
        session.insert(key, value);
        Ok(())
    }

    /// Remove a key; returns the previous value if there was one.
    pub fn remove(&self, key: &str) -> Result<Option<Value>, SessionError> {
        let mut slot = self.slot().ok_or_else(Self::no_session)?;
        let session = slot.session.as_mut().ok_or_else(Self::no_session)?;
        Ok(session.remove(key))
    }

    pub fn status(&self) -> SessionStatus {
        let now = Utc::now();
        match self.session() {
            Some(session) => SessionStatus {
                session_exists: true,
                session_id: Some(session.id().to_string()),
                created_at: Some(session.created_at()),
                updated_at: Some(session.updated_at()),
                expires_at: Some(session.expires_at()),
                time_to_expire_secs: Some(session.time_to_live(now).num_seconds().max(0)),
                data_count: session.data.len(),
                is_expired: session.is_expired_at(now),
            },
            None => SessionStatus {
                session_exists: false,
                session_id: None,
                created_at: None,
                updated_at: None,
                expires_at: None,
                time_to_expire_secs: None,
                data_count: 0,
                is_expired: false,
            },
        }
    }

    /// Extend the session's expiry in the store and in this context.
    ///
    /// Data changed earlier in the same request stays in the context and is
    /// saved by the middleware together with the new expiry.
    pub async fn refresh(&self) -> Result<Session, SessionError> {
        let bound = self.inner.as_ref().ok_or_else(Self::no_session)?;
        let id = self.id().ok_or_else(Self::no_session)?;

        let refreshed = bound.manager.refresh_session(&id).await?;

        let mut slot = bound.slot.lock();
        if let Some(current) = slot.session.as_mut() {
            let data = std::mem::take(&mut current.data);
            *current = refreshed.clone();
            current.data = data;
        }
        Ok(refreshed)
    }

    /// Delete the session from the store and unbind it from this request.
    pub async fn destroy(&self) -> Result<(), SessionError> {
        let bound = self.inner.as_ref().ok_or_else(Self::no_session)?;
        let id = self.id().ok_or_else(Self::no_session)?;

        bound.manager.delete_session(&id).await?;

        let mut slot = bound.slot.lock();
        slot.session = None;
        slot.destroyed = true;
        debug!("Session {} destroyed", id);
        Ok(())
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.slot().map(|slot| slot.destroyed).unwrap_or(false)
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_default())
    }
}

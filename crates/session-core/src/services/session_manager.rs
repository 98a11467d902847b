// ============================================================================
// Session Core - Session Manager
// File: crates/session-core/src/services/session_manager.rs
// ============================================================================
//! Store-agnostic session lifecycle: create, fetch with expiry check, save,
//! delete, refresh and the per-key data helpers.
//!
//! Saves are last-writer-wins. Two requests that read-modify-save the same
//! session concurrently can overwrite each other's changes; there is no
//! version check.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{Session, SessionConfig};
use crate::error::SessionError;
use crate::repositories::SessionStore;

/// Session lifecycle rules on top of a single [`SessionStore`].
pub struct SessionManager<S: SessionStore> {
    store: S,
    config: SessionConfig,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocate and persist a fresh, empty session.
    pub async fn create_session(&self) -> Result<Session, SessionError> {
        let session = Session::new(Session::generate_id(), Utc::now(), self.config.max_age);

        if let Err(e) = self.store.set(&session).await {
            warn!("Failed to create session: {}", e);
            return Err(e);
        }

        debug!("Created new session: {}", session.id());
        Ok(session)
    }

    /// Fetch a live session.
    ///
    /// Expired sessions are deleted and reported as `SessionExpired`, even
    /// when the backend itself still returned them.
    pub async fn get_session(&self, id: &str) -> Result<Session, SessionError> {
        ensure_id(id)?;

        let session = self.store.get(id).await?;

        if session.is_expired_at(Utc::now()) {
            if let Err(e) = self.store.delete(id).await {
                warn!("Failed to delete expired session {}: {}", id, e);
            }
            debug!("Session {} expired", id);
            return Err(SessionError::SessionExpired(id.to_string()));
        }

        Ok(session)
    }

    /// Persist the session as-is. The expiry is not extended; use
    /// [`refresh_session`](Self::refresh_session) for that.
    pub async fn save_session(&self, session: &mut Session) -> Result<(), SessionError> {
        ensure_id(session.id())?;

        session.touch(Utc::now());
        self.store.set(session).await
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), SessionError> {
        ensure_id(id)?;

        self.store.delete(id).await?;
        debug!("Deleted session: {}", id);
        Ok(())
    }

    /// Extend the session's lifetime to `now + max_age` and persist it.
    pub async fn refresh_session(&self, id: &str) -> Result<Session, SessionError> {
        let mut session = self.get_session(id).await?;

        session.extend(Utc::now(), self.config.max_age);
        self.save_session(&mut session).await?;

        debug!("Refreshed session {} until {}", id, session.expires_at());
        Ok(session)
    }

    pub async fn set_session_data(
        &self,
        id: &str,
        key: &str,
        value: Value,
    ) -> Result<(), SessionError> {
        ensure_key(key)?;

        let mut session = self.get_session(id).await?;
        session.data.insert(key.to_string(), value);
        self.save_session(&mut session).await
    }

    pub async fn get_session_data(&self, id: &str, key: &str) -> Result<Value, SessionError> {
        ensure_key(key)?;

        let mut session = self.get_session(id).await?;
        session
            .data
            .remove(key)
            .ok_or_else(|| SessionError::NotFound(format!("session data key: {}", key)))
    }

    pub async fn remove_session_data(&self, id: &str, key: &str) -> Result<(), SessionError> {
        ensure_key(key)?;

        let mut session = self.get_session(id).await?;
        session.data.remove(key);
        self.save_session(&mut session).await
    }

    pub async fn session_exists(&self, id: &str) -> Result<bool, SessionError> {
        ensure_id(id)?;
        self.store.exists(id).await
    }

    /// Sweep expired sessions from the backing store.
    pub async fn cleanup(&self) -> Result<usize, SessionError> {
        self.store.cleanup().await
    }

    pub async fn close(&self) -> Result<(), SessionError> {
        self.store.close().await?;
        info!("Session manager closed");
        Ok(())
    }
}

fn ensure_id(id: &str) -> Result<(), SessionError> {
    if id.is_empty() {
        return Err(SessionError::InvalidArgument("session ID is required".to_string()));
    }
    Ok(())
}

fn ensure_key(key: &str) -> Result<(), SessionError> {
    if key.is_empty() {
        return Err(SessionError::InvalidArgument("session data key is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockSessionStore;
    use chrono::Duration;
    use mockall::predicate::eq;
    use serde_json::json;

    fn config() -> SessionConfig {
        SessionConfig {
            max_age: Duration::minutes(30),
            ..SessionConfig::default()
        }
    }

    fn live_session(id: &str) -> Session {
        Session::new(id, Utc::now(), Duration::minutes(30))
    }

    #[tokio::test]
    async fn create_session_persists_immediately() {
        let mut store = MockSessionStore::new();
        store
            .expect_set()
            .withf(|s| s.data.is_empty() && s.created_at() == s.updated_at())
            .times(1)
            .returning(|_| Ok(()));

        let manager = SessionManager::new(store, config());
        let session = manager.create_session().await.unwrap();

        assert!(!session.id().is_empty());
        assert_eq!(session.expires_at(), session.created_at() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn create_session_propagates_store_failure() {
        let mut store = MockSessionStore::new();
        store
            .expect_set()
            .returning(|_| Err(SessionError::BackendUnavailable("down".into())));

        let manager = SessionManager::new(store, config());
        let err = manager.create_session().await.unwrap_err();
        assert!(err.is_backend_unavailable());
    }

    #[tokio::test]
    async fn empty_id_is_rejected_before_the_store() {
        let store = MockSessionStore::new();
        let manager = SessionManager::new(store, config());

        assert!(matches!(
            manager.get_session("").await,
            Err(SessionError::InvalidArgument(_))
        ));
        assert!(matches!(
            manager.delete_session("").await,
            Err(SessionError::InvalidArgument(_))
        ));
        assert!(matches!(
            manager.session_exists("").await,
            Err(SessionError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn expired_session_from_store_is_deleted() {
        let mut store = MockSessionStore::new();
        store.expect_get().with(eq("old")).returning(|id| {
            Ok(Session::new(id, Utc::now() - Duration::hours(2), Duration::hours(1)))
        });
        store
            .expect_delete()
            .with(eq("old"))
            .times(1)
            .returning(|_| Ok(()));

        let manager = SessionManager::new(store, config());
        let err = manager.get_session("old").await.unwrap_err();
        assert!(matches!(err, SessionError::SessionExpired(_)));
    }

    #[tokio::test]
    async fn store_not_found_propagates_unchanged() {
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .returning(|id| Err(SessionError::NotFound(id.to_string())));

        let manager = SessionManager::new(store, config());
        let err = manager.get_session("missing").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn save_touches_but_does_not_extend() {
        let mut store = MockSessionStore::new();
        store.expect_set().times(1).returning(|_| Ok(()));

        let manager = SessionManager::new(store, config());
        let mut session = Session::new("abc", Utc::now() - Duration::minutes(5), Duration::minutes(30));
        let expires_at = session.expires_at();
        let updated_at = session.updated_at();

        manager.save_session(&mut session).await.unwrap();

        assert_eq!(session.expires_at(), expires_at);
        assert!(session.updated_at() > updated_at);
    }

    #[tokio::test]
    async fn refresh_extends_expiry() {
        let original = Session::new("abc", Utc::now() - Duration::minutes(20), Duration::minutes(30));
        let stored = original.clone();

        let mut store = MockSessionStore::new();
        store.expect_get().returning(move |_| Ok(stored.clone()));
        store
            .expect_set()
            .withf(|s| s.id() == "abc")
            .times(1)
            .returning(|_| Ok(()));

        let manager = SessionManager::new(store, config());
        let refreshed = manager.refresh_session("abc").await.unwrap();

        assert!(refreshed.expires_at() > original.expires_at());
        assert_eq!(refreshed.created_at(), original.created_at());
    }

    #[tokio::test]
    async fn get_session_data_reports_missing_key() {
        let mut store = MockSessionStore::new();
        store.expect_get().returning(|id| {
            let mut session = live_session(id);
            session.data.insert("present".into(), json!(1));
            Ok(session)
        });

        let manager = SessionManager::new(store, config());
        assert_eq!(manager.get_session_data("abc", "present").await.unwrap(), json!(1));
        assert!(matches!(
            manager.get_session_data("abc", "absent").await,
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(
            manager.get_session_data("abc", "").await,
            Err(SessionError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn set_session_data_saves_mutated_copy() {
        let mut store = MockSessionStore::new();
        store.expect_get().returning(|id| Ok(live_session(id)));
        store
            .expect_set()
            .withf(|s| s.get("theme") == Some(&json!("dark")))
            .times(1)
            .returning(|_| Ok(()));

        let manager = SessionManager::new(store, config());
        manager
            .set_session_data("abc", "theme", json!("dark"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cleanup_and_close_pass_through() {
        let mut store = MockSessionStore::new();
        store.expect_cleanup().times(1).returning(|| Ok(2));
        store.expect_close().times(1).returning(|| Ok(()));

        let manager = SessionManager::new(store, config());
        assert_eq!(manager.cleanup().await.unwrap(), 2);
        manager.close().await.unwrap();
    }
}

//! Remote key-value session store.
//!
//! Sessions are stored as JSON under `session:<id>` with the backend's native
//! key expiry set to the session's remaining lifetime, so no sweep is needed.

use async_trait::async_trait;
use chrono::Utc;
use session_core::{Session, SessionError, SessionStore};
use session_shared::constants::SESSION_KEY_PREFIX;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::KeyValueClient;

pub struct RemoteStore {
    client: Arc<dyn KeyValueClient>,
    prefix: String,
}

impl RemoteStore {
    pub fn new(client: Arc<dyn KeyValueClient>) -> Self {
        Self {
            client,
            prefix: SESSION_KEY_PREFIX.to_string(),
        }
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }
}

#[async_trait]
impl SessionStore for RemoteStore {
    async fn get(&self, id: &str) -> Result<Session, SessionError> {
        let raw = self
            .client
            .get(&self.key(id))
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        let session: Session = serde_json::from_str(&raw)?;
        if session.id() != id {
            warn!("Remote key for session {} holds session {}, ignoring it", id, session.id());
            return Err(SessionError::NotFound(id.to_string()));
        }
        Ok(session)
    }

    async fn set(&self, session: &Session) -> Result<(), SessionError> {
        let key = self.key(session.id());

        // An already-expired session is never written; whatever is stored
        // under its key is stale as well.
        let ttl = match session.time_to_live(Utc::now()).to_std() {
            Ok(ttl) if !ttl.is_zero() => ttl,
            _ => {
                debug!("Session {} already expired, removing remote key", session.id());
                return self.client.delete(&key).await;
            }
        };

        let payload = serde_json::to_string(session)?;
        self.client.set_with_ttl(&key, payload, ttl).await?;

        debug!("Session {} saved to remote store with TTL {:?}", session.id(), ttl);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.client.delete(&self.key(id)).await?;
        debug!("Session {} deleted from remote store", id);
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        self.client.exists(&self.key(id)).await
    }

    async fn cleanup(&self) -> Result<usize, SessionError> {
        debug!("Remote store cleanup skipped (keys expire natively)");
        Ok(0)
    }

    async fn close(&self) -> Result<(), SessionError> {
        // The client is shared with the application and closed by its owner.
        Ok(())
    }
}

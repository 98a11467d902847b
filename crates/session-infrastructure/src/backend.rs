// ============================================================================
// Session Infrastructure - Backend Selection
// File: crates/session-infrastructure/src/backend.rs
// ============================================================================
//! Tagged store variant chosen once from configuration.

use async_trait::async_trait;
use session_core::{Session, SessionConfig, SessionError, SessionManager, SessionStore, StoreKind};
use std::sync::Arc;
use tracing::info;

use crate::cache::KeyValueClient;
use crate::memory::MemoryStore;
use crate::remote::RemoteStore;

pub enum SessionBackend {
    Memory(MemoryStore),
    Remote(RemoteStore),
}

impl SessionBackend {
    /// In-process store; spawns the reaper on the current runtime.
    pub fn memory(config: &SessionConfig) -> Self {
        Self::Memory(MemoryStore::new(config.cleanup_interval))
    }

    pub fn remote(client: Arc<dyn KeyValueClient>) -> Self {
        Self::Remote(RemoteStore::new(client))
    }

    /// Build the backend named by `config.store`.
    ///
    /// Fails with `BackendUnavailable` when the remote store is selected but
    /// no key-value client was provided.
    pub fn from_config(
        config: &SessionConfig,
        client: Option<Arc<dyn KeyValueClient>>,
    ) -> Result<Self, SessionError> {
        let backend = match config.store {
            StoreKind::Memory => Self::memory(config),
            StoreKind::Remote => {
                let client = client.ok_or_else(|| {
                    SessionError::BackendUnavailable(
                        "a key-value client is required for the remote session store".to_string(),
                    )
                })?;
                Self::remote(client)
            }
        };

        info!("Session store initialized: {}", backend.kind().as_str());
        Ok(backend)
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            Self::Memory(_) => StoreKind::Memory,
            Self::Remote(_) => StoreKind::Remote,
        }
    }
}

/// Manager over whichever backend the configuration selected.
pub fn build_manager(
    config: SessionConfig,
    client: Option<Arc<dyn KeyValueClient>>,
) -> Result<SessionManager<SessionBackend>, SessionError> {
    let backend = SessionBackend::from_config(&config, client)?;
    Ok(SessionManager::new(backend, config))
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn get(&self, id: &str) -> Result<Session, SessionError> {
        match self {
            Self::Memory(store) => store.get(id).await,
            Self::Remote(store) => store.get(id).await,
        }
    }

    async fn set(&self, session: &Session) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.set(session).await,
            Self::Remote(store) => store.set(session).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.delete(id).await,
            Self::Remote(store) => store.delete(id).await,
        }
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        match self {
            Self::Memory(store) => store.exists(id).await,
            Self::Remote(store) => store.exists(id).await,
        }
    }

    async fn cleanup(&self) -> Result<usize, SessionError> {
        match self {
            Self::Memory(store) => store.cleanup().await,
            Self::Remote(store) => store.cleanup().await,
        }
    }

    async fn close(&self) -> Result<(), SessionError> {
        match self {
            Self::Memory(store) => store.close().await,
            Self::Remote(store) => store.close().await,
        }
    }
}

//! In-process session store with a background reaper.
//!
//! All sessions live in one map behind a single reader/writer lock. Reads
//! take the shared lock; writes, deletes and the sweep take the exclusive
//! lock. Sessions go in and come out as owned clones, so callers never share
//! `data` with the map.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use session_core::{Session, SessionError, SessionStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

type SessionMap = Arc<RwLock<HashMap<String, Session>>>;

pub struct MemoryStore {
    sessions: SessionMap,
    closed: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl MemoryStore {
    /// Create the store and spawn its reaper on the current tokio runtime.
    ///
    /// The reaper sweeps expired sessions every `cleanup_interval` until
    /// [`close`](SessionStore::close) is called or the store is dropped.
    pub fn new(cleanup_interval: Duration) -> Self {
        let sessions: SessionMap = Arc::new(RwLock::new(HashMap::new()));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let reaper = tokio::spawn(reap_loop(sessions.clone(), cleanup_interval, shutdown_rx));

        info!("Memory session store started (cleanup every {:?})", cleanup_interval);

        Self {
            sessions,
            closed: AtomicBool::new(false),
            shutdown_tx,
            reaper: Mutex::new(Some(reaper)),
        }
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SessionError::BackendUnavailable("memory store closed".to_string()));
        }
        Ok(())
    }

    /// Drop the entry if it is still expired under the exclusive lock. A
    /// concurrent `set` may have replaced it since the shared-lock check.
    fn remove_if_expired(&self, id: &str, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write();
        let expired = sessions
            .get(id)
            .map(|s| s.is_expired_at(now))
            .unwrap_or(false);
        if expired {
            sessions.remove(id);
            debug!("Session {} expired, removed from memory store", id);
        }
    }
}

fn sweep(sessions: &RwLock<HashMap<String, Session>>) -> usize {
    let now = Utc::now();
    let mut sessions = sessions.write();
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired_at(now));
    before - sessions.len()
}

async fn reap_loop(sessions: SessionMap, period: Duration, mut shutdown_rx: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = sweep(&sessions);
                if removed > 0 {
                    debug!("Cleaned up {} expired sessions from memory store", removed);
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Memory store reaper stopping");
                break;
            }
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Session, SessionError> {
        self.ensure_open()?;
        let now = Utc::now();

        {
            let sessions = self.sessions.read();
            match sessions.get(id) {
                None => return Err(SessionError::NotFound(id.to_string())),
                Some(session) if !session.is_expired_at(now) => return Ok(session.clone()),
                Some(_) => {}
            }
        }

        self.remove_if_expired(id, now);
        Err(SessionError::SessionExpired(id.to_string()))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionError> {
        self.ensure_open()?;

        self.sessions
            .write()
            .insert(session.id().to_string(), session.clone());
        debug!("Session {} saved to memory store", session.id());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.ensure_open()?;

        self.sessions.write().remove(id);
        debug!("Session {} deleted from memory store", id);
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, SessionError> {
        self.ensure_open()?;
        let now = Utc::now();

        let expired = match self.sessions.read().get(id) {
            None => return Ok(false),
            Some(session) => session.is_expired_at(now),
        };

        if expired {
            self.remove_if_expired(id, now);
            return Ok(false);
        }
        Ok(true)
    }

    async fn cleanup(&self) -> Result<usize, SessionError> {
        self.ensure_open()?;

        let removed = sweep(&self.sessions);
        if removed > 0 {
            debug!("Cleaned up {} expired sessions from memory store", removed);
        }
        Ok(removed)
    }

    async fn close(&self) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let _ = self.shutdown_tx.send(());
        let reaper = self.reaper.lock().take();
        if let Some(handle) = reaper {
            if let Err(e) = handle.await {
                warn!("Memory store reaper ended abnormally: {}", e);
            }
        }

        self.sessions.write().clear();
        debug!("Memory store closed");
        Ok(())
    }
}

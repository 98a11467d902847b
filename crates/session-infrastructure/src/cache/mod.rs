//! Key-value cache clients

pub mod redis_client;

use async_trait::async_trait;
use session_core::SessionError;
use std::time::Duration;

pub use redis_client::RedisClient;

/// The four primitives the remote session store needs from a key-value
/// backend. Misses are `Ok(None)` / `Ok(false)`, never errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError>;

    async fn delete(&self, key: &str) -> Result<(), SessionError>;

    async fn exists(&self, key: &str) -> Result<bool, SessionError>;
}

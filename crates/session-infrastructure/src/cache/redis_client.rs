// ============================================================================
// Session Infrastructure - Redis Client
// File: crates/session-infrastructure/src/cache/redis_client.rs
// ============================================================================
//! Pooled redis client implementing [`KeyValueClient`].

use async_trait::async_trait;
use deadpool_redis::{redis, Config, Connection, Pool, PoolConfig, Runtime};
use session_core::SessionError;
use session_shared::RedisSettings;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

use super::KeyValueClient;

#[derive(Clone)]
pub struct RedisClient {
    pool: Pool,
    operation_timeout: Duration,
}

impl RedisClient {
    /// Build the pool and verify connectivity with a PING.
    pub async fn connect(url: &str, settings: &RedisSettings) -> Result<Self, SessionError> {
        let mut cfg = Config::from_url(url);
        cfg.pool = Some(PoolConfig::new(settings.max_connections as usize));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| SessionError::BackendUnavailable(format!("redis pool: {}", e)))?;

        let client = Self {
            pool,
            operation_timeout: Duration::from_millis(settings.operation_timeout_ms),
        };
        client.ping().await?;

        info!("Redis connected successfully");
        Ok(client)
    }

    pub async fn ping(&self) -> Result<(), SessionError> {
        self.run("PING", async {
            let mut conn = self.connection().await?;
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map(|_| ())
                .map_err(|e| redis_error("PING", e))
        })
        .await
    }

    async fn connection(&self) -> Result<Connection, SessionError> {
        self.pool
            .get()
            .await
            .map_err(|e| SessionError::BackendUnavailable(format!("redis connection: {}", e)))
    }

    /// Bound a redis round trip by the operation timeout.
    async fn run<T, F>(&self, op: &'static str, fut: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!("Redis {} timed out after {:?}", op, self.operation_timeout);
                Err(SessionError::BackendUnavailable(format!("redis {} timed out", op)))
            }
        }
    }
}

fn redis_error(op: &str, e: redis::RedisError) -> SessionError {
    error!("Redis {} error: {}", op, e);
    SessionError::BackendUnavailable(format!("redis {}: {}", op, e))
}

#[async_trait]
impl KeyValueClient for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.run("GET", async {
            let mut conn = self.connection().await?;
            redis::cmd("GET")
                .arg(key)
                .query_async::<Option<String>>(&mut conn)
                .await
                .map_err(|e| redis_error("GET", e))
        })
        .await
    }

    async fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) -> Result<(), SessionError> {
        let ttl_ms = ttl.as_millis().max(1) as u64;
        self.run("SET", async {
            let mut conn = self.connection().await?;
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| redis_error("SET", e))
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.run("DEL", async {
            let mut conn = self.connection().await?;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| redis_error("DEL", e))
        })
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool, SessionError> {
        self.run("EXISTS", async {
            let mut conn = self.connection().await?;
            redis::cmd("EXISTS")
                .arg(key)
                .query_async::<i64>(&mut conn)
                .await
                .map(|count| count > 0)
                .map_err(|e| redis_error("EXISTS", e))
        })
        .await
    }
}

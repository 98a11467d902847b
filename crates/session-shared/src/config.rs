//! Configuration management

use config::{Config, Environment, File};
use serde::Deserialize;
use validator::Validate;

use crate::constants::{
    DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH,
    DEFAULT_REDIS_MAX_CONNECTIONS, DEFAULT_REDIS_OPERATION_TIMEOUT_MS,
    DEFAULT_SESSION_MAX_AGE_SECS,
};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub app: AppSettings,
    #[validate(nested)]
    pub log: LogSettings,
    #[validate(nested)]
    pub redis: RedisSettings,
    #[validate(nested)]
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppSettings {
    pub env: String,
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is not set
    #[validate(length(min = 1))]
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
    /// Directory for daily-rolling log files; stdout only when absent
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct RedisSettings {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`. No client is built when absent.
    pub url: Option<String>,
    #[validate(range(min = 1))]
    pub max_connections: u32,
    #[validate(range(min = 1))]
    pub operation_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SessionSettings {
    pub enabled: bool,
    /// `memory` or `remote` (`redis` is accepted as an alias)
    #[validate(length(min = 1))]
    pub store: String,
    /// Non-positive values fall back to 24 hours; capped at ten years
    #[validate(range(max = 315_360_000))]
    pub max_age_seconds: i64,
    #[validate(range(min = 1))]
    pub cleanup_interval_seconds: u64,
    #[validate(length(min = 1))]
    pub cookie_name: String,
    pub path: String,
    pub domain: String,
    pub secure: bool,
    pub http_only: bool,
    /// `strict`, `lax`, `none`, or empty for the browser default
    pub same_site: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store: "memory".to_string(),
            max_age_seconds: DEFAULT_SESSION_MAX_AGE_SECS,
            cleanup_interval_seconds: DEFAULT_CLEANUP_INTERVAL_SECS,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            path: DEFAULT_COOKIE_PATH.to_string(),
            domain: String::new(),
            secure: false,
            http_only: true,
            same_site: "lax".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "session-server")?
            .set_default("log.level", "info")?
            .set_default("log.format", "json")?
            .set_default("redis.max_connections", DEFAULT_REDIS_MAX_CONNECTIONS)?
            .set_default("redis.operation_timeout_ms", DEFAULT_REDIS_OPERATION_TIMEOUT_MS)?
            .set_default("session.enabled", true)?
            .set_default("session.store", "memory")?
            .set_default("session.max_age_seconds", DEFAULT_SESSION_MAX_AGE_SECS)?
            .set_default("session.cleanup_interval_seconds", DEFAULT_CLEANUP_INTERVAL_SECS)?
            .set_default("session.cookie_name", DEFAULT_COOKIE_NAME)?
            .set_default("session.path", DEFAULT_COOKIE_PATH)?
            .set_default("session.domain", "")?
            .set_default("session.secure", false)?
            .set_default("session.http_only", true)?
            .set_default("session.same_site", "lax")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        tracing::debug!(
            "Configuration loaded for environment {} (session store: {})",
            env,
            app_config.session.store
        );
        Ok(app_config)
    }
}

//! Application-wide constants

pub const DEFAULT_COOKIE_NAME: &str = "session_id";
pub const DEFAULT_COOKIE_PATH: &str = "/";
pub const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 86_400;
/// Ten years
pub const MAX_SESSION_MAX_AGE_SECS: i64 = 315_360_000;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
pub const SESSION_KEY_PREFIX: &str = "session:";
pub const DEFAULT_REDIS_MAX_CONNECTIONS: u32 = 16;
pub const DEFAULT_REDIS_OPERATION_TIMEOUT_MS: u64 = 2_000;

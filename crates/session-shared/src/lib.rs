//! # Session Shared
//!
//! Settings, telemetry and error types shared by the session crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, LogSettings, RedisSettings, SessionSettings};
pub use error::AppError;

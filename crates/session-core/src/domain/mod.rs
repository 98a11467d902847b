//! # Session Core - Domain Module
//!
//! Session entity and its configuration.

pub mod config;
pub mod session;

pub use config::{CookieConfig, SameSitePolicy, SessionConfig, StoreKind};
pub use session::Session;

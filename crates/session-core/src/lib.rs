//! # Session Core
//!
//! Session entity, store trait and the lifecycle manager.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::SessionError;
pub use repositories::SessionStore;
pub use services::SessionManager;

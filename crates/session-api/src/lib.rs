//! # Session API
//!
//! Session binding middleware, request context, handlers and routes.

pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use context::{SessionContext, SessionStatus};
pub use error::ApiError;
pub use middleware::session_middleware;
pub use routes::create_router;
pub use state::{AppState, SharedSessionManager};

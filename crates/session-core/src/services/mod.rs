//! Domain services (session lifecycle)

pub mod session_manager;

pub use session_manager::SessionManager;

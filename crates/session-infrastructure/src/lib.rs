//! # Session Infrastructure
//!
//! Session store implementations (adapters): in-process memory store and the
//! remote key-value store over redis.

pub mod backend;
pub mod cache;
pub mod memory;
pub mod remote;

pub use backend::{build_manager, SessionBackend};
pub use cache::{KeyValueClient, RedisClient};
pub use memory::MemoryStore;
pub use remote::RemoteStore;

//! Session Module
//!
//! The process-wide record of who is signed in, and the local key/value
//! storage that keeps it across restarts.

pub mod storage;
pub mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore, SESSION_FORMAT_VERSION};
pub use store::{Session, SessionStore};

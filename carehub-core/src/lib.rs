//! CareHub Core - Shared building blocks for the CareHub workspace
//!
//! This crate holds the pieces every other CareHub crate leans on: the
//! structured error type, the TOML configuration model and the logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;

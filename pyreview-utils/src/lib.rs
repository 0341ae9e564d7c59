//! pyreview utilities
//!
//! Configuration loading (TOML, JSON, YAML with layered overrides) and
//! logging initialisation shared by every crate in the workspace.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod logging;

pub use config::{load_value, ConfigBuilder, ConfigFormat};
pub use logging::{get_logger, init_logging, LogLevel, Logger, LoggerConfig};

/// Result type used throughout pyreview utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

//! Error types for the admin CLI.

use thiserror::Error;

/// Errors that can occur while running an admin command.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Bad environment configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Registry error.
    #[error("Registry error: {0}")]
    Registry(#[from] device_registry::RegistryError),

    /// Output could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;

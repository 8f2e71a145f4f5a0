//! Registry error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No binding exists for the requested key.
    #[error("no binding for device {device_id} and author {author_id}")]
    NotFound { device_id: String, author_id: i64 },

    /// No binding was posted from the requested message.
    #[error("no binding for message {message_id}")]
    MessageNotFound { message_id: i64 },

    /// The backing store is unreachable or rejected the statement.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Input rejected before reaching storage.
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
}

impl RegistryError {
    /// Whether this is a negative lookup result rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::NotFound { .. } | RegistryError::MessageNotFound { .. }
        )
    }

    /// Whether the backing store failed the operation.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            RegistryError::StorageUnavailable(_) | RegistryError::Migration(_)
        )
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

//! Error types for checkpoint savers and stores.

use thiserror::Error;

/// Result type alias for checkpoint operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by checkpoint savers and stores.
#[derive(Debug, Error)]
pub enum Error {
    /// A checkpoint id was referenced that the thread does not contain.
    #[error("checkpoint '{checkpoint_id}' not found for thread '{thread_id}'")]
    NotFound {
        thread_id: String,
        checkpoint_id: String,
    },

    /// A checkpoint with the same id was already written to the thread.
    #[error("checkpoint '{checkpoint_id}' already exists in thread '{thread_id}'")]
    Duplicate {
        thread_id: String,
        checkpoint_id: String,
    },

    /// State could not be encoded for storage.
    #[error("failed to serialize checkpoint state: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    /// Stored state could not be decoded.
    #[error("failed to deserialize checkpoint state: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
}

impl Error {
    /// Create a not-found error.
    pub fn not_found(thread_id: impl Into<String>, checkpoint_id: impl Into<String>) -> Self {
        Self::NotFound {
            thread_id: thread_id.into(),
            checkpoint_id: checkpoint_id.into(),
        }
    }

    /// Whether the error refers to a missing checkpoint.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

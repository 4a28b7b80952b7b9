//! Error types for store drivers
//!
//! Every [`StoreClient`](crate::StoreClient) implementation reports
//! failures through [`StoreError`]. The connector layer translates these
//! into its own usage errors; nothing here is caller-facing on its own.

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Driver-level store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Entity not found where the operation requires one
    #[error("entity not found: {key}")]
    NotFound {
        /// Display form of the missing key
        key: String,
    },

    /// Insert hit an existing entity with the same key
    #[error("entity already exists: {key}")]
    AlreadyExists {
        /// Display form of the colliding key
        key: String,
    },

    /// Transaction commit lost a read-write race
    #[error("transaction conflict: {reason}")]
    Conflict {
        /// What was observed to change under the transaction
        reason: String,
    },

    /// Query violates the backend's structural rules
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// Which rule was violated
        reason: String,
    },

    /// Any other backend-reported failure
    #[error("backend error: {message}")]
    Backend {
        /// Raw driver message (may be a JSON-shaped error body)
        message: String,
    },
}

impl StoreError {
    /// Whether this error is a commit-time conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

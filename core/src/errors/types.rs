//! Error types for identifier validation and attempt storage
//!
//! `ValidationError` is raised before a request reaches the engine.
//! `StorageError` is raised by `AttemptStore` implementations and must never
//! be read as "allow" on the decision path.

use thiserror::Error;

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid identifier: {value}")]
    InvalidIdentifier { value: String },
}

/// Attempt store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend unreachable or returned an error
    #[error("Attempt store unavailable: {message}")]
    Unavailable { message: String },

    /// The store did not answer within the configured bound
    #[error("Attempt store timed out during {operation} after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    /// A stored record could not be encoded or decoded
    #[error("Attempt record serialization failed: {message}")]
    Serialization { message: String },

    /// Optimistic transaction kept losing to concurrent writers
    #[error("Attempt record for {identifier} is contended, gave up after {retries} retries")]
    Conflict { identifier: String, retries: u32 },
}

impl StorageError {
    /// Helper used by backends to wrap driver errors
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

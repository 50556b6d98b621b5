//! Domain-specific error types and error handling.

mod types;

pub use types::{StorageError, StorageResult, ValidationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// Rejected at startup, never per request
    #[error("Policy misconfiguration: {message}")]
    PolicyMisconfiguration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DomainError {
    /// True when the failure came from the attempt store
    pub fn is_storage(&self) -> bool {
        matches!(self, DomainError::Storage(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_bridges_into_domain_error() {
        let err: DomainError = StorageError::unavailable("connection refused").into();
        assert!(err.is_storage());
        assert_eq!(err.to_string(), "Attempt store unavailable: connection refused");
    }

    #[test]
    fn test_timeout_message_names_operation() {
        let err = StorageError::Timeout {
            operation: "upsert".to_string(),
            timeout_ms: 250,
        };
        assert_eq!(err.to_string(), "Attempt store timed out during upsert after 250ms");
    }

    #[test]
    fn test_validation_error_is_not_storage() {
        let err: DomainError = ValidationError::InvalidIdentifier {
            value: "abc".to_string(),
        }
        .into();
        assert!(!err.is_storage());
    }
}

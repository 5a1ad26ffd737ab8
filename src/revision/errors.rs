//! # Revision Errors
//!
//! Error types for snapshotting, diffing, hydration and revert.

use thiserror::Error;

use super::revision::RevisionId;
use crate::document::StoreError;
use crate::schema::SchemaError;

/// Result type for revision operations
pub type RevisionResult<T> = Result<T, RevisionError>;

/// Revision tracking errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RevisionError {
    /// The document type lacks the versioned marker
    #[error("Type '{0}' is not versioned; enable versioning in its schema")]
    NotVersioned(String),

    /// Persistence collaborator failure, including missing records
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unknown type or invalid schema
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A reference field holds something other than a document reference
    #[error("Field '{field}' is not a valid reference: {reason}")]
    InvalidReference { field: String, reason: String },

    /// List field whose revision pointers and identifiers do not pair up
    #[error("Field '{field}' has {pointers} revision pointers for {ids} identifiers")]
    MisalignedPointers {
        field: String,
        pointers: usize,
        ids: usize,
    },

    /// Stored revision data does not match the owner's schema
    #[error("Revision {revision} field '{field}': {reason}")]
    CorruptRevision {
        revision: String,
        field: String,
        reason: String,
    },

    /// A revision's related pointers lead back to itself
    #[error("Revision {0} is reachable from its own related revisions")]
    HydrationCycle(RevisionId),

    /// Related revision chain deeper than the configured bound
    #[error("Hydration exceeded the maximum depth of {0}")]
    HydrationDepthExceeded(usize),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RevisionError {
    /// Returns true when the failure is a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, RevisionError::Store(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_convert() {
        let err: RevisionError = StoreError::not_found("Author", "au1").into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Author 'au1' not found");
    }

    #[test]
    fn test_not_versioned_message() {
        let err = RevisionError::NotVersioned("Tag".into());
        assert!(err.to_string().contains("'Tag' is not versioned"));
        assert!(!err.is_not_found());
    }
}

//! # Document Store Errors
//!
//! Error types raised by the persistence collaborator.

use thiserror::Error;

/// Result type for document and record persistence
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this identifier exists in the collection
    #[error("{collection} '{id}' not found")]
    NotFound { collection: String, id: String },

    /// A nested reference points at a document that was never saved
    #[error("Field '{field}' references a document without an identifier")]
    UnsavedReference { field: String },

    /// Attempt to overwrite an immutable record
    #[error("Record '{0}' is immutable")]
    Immutable(String),

    /// Lock poisoning or other backend failure
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a not found error for the given collection and id
    pub fn not_found(collection: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Returns true for missing-record errors
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn poisoned() -> Self {
        Self::Internal("Lock poisoned".into())
    }
}

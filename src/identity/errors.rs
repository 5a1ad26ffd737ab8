//! # Identity Errors

use thiserror::Error;

use super::principal::AuthorId;

/// Result type for principal lookups
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Principal lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Principal was deleted or never existed
    #[error("Principal '{0}' not found")]
    PrincipalNotFound(AuthorId),

    /// Directory backend failed
    #[error("Identity error: {0}")]
    Internal(String),
}

//! Author identity
//!
//! The identity collaborator: an author is anything exposing an opaque
//! identifier, and a directory can resolve that identifier for display.

mod errors;
mod principal;

pub use errors::{IdentityError, IdentityResult};
pub use principal::{AuthorId, InMemoryUserDirectory, Principal, PrincipalDirectory, User};

//! # Principals
//!
//! Revisions only ever store and compare an opaque author identifier. Any
//! user model can author revisions by implementing [`Principal`].

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::errors::{IdentityError, IdentityResult};

/// Opaque identifier of a revision author
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AuthorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Anything that can author a revision
pub trait Principal {
    fn identifier(&self) -> AuthorId;
}

impl Principal for AuthorId {
    fn identifier(&self) -> AuthorId {
        self.clone()
    }
}

/// Resolves author identifiers back to displayable principals
pub trait PrincipalDirectory: Send + Sync {
    type Principal;

    /// Look up a principal; `PrincipalNotFound` if it no longer exists.
    fn lookup(&self, id: &AuthorId) -> IdentityResult<Self::Principal>;
}

/// Minimal user model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: AuthorId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: AuthorId::new(id),
            username: username.into(),
            email: None,
        }
    }
}

impl Principal for User {
    fn identifier(&self) -> AuthorId {
        self.id.clone()
    }
}

/// In-memory user directory for testing
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<AuthorId, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) -> IdentityResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| IdentityError::Internal("Lock poisoned".into()))?;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn remove(&self, id: &AuthorId) -> IdentityResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| IdentityError::Internal("Lock poisoned".into()))?;
        users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| IdentityError::PrincipalNotFound(id.clone()))
    }
}

impl PrincipalDirectory for InMemoryUserDirectory {
    type Principal = User;

    fn lookup(&self, id: &AuthorId) -> IdentityResult<User> {
        let users = self
            .users
            .read()
            .map_err(|_| IdentityError::Internal("Lock poisoned".into()))?;
        users
            .get(id)
            .cloned()
            .ok_or_else(|| IdentityError::PrincipalNotFound(id.clone()))
    }
}

//! docrev - Revision tracking for stored documents
//!
//! Opt-in, point-in-time snapshots of document instances, with field-level
//! diffs, hydration back into documents, and revert.
//!
//! Persistence and identity are collaborators behind traits; in-memory
//! implementations are provided for embedding and tests.

pub mod document;
pub mod identity;
pub mod observability;
pub mod revision;
pub mod schema;

pub use document::{Document, DocumentId, DocumentStore, FieldValue, Reference};
pub use identity::{AuthorId, Principal, PrincipalDirectory};
pub use revision::{Revision, RevisionError, RevisionId, RevisionManager, RevisionResult, Versionable};
pub use schema::{DocumentSchema, FieldKind, SchemaRegistry, VersioningOptions};

//! Live documents and their persistence collaborator
//!
//! Revision tracking reads and writes live documents only through the
//! [`DocumentStore`] trait. The in-memory implementation is suitable for
//! tests and for embedding.

mod document;
mod errors;
mod store;

pub use document::{Document, DocumentId, FieldValue, Reference, PRIMARY_KEY_FIELD};
pub use errors::{StoreError, StoreResult};
pub use store::{DocumentStore, InMemoryDocumentStore};

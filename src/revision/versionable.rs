//! Opt-in versioning capability
//!
//! Whether a type is versioned lives in its schema; this trait only exposes
//! the identity the revision manager needs to look revisions up.

use crate::document::{Document, DocumentId};

/// A document-like value whose revisions can be queried.
pub trait Versionable {
    /// Registered type name
    fn type_name(&self) -> &str;

    /// Primary key, absent until first saved
    fn document_id(&self) -> Option<&DocumentId>;
}

impl Versionable for Document {
    fn type_name(&self) -> &str {
        Document::type_name(self)
    }

    fn document_id(&self) -> Option<&DocumentId> {
        self.id()
    }
}

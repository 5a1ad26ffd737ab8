//! # Document Store
//!
//! The persistence collaborator for live documents. Revision tracking only
//! needs keyed reads and writes; querying is left to the host store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::document::{Document, DocumentId};
use super::errors::{StoreError, StoreResult};

/// Document persistence trait
///
/// Abstracts the host document store.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by type and primary key.
    fn get(&self, type_name: &str, id: &DocumentId) -> StoreResult<Document>;

    /// Persist a document, assigning a primary key if it has none.
    ///
    /// Nested instances are stored as links. Saving never cascades.
    fn save(&self, document: &mut Document) -> StoreResult<()>;

    /// Remove a document.
    fn delete(&self, type_name: &str, id: &DocumentId) -> StoreResult<()>;

    /// Number of stored documents of a type.
    fn count(&self, type_name: &str) -> StoreResult<usize>;
}

/// In-memory document store for testing and embedding
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<(String, DocumentId), Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, type_name: &str, id: &DocumentId) -> StoreResult<Document> {
        let documents = self.documents.read().map_err(|_| StoreError::poisoned())?;
        documents
            .get(&(type_name.to_string(), id.clone()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(type_name, id))
    }

    fn save(&self, document: &mut Document) -> StoreResult<()> {
        // Validate links before assigning an id so a failed save leaves no trace
        let mut stored = document.detached()?;
        let id = match document.id() {
            Some(id) => id.clone(),
            None => {
                let id = DocumentId::generate();
                document.set_id(id.clone());
                stored.set_id(id.clone());
                id
            }
        };

        let mut documents = self.documents.write().map_err(|_| StoreError::poisoned())?;
        documents.insert((document.type_name().to_string(), id), stored);
        Ok(())
    }

    fn delete(&self, type_name: &str, id: &DocumentId) -> StoreResult<()> {
        let mut documents = self.documents.write().map_err(|_| StoreError::poisoned())?;
        documents
            .remove(&(type_name.to_string(), id.clone()))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(type_name, id))
    }

    fn count(&self, type_name: &str) -> StoreResult<usize> {
        let documents = self.documents.read().map_err(|_| StoreError::poisoned())?;
        Ok(documents.keys().filter(|(t, _)| t == type_name).count())
    }
}

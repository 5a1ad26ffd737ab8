//! Type records
//!
//! A type record identifies a document type so revisions can be grouped and
//! queried per type without repeating type metadata. Records are created
//! lazily the first time a type is snapshotted, never mutated, never deleted.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{StoreError, StoreResult};
use crate::schema::{DocumentSchema, SchemaRegistry, SchemaResult};

/// Identifier of a type record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRecordId(Uuid);

impl TypeRecordId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TypeRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted record of a snapshotted document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub id: TypeRecordId,
    /// Unique key
    pub type_name: String,
    pub created_at: DateTime<Utc>,
}

impl TypeRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: TypeRecordId::generate(),
            type_name: type_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Resolves the live schema of this type.
    pub fn schema(&self, registry: &SchemaRegistry) -> SchemaResult<DocumentSchema> {
        registry.get(&self.type_name)
    }
}

impl fmt::Display for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

/// Type record persistence trait
pub trait TypeRecordStore: Send + Sync {
    /// Returns the record for a type name, creating it if needed.
    ///
    /// The flag is true when the record was created by this call.
    fn get_or_create(&self, type_name: &str) -> StoreResult<(TypeRecord, bool)>;

    fn find_by_name(&self, type_name: &str) -> StoreResult<Option<TypeRecord>>;

    fn get(&self, id: &TypeRecordId) -> StoreResult<TypeRecord>;

    fn count(&self) -> StoreResult<usize>;
}

/// In-memory type record store for testing
#[derive(Debug, Default)]
pub struct InMemoryTypeRecordStore {
    by_name: RwLock<HashMap<String, TypeRecord>>,
}

impl InMemoryTypeRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TypeRecordStore for InMemoryTypeRecordStore {
    fn get_or_create(&self, type_name: &str) -> StoreResult<(TypeRecord, bool)> {
        let mut by_name = self.by_name.write().map_err(|_| StoreError::poisoned())?;
        if let Some(record) = by_name.get(type_name) {
            return Ok((record.clone(), false));
        }
        let record = TypeRecord::new(type_name);
        by_name.insert(type_name.to_string(), record.clone());
        Ok((record, true))
    }

    fn find_by_name(&self, type_name: &str) -> StoreResult<Option<TypeRecord>> {
        let by_name = self.by_name.read().map_err(|_| StoreError::poisoned())?;
        Ok(by_name.get(type_name).cloned())
    }

    fn get(&self, id: &TypeRecordId) -> StoreResult<TypeRecord> {
        let by_name = self.by_name.read().map_err(|_| StoreError::poisoned())?;
        by_name
            .values()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("TypeRecord", id))
    }

    fn count(&self) -> StoreResult<usize> {
        let by_name = self.by_name.read().map_err(|_| StoreError::poisoned())?;
        Ok(by_name.len())
    }
}

//! Hydration - rebuilding a document as it was at a revision
//!
//! For each tracked reference field:
//! 1. A pinned revision pointer is followed and hydrated recursively
//! 2. A null pointer falls back to the live target, fetched by raw id
//! 3. A field without pointers fetches the live target(s) directly
//!
//! Scalars pass through unchanged. Missing targets surface as store errors;
//! there is no partial hydration.
//!
//! Recursion is guarded: a revision already on the active path fails with
//! `HydrationCycle`. Every revision on the path is distinct, so hydration
//! always terminates. An optional depth bound fails longer chains with
//! `HydrationDepthExceeded`.

use serde_json::Value;

use super::errors::{RevisionError, RevisionResult};
use super::revision::{Revision, RevisionId, RevisionPointer};
use super::store::RevisionStore;
use super::type_record::TypeRecordStore;
use crate::document::{Document, DocumentId, DocumentStore, FieldValue, Reference, PRIMARY_KEY_FIELD};
use crate::schema::{classify, RelatedField, SchemaRegistry};

/// Resolves revisions into hydrated documents.
pub struct Hydrator<'a> {
    schemas: &'a SchemaRegistry,
    documents: &'a dyn DocumentStore,
    revisions: &'a dyn RevisionStore,
    types: &'a dyn TypeRecordStore,
    /// `None` follows chains of any length
    max_depth: Option<usize>,
}

impl<'a> Hydrator<'a> {
    pub fn new(
        schemas: &'a SchemaRegistry,
        documents: &'a dyn DocumentStore,
        revisions: &'a dyn RevisionStore,
        types: &'a dyn TypeRecordStore,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            schemas,
            documents,
            revisions,
            types,
            max_depth,
        }
    }

    /// Hydrates a revision into a new document of its owner type.
    pub fn hydrate(&self, revision: &Revision) -> RevisionResult<Document> {
        let mut path = Vec::new();
        self.hydrate_at(revision, &mut path)
    }

    fn hydrate_at(&self, revision: &Revision, path: &mut Vec<RevisionId>) -> RevisionResult<Document> {
        if let Some(max_depth) = self.max_depth {
            if path.len() >= max_depth {
                return Err(RevisionError::HydrationDepthExceeded(max_depth));
            }
        }

        let Some(id) = revision.id() else {
            // Unpersisted revisions cannot be pointed at, so cannot loop
            return self.build(revision, path);
        };

        if path.contains(id) {
            return Err(RevisionError::HydrationCycle(id.clone()));
        }

        path.push(id.clone());
        let result = self.build(revision, path);
        path.pop();
        result
    }

    fn build(&self, revision: &Revision, path: &mut Vec<RevisionId>) -> RevisionResult<Document> {
        let record = self.types.get(revision.owner_type())?;
        let schema = record.schema(self.schemas)?;
        let references = classify(&schema);

        let mut document = Document::new(&record.type_name).with_id(revision.owner_id().clone());
        for (field, value) in revision.field_data() {
            if field == PRIMARY_KEY_FIELD {
                continue;
            }
            let resolved = match references.get(field) {
                Some(related) => self.resolve_field(revision, field, value, related, path)?,
                None => FieldValue::Value(value.clone()),
            };
            document.set(field.clone(), resolved);
        }

        Ok(document)
    }

    fn resolve_field(
        &self,
        revision: &Revision,
        field: &str,
        value: &Value,
        related: &RelatedField,
        path: &mut Vec<RevisionId>,
    ) -> RevisionResult<FieldValue> {
        if value.is_null() {
            return Ok(FieldValue::Value(Value::Null));
        }

        match (revision.related_revisions().get(field), value) {
            (Some(RevisionPointer::One(pointer)), raw) => {
                let reference = self.resolve_one(revision, field, raw, pointer.as_ref(), related, path)?;
                Ok(FieldValue::Reference(reference))
            }
            (Some(RevisionPointer::Many(pointers)), Value::Array(raw)) => {
                if pointers.len() != raw.len() {
                    return Err(RevisionError::MisalignedPointers {
                        field: field.to_string(),
                        pointers: pointers.len(),
                        ids: raw.len(),
                    });
                }
                let references = raw
                    .iter()
                    .zip(pointers)
                    .map(|(raw, pointer)| {
                        self.resolve_one(revision, field, raw, pointer.as_ref(), related, path)
                    })
                    .collect::<RevisionResult<Vec<_>>>()?;
                Ok(FieldValue::ReferenceList(references))
            }
            (Some(RevisionPointer::Many(_)), _) => Err(corrupt(
                revision,
                field,
                "list of revision pointers stored for a single identifier",
            )),
            (None, Value::Array(raw)) => {
                let references = raw
                    .iter()
                    .map(|raw| self.resolve_one(revision, field, raw, None, related, path))
                    .collect::<RevisionResult<Vec<_>>>()?;
                Ok(FieldValue::ReferenceList(references))
            }
            (None, raw) => {
                let reference = self.resolve_one(revision, field, raw, None, related, path)?;
                Ok(FieldValue::Reference(reference))
            }
        }
    }

    fn resolve_one(
        &self,
        revision: &Revision,
        field: &str,
        raw: &Value,
        pointer: Option<&RevisionId>,
        related: &RelatedField,
        path: &mut Vec<RevisionId>,
    ) -> RevisionResult<Reference> {
        let document = match pointer {
            Some(revision_id) => {
                let pinned = self.revisions.get(revision_id)?;
                self.hydrate_at(&pinned, path)?
            }
            None => {
                let id = DocumentId::from_value(raw)
                    .ok_or_else(|| corrupt(revision, field, "expected a document identifier"))?;
                self.documents.get(&related.target, &id)?
            }
        };
        Ok(Reference::Loaded(Box::new(document)))
    }
}

fn corrupt(revision: &Revision, field: &str, reason: &str) -> RevisionError {
    RevisionError::CorruptRevision {
        revision: revision
            .id()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<unsaved>".to_string()),
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

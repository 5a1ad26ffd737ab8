//! Revision manager
//!
//! Entry point for revision tracking. Wires the schema registry and the
//! three persistence collaborators together and exposes:
//! - `save_revision`: snapshot a live document, skipping no-op saves
//! - `latest_revision` / `revisions`: per-document history
//! - `diff`: field-level delta between revisions
//! - `hydrate`: rebuild a document as of a revision
//! - `revert`: overwrite the live document from a revision
//!
//! Every operation is synchronous. Save is read, compare, then conditional
//! write with no atomicity between the steps; concurrent saves of one
//! document may both write.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::config::RevisionConfig;
use super::diff::diff_revisions;
use super::errors::{RevisionError, RevisionResult};
use super::hydrate::Hydrator;
use super::revision::{Revision, RevisionId, RevisionPointer};
use super::store::{RevisionQuery, RevisionStore};
use super::type_record::TypeRecordStore;
use super::versionable::Versionable;
use crate::document::{
    Document, DocumentId, DocumentStore, FieldValue, Reference, StoreError, PRIMARY_KEY_FIELD,
};
use crate::identity::Principal;
use crate::observability::{log_event_with_fields, Event, MetricsSnapshot, RevisionMetrics};
use crate::schema::{classify, Cardinality, DocumentSchema, RelatedField, SchemaRegistry};

pub struct RevisionManager<'a> {
    schemas: &'a SchemaRegistry,
    documents: &'a dyn DocumentStore,
    revisions: &'a dyn RevisionStore,
    types: &'a dyn TypeRecordStore,
    config: RevisionConfig,
    metrics: RevisionMetrics,
}

impl<'a> RevisionManager<'a> {
    pub fn new(
        schemas: &'a SchemaRegistry,
        documents: &'a dyn DocumentStore,
        revisions: &'a dyn RevisionStore,
        types: &'a dyn TypeRecordStore,
    ) -> Self {
        Self {
            schemas,
            documents,
            revisions,
            types,
            config: RevisionConfig::default(),
            metrics: RevisionMetrics::new(),
        }
    }

    /// Replaces the default configuration.
    ///
    /// Fails with `Config` if the configuration does not validate.
    pub fn with_config(mut self, config: RevisionConfig) -> RevisionResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &RevisionConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Snapshots a live document.
    ///
    /// Returns the new revision and `true`, or the unchanged latest revision
    /// and `false` when nothing tracked differs from it.
    ///
    /// # Errors
    ///
    /// - `NotVersioned` if the document's type lacks the versioned marker;
    ///   nothing is written in that case
    /// - `Schema` if the type is not registered
    /// - `InvalidReference` if a reference field holds a non-reference value
    pub fn save_revision<P: Principal + ?Sized>(
        &self,
        author: &P,
        instance: &mut Document,
        comment: Option<&str>,
    ) -> RevisionResult<(Revision, bool)> {
        let schema = self.schemas.get(instance.type_name())?;
        if !schema.is_versioned() {
            self.metrics.increment_rejected_saves();
            self.emit(Event::RevisionRejected, &[("owner_type", instance.type_name())]);
            return Err(RevisionError::NotVersioned(instance.type_name().to_string()));
        }

        let (type_record, _) = self.types.get_or_create(&schema.type_name)?;

        if instance.id().is_none() {
            self.documents.save(instance)?;
        }
        let owner_id = instance
            .id()
            .cloned()
            .ok_or_else(|| StoreError::Internal("document store did not assign an id".into()))?;

        let (field_data, related) = self.capture_fields(&schema, instance)?;

        let mut candidate = Revision::new(author.identifier(), type_record.id.clone(), owner_id, field_data)
            .with_related_revisions(related);
        if let Some(comment) = comment {
            candidate = candidate.with_comment(comment);
        }

        if let Some(latest) = self.revisions.latest(&type_record.id, candidate.owner_id())? {
            if diff_revisions(&candidate, Some(&latest)).is_empty() {
                self.metrics.increment_noop_saves();
                self.emit_revision(Event::RevisionUnchanged, &schema.type_name, &latest);
                return Ok((latest, false));
            }
        }

        let saved = self.revisions.insert(candidate)?;
        self.metrics.increment_revisions_created();
        self.emit_revision(Event::RevisionCreated, &schema.type_name, &saved);
        Ok((saved, true))
    }

    /// Builds the stored field data and revision pointers of a document.
    fn capture_fields(
        &self,
        schema: &DocumentSchema,
        instance: &Document,
    ) -> RevisionResult<(Map<String, Value>, BTreeMap<String, RevisionPointer>)> {
        let references = classify(schema);
        let scalar_allow_list = schema.scalar_allow_list();

        let mut field_data = Map::new();
        let mut related = BTreeMap::new();

        for (name, value) in instance.fields() {
            if name.is_empty() || name == PRIMARY_KEY_FIELD {
                continue;
            }

            if let Some(field) = references.get(name) {
                let (raw, pointer) = self.capture_reference(name, value, field)?;
                field_data.insert(name.clone(), raw);
                if let Some(pointer) = pointer {
                    related.insert(name.clone(), pointer);
                }
                continue;
            }

            // Reference fields outside the related allow-list are not tracked
            if schema.kind_of(name).and_then(|k| k.target()).is_some() {
                continue;
            }

            if let Some(allowed) = &scalar_allow_list {
                if !allowed.contains(name.as_str()) {
                    continue;
                }
            }

            match value {
                FieldValue::Value(v) => {
                    field_data.insert(name.clone(), v.clone());
                }
                FieldValue::Reference(_) | FieldValue::ReferenceList(_) => {
                    return Err(RevisionError::InvalidReference {
                        field: name.clone(),
                        reason: "field is not declared as a reference".into(),
                    });
                }
            }
        }

        Ok((field_data, related))
    }

    /// Raw identifier(s) of a reference field, plus pinned revisions when
    /// the target type is versioned.
    fn capture_reference(
        &self,
        name: &str,
        value: &FieldValue,
        field: &RelatedField,
    ) -> RevisionResult<(Value, Option<RevisionPointer>)> {
        let pin = self.schemas.is_versioned(&field.target);

        match value {
            FieldValue::Value(Value::Null) => Ok((Value::Null, None)),
            FieldValue::Reference(reference) => {
                let id = reference_id(name, &field.target, reference)?;
                let pointer = if pin {
                    Some(RevisionPointer::One(self.latest_revision_id(&field.target, id)?))
                } else {
                    None
                };
                Ok((id.to_value(), pointer))
            }
            FieldValue::ReferenceList(references) => {
                let ids = references
                    .iter()
                    .map(|r| reference_id(name, &field.target, r))
                    .collect::<RevisionResult<Vec<_>>>()?;
                let pointer = if pin {
                    let pointers = ids
                        .iter()
                        .map(|id| self.latest_revision_id(&field.target, id))
                        .collect::<RevisionResult<Vec<_>>>()?;
                    Some(RevisionPointer::Many(pointers))
                } else {
                    None
                };
                Ok((Value::Array(ids.iter().map(|id| id.to_value()).collect()), pointer))
            }
            FieldValue::Value(_) => Err(RevisionError::InvalidReference {
                field: name.to_string(),
                reason: match field.cardinality {
                    Cardinality::One => "expected a document reference".into(),
                    Cardinality::Many => "expected a list of document references".into(),
                },
            }),
        }
    }

    fn latest_revision_id(&self, type_name: &str, id: &DocumentId) -> RevisionResult<Option<RevisionId>> {
        let Some(record) = self.types.find_by_name(type_name)? else {
            return Ok(None);
        };
        Ok(self
            .revisions
            .latest(&record.id, id)?
            .and_then(|r| r.id().cloned()))
    }

    /// Latest revision of a document, if any.
    pub fn latest_revision<V: Versionable + ?Sized>(&self, instance: &V) -> RevisionResult<Option<Revision>> {
        Ok(self.revisions(instance)?.latest()?)
    }

    /// Fetches a revision by id.
    pub fn revision(&self, id: &RevisionId) -> RevisionResult<Revision> {
        Ok(self.revisions.get(id)?)
    }

    /// Lazy query over a document's revisions, newest first.
    pub fn revisions<V: Versionable + ?Sized>(&self, instance: &V) -> RevisionResult<RevisionQuery<'a>> {
        let owner = match (self.types.find_by_name(instance.type_name())?, instance.document_id()) {
            (Some(record), Some(id)) => Some((record.id, id.clone())),
            _ => None,
        };
        Ok(RevisionQuery::new(self.revisions, owner))
    }

    /// Whether the document's type currently carries the versioned marker.
    pub fn is_versioned<V: Versionable + ?Sized>(&self, instance: &V) -> bool {
        self.schemas.is_versioned(instance.type_name())
    }

    /// Fields of `revision` that differ from `other`.
    ///
    /// Without `other`, compares against the latest revision of the same
    /// document; with no revisions at all, every field is reported.
    pub fn diff(&self, revision: &Revision, other: Option<&Revision>) -> RevisionResult<Map<String, Value>> {
        if other.is_some() {
            return Ok(diff_revisions(revision, other));
        }
        let latest = self.revisions.latest(revision.owner_type(), revision.owner_id())?;
        Ok(diff_revisions(revision, latest.as_ref()))
    }

    /// Rebuilds the document as it was at `revision`.
    pub fn hydrate(&self, revision: &Revision) -> RevisionResult<Document> {
        self.metrics.increment_hydrations();
        let hydrator = Hydrator::new(
            self.schemas,
            self.documents,
            self.revisions,
            self.types,
            self.config.max_hydration_depth,
        );
        hydrator.hydrate(revision).inspect_err(|e| {
            let reason = e.to_string();
            self.emit(
                Event::HydrationFailed,
                &[("owner_id", revision.owner_id().as_str()), ("reason", reason.as_str())],
            );
        })
    }

    /// Overwrites the live document with its state at `revision`.
    ///
    /// Live fields outside the type's allow-lists are kept. No revision is
    /// created; call `save_revision` afterwards to record the revert.
    pub fn revert(&self, revision: &Revision) -> RevisionResult<Document> {
        let mut document = self.hydrate(revision)?;

        let schema = self.types.get(revision.owner_type())?.schema(self.schemas)?;
        let references = classify(&schema);

        match self.documents.get(&schema.type_name, revision.owner_id()) {
            Ok(live) => {
                for (name, value) in live.fields() {
                    let tracked = references.contains_key(name) || schema.tracks_scalar(name);
                    if !tracked && document.get(name).is_none() {
                        document.set(name.clone(), value.clone());
                    }
                }
            }
            // A deleted live document is recreated
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        self.documents.save(&mut document)?;
        self.metrics.increment_reverts();
        self.emit_revision(Event::DocumentReverted, &schema.type_name, revision);
        Ok(document)
    }

    fn emit(&self, event: Event, fields: &[(&str, &str)]) {
        if self.config.log_events {
            log_event_with_fields(event, fields);
        }
    }

    fn emit_revision(&self, event: Event, type_name: &str, revision: &Revision) {
        if !self.config.log_events {
            return;
        }
        let revision_id = revision.id().map(ToString::to_string).unwrap_or_default();
        log_event_with_fields(
            event,
            &[
                ("author_id", revision.author_id().as_str()),
                ("owner_id", revision.owner_id().as_str()),
                ("owner_type", type_name),
                ("revision_id", revision_id.as_str()),
            ],
        );
    }
}

/// Identifier of a referenced document. Loaded documents must be of the
/// field's target type.
fn reference_id<'r>(
    field: &str,
    target: &str,
    reference: &'r Reference,
) -> RevisionResult<&'r DocumentId> {
    if let Some(document) = reference.document() {
        if document.type_name() != target {
            return Err(RevisionError::InvalidReference {
                field: field.to_string(),
                reason: format!("expected a '{}' document, got '{}'", target, document.type_name()),
            });
        }
    }
    reference
        .id()
        .ok_or_else(|| StoreError::UnsavedReference { field: field.to_string() }.into())
}

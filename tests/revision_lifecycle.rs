//! Revision Lifecycle Tests
//!
//! Save, diff and query behavior of the revision manager:
//! - Unchanged saves are no-ops
//! - Diffs report exactly the changed fields
//! - Scalar documents survive a hydration round trip
//! - Unversioned types are rejected without side effects
//! - Latest is decided by timestamp

use chrono::{Duration, Utc};
use docrev::document::{Document, DocumentStore, InMemoryDocumentStore};
use docrev::identity::User;
use docrev::revision::{
    InMemoryRevisionStore, InMemoryTypeRecordStore, Revision, RevisionConfig, RevisionError,
    RevisionManager, RevisionStore, TypeRecordStore,
};
use docrev::schema::{DocumentSchema, FieldKind, SchemaRegistry, VersioningOptions};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

struct Harness {
    schemas: SchemaRegistry,
    documents: InMemoryDocumentStore,
    revisions: InMemoryRevisionStore,
    types: InMemoryTypeRecordStore,
}

impl Harness {
    fn new() -> Self {
        let schemas = SchemaRegistry::new();
        schemas
            .register(
                DocumentSchema::new("Post")
                    .field("title", FieldKind::Scalar)
                    .field("body", FieldKind::Scalar)
                    .field("views", FieldKind::Scalar)
                    .field("meta", FieldKind::Map)
                    .versioned(VersioningOptions::all()),
            )
            .unwrap();
        schemas
            .register(DocumentSchema::new("Note").field("text", FieldKind::Scalar))
            .unwrap();

        Self {
            schemas,
            documents: InMemoryDocumentStore::new(),
            revisions: InMemoryRevisionStore::new(),
            types: InMemoryTypeRecordStore::new(),
        }
    }

    fn manager(&self) -> RevisionManager<'_> {
        RevisionManager::new(&self.schemas, &self.documents, &self.revisions, &self.types)
            .with_config(RevisionConfig::quiet())
            .unwrap()
    }
}

fn editor() -> User {
    User::new("u-editor", "editor")
}

fn post(title: &str, body: &str) -> Document {
    Document::new("Post").with("title", title).with("body", body).with("views", 0i64)
}

// =============================================================================
// No-op Idempotence Tests
// =============================================================================

/// Saving an unchanged document twice returns the same revision.
#[test]
fn test_unchanged_save_is_noop() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("Hello", "World");

    let (first, created_first) = manager.save_revision(&editor(), &mut doc, None).unwrap();
    let (second, created_second) = manager.save_revision(&editor(), &mut doc, None).unwrap();

    assert!(created_first);
    assert!(!created_second);
    assert_eq!(first.id(), second.id());
    assert_eq!(h.revisions.len(), 1);
}

/// A different comment alone does not make a new revision.
#[test]
fn test_comment_change_is_noop() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("Hello", "World");

    manager.save_revision(&editor(), &mut doc, Some("first")).unwrap();
    let (_, created) = manager
        .save_revision(&editor(), &mut doc, Some("second"))
        .unwrap();

    assert!(!created);
}

/// Unsaved documents are persisted before being snapshotted.
#[test]
fn test_save_assigns_primary_key() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("Hello", "World");
    assert!(doc.id().is_none());

    let (revision, _) = manager.save_revision(&editor(), &mut doc, None).unwrap();

    let id = doc.id().cloned().unwrap();
    assert_eq!(revision.owner_id(), &id);
    assert_eq!(revision.field_data().get("id"), Some(&id.to_value()));
    assert_eq!(h.documents.count("Post").unwrap(), 1);
}

/// Only one type record exists per type, however many saves.
#[test]
fn test_type_record_created_once() {
    let h = Harness::new();
    let manager = h.manager();

    for i in 0..3 {
        let mut doc = post(&format!("Post {}", i), "body");
        manager.save_revision(&editor(), &mut doc, None).unwrap();
    }

    assert_eq!(h.types.count().unwrap(), 1);
}

// =============================================================================
// Diff Tests
// =============================================================================

/// Changing one field yields a diff of exactly that field.
#[test]
fn test_diff_single_field() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("Draft", "Same body");

    let (before, _) = manager.save_revision(&editor(), &mut doc, None).unwrap();
    doc.set("title", "Final");
    let (after, created) = manager.save_revision(&editor(), &mut doc, None).unwrap();

    assert!(created);
    let diff = manager.diff(&after, Some(&before)).unwrap();
    assert_eq!(Value::Object(diff), json!({"title": "Final"}));
}

/// Without a second revision the diff is against the owner's latest.
#[test]
fn test_diff_defaults_to_latest() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("A", "B");

    let (first, _) = manager.save_revision(&editor(), &mut doc, None).unwrap();
    doc.set("body", "C");
    manager.save_revision(&editor(), &mut doc, None).unwrap();

    let diff = manager.diff(&first, None).unwrap();
    assert_eq!(Value::Object(diff), json!({"body": "B"}));
}

/// With no revisions to compare against, every field is reported.
#[test]
fn test_diff_without_history_reports_all_fields() {
    let h = Harness::new();
    let manager = h.manager();
    let (record, _) = h.types.get_or_create("Post").unwrap();

    let mut data = Map::new();
    data.insert("title".into(), json!("Only"));
    let candidate = Revision::new(editor_id(), record.id, "p-unsaved".into(), data);

    let diff = manager.diff(&candidate, None).unwrap();
    assert_eq!(diff.len(), 2);
    assert_eq!(diff.get("title"), Some(&json!("Only")));
}

fn editor_id() -> docrev::identity::AuthorId {
    docrev::identity::AuthorId::new("u-editor")
}

// =============================================================================
// Hydration Round Trip Tests
// =============================================================================

/// Scalar fields come back unchanged after hydration.
#[test]
fn test_scalar_round_trip() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("Title", "Body")
        .with("views", 42i64)
        .with("meta", json!({"lang": "en", "tags": ["a", "b"]}));

    let (revision, _) = manager.save_revision(&editor(), &mut doc, None).unwrap();
    let hydrated = manager.hydrate(&revision).unwrap();

    assert_eq!(hydrated.type_name(), "Post");
    assert_eq!(hydrated.id(), doc.id());
    assert_eq!(hydrated.fields(), doc.fields());
}

/// Hydration reflects the revision, not the live document.
#[test]
fn test_hydration_ignores_later_live_changes() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("Original", "Body");

    let (revision, _) = manager.save_revision(&editor(), &mut doc, None).unwrap();
    doc.set("title", "Edited");
    h.documents.save(&mut doc).unwrap();

    let hydrated = manager.hydrate(&revision).unwrap();
    assert_eq!(hydrated.value("title"), Some(&json!("Original")));
}

// =============================================================================
// Unversioned Rejection Tests
// =============================================================================

/// Unversioned types are rejected and nothing is written.
#[test]
fn test_unversioned_rejection_has_no_side_effects() {
    let h = Harness::new();
    let manager = h.manager();
    let mut note = Document::new("Note").with("text", "hi");

    let err = manager.save_revision(&editor(), &mut note, None).unwrap_err();

    assert!(matches!(err, RevisionError::NotVersioned(ref t) if t == "Note"));
    assert!(note.id().is_none());
    assert_eq!(h.types.count().unwrap(), 0);
    assert_eq!(h.documents.count("Note").unwrap(), 0);
    assert!(h.revisions.is_empty());
    assert_eq!(manager.metrics().rejected_saves, 1);
}

/// The versioned marker can be toggled at runtime.
#[test]
fn test_versioned_marker_toggle() {
    let h = Harness::new();
    let manager = h.manager();
    let mut note = Document::new("Note").with("text", "hi");
    assert!(!manager.is_versioned(&note));

    h.schemas.set_versioned("Note", true).unwrap();
    assert!(manager.is_versioned(&note));
    let (_, created) = manager.save_revision(&editor(), &mut note, None).unwrap();
    assert!(created);

    h.schemas.set_versioned("Note", false).unwrap();
    note.set("text", "changed");
    assert!(matches!(
        manager.save_revision(&editor(), &mut note, None),
        Err(RevisionError::NotVersioned(_))
    ));
}

// =============================================================================
// Ordering Tests
// =============================================================================

/// Latest is the revision with the greatest timestamp, not the last insert.
#[test]
fn test_latest_by_timestamp() {
    let h = Harness::new();
    let manager = h.manager();
    let mut doc = post("T", "B");
    h.documents.save(&mut doc).unwrap();
    let owner_id = doc.id().cloned().unwrap();
    let (record, _) = h.types.get_or_create("Post").unwrap();

    let t1 = Utc::now() - Duration::minutes(30);
    let t2 = t1 + Duration::minutes(10);
    let t3 = t2 + Duration::minutes(10);

    let snapshot = |title: &str, at| {
        let mut data = Map::new();
        data.insert("title".into(), json!(title));
        Revision::new(editor_id(), record.id.clone(), owner_id.clone(), data).with_created_at(at)
    };

    h.revisions.insert(snapshot("two", t2)).unwrap();
    let third = h.revisions.insert(snapshot("three", t3)).unwrap();
    h.revisions.insert(snapshot("one", t1)).unwrap();

    let latest = manager.latest_revision(&doc).unwrap().unwrap();
    assert_eq!(latest, third);

    let titles: Vec<Value> = manager
        .revisions(&doc)
        .unwrap()
        .all()
        .unwrap()
        .iter()
        .map(|r| r.field_data()["title"].clone())
        .collect();
    assert_eq!(titles, vec![json!("three"), json!("two"), json!("one")]);
}

/// A document that was never snapshotted has no revisions.
#[test]
fn test_no_revisions_for_new_document() {
    let h = Harness::new();
    let manager = h.manager();
    let doc = post("T", "B");

    assert!(manager.latest_revision(&doc).unwrap().is_none());
    assert!(manager.revisions(&doc).unwrap().is_empty().unwrap());
}

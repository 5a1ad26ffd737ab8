//! Revision - immutable document snapshot
//!
//! A revision records the tracked field values of one live document at a
//! point in time:
//! - Scalars are stored as is
//! - Reference fields store raw identifiers, never nested data
//! - Reference fields whose target type is versioned additionally store a
//!   pointer to the target's latest revision at save time
//!
//! Fields are private; a revision never changes after the store assigns
//! its identifier.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::type_record::TypeRecordId;
use crate::document::{DocumentId, PRIMARY_KEY_FIELD};
use crate::identity::{AuthorId, PrincipalDirectory};

/// Identifier of a persisted revision
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(Uuid);

impl RevisionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pinned revision(s) of the documents a reference field points at.
///
/// `None` entries record that the target had no revision at save time.
/// List pointers are positionally aligned with the field's identifier list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RevisionPointer {
    One(Option<RevisionId>),
    Many(Vec<Option<RevisionId>>),
}

/// One immutable snapshot of a live document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RevisionId>,
    author_id: AuthorId,
    created_at: DateTime<Utc>,
    field_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    related_revisions: BTreeMap<String, RevisionPointer>,
    owner_type: TypeRecordId,
    owner_id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl Revision {
    /// Creates an unpersisted revision timestamped now.
    ///
    /// The owner's primary key is always written under the reserved key.
    pub fn new(
        author_id: AuthorId,
        owner_type: TypeRecordId,
        owner_id: DocumentId,
        mut field_data: Map<String, Value>,
    ) -> Self {
        field_data.insert(PRIMARY_KEY_FIELD.to_string(), owner_id.to_value());
        Self {
            id: None,
            author_id,
            created_at: Utc::now(),
            field_data,
            related_revisions: BTreeMap::new(),
            owner_type,
            owner_id,
            comment: None,
        }
    }

    pub fn with_related_revisions(mut self, related: BTreeMap<String, RevisionPointer>) -> Self {
        self.related_revisions = related;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Marks the revision as persisted under `id`.
    ///
    /// Intended for [`RevisionStore`](super::RevisionStore) implementations.
    pub fn persisted(mut self, id: RevisionId) -> Self {
        self.id = Some(id);
        self
    }

    #[inline]
    pub fn id(&self) -> Option<&RevisionId> {
        self.id.as_ref()
    }

    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    #[inline]
    pub fn author_id(&self) -> &AuthorId {
        &self.author_id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn field_data(&self) -> &Map<String, Value> {
        &self.field_data
    }

    #[inline]
    pub fn related_revisions(&self) -> &BTreeMap<String, RevisionPointer> {
        &self.related_revisions
    }

    #[inline]
    pub fn owner_type(&self) -> &TypeRecordId {
        &self.owner_type
    }

    #[inline]
    pub fn owner_id(&self) -> &DocumentId {
        &self.owner_id
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Resolves the author for display.
    ///
    /// A deleted or unknown principal yields `None`, never an error.
    pub fn author<D: PrincipalDirectory>(&self, directory: &D) -> Option<D::Principal> {
        directory.lookup(&self.author_id).ok()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Revision author={}, time={}, owner={}, comment={}>",
            self.author_id,
            self.created_at.to_rfc3339(),
            self.owner_id,
            self.comment.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{InMemoryUserDirectory, User};
    use serde_json::json;

    fn sample() -> Revision {
        let mut data = Map::new();
        data.insert("title".into(), json!("Hello"));
        Revision::new(
            AuthorId::new("u1"),
            TypeRecordId::generate(),
            DocumentId::new("a1"),
            data,
        )
    }

    #[test]
    fn test_primary_key_always_present() {
        let revision = sample();
        assert_eq!(revision.field_data().get("id"), Some(&json!("a1")));
        assert!(!revision.is_persisted());
    }

    #[test]
    fn test_primary_key_overrides_caller_data() {
        let mut data = Map::new();
        data.insert("id".into(), Value::Null);
        let revision = Revision::new(
            AuthorId::new("u1"),
            TypeRecordId::generate(),
            DocumentId::new("a1"),
            data,
        );
        assert_eq!(revision.field_data().get("id"), Some(&json!("a1")));
    }

    #[test]
    fn test_pointer_serde_shapes() {
        let one: RevisionPointer = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(one, RevisionPointer::One(None));

        let id = RevisionId::generate();
        let many = RevisionPointer::Many(vec![Some(id.clone()), None]);
        let encoded = serde_json::to_value(&many).unwrap();
        assert_eq!(encoded, json!([id.to_string(), null]));
        assert_eq!(serde_json::from_value::<RevisionPointer>(encoded).unwrap(), many);
    }

    #[test]
    fn test_author_lookup_is_soft() {
        let directory = InMemoryUserDirectory::new();
        let revision = sample();
        assert!(revision.author(&directory).is_none());

        directory.insert(User::new("u1", "ann")).unwrap();
        assert_eq!(revision.author(&directory).map(|u| u.username), Some("ann".to_string()));
    }

    #[test]
    fn test_display() {
        let revision = sample().with_comment("first");
        let display = revision.to_string();
        assert!(display.contains("author=u1"));
        assert!(display.contains("comment=first"));
    }
}

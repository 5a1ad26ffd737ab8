//! Live document instances
//!
//! A document is a typed bag of fields. Reference fields hold either a stored
//! foreign key (`Reference::Link`) or a resolved nested instance
//! (`Reference::Loaded`). The store always persists links; hydration produces
//! loaded references.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};

/// Reserved field name under which revisions record the owner's primary key.
pub const PRIMARY_KEY_FIELD: &str = "id";

/// Opaque primary key of a live document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// JSON representation used inside revision field data.
    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }

    /// Reads an identifier back out of revision field data.
    ///
    /// Only JSON strings are identifiers; anything else yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(Self::new)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A reference from one document to another.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Foreign key only; the target type comes from the owner's schema.
    Link(DocumentId),
    /// A resolved nested instance.
    Loaded(Box<Document>),
}

impl Reference {
    /// Identifier of the referenced document, if it has one.
    pub fn id(&self) -> Option<&DocumentId> {
        match self {
            Reference::Link(id) => Some(id),
            Reference::Loaded(doc) => doc.id(),
        }
    }

    /// The nested instance, when resolved.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Reference::Link(_) => None,
            Reference::Loaded(doc) => Some(doc),
        }
    }

    fn detached(&self, field: &str) -> StoreResult<Reference> {
        self.id()
            .cloned()
            .map(Reference::Link)
            .ok_or_else(|| StoreError::UnsavedReference {
                field: field.to_string(),
            })
    }
}

impl From<Document> for Reference {
    fn from(doc: Document) -> Self {
        Reference::Loaded(Box::new(doc))
    }
}

impl From<DocumentId> for Reference {
    fn from(id: DocumentId) -> Self {
        Reference::Link(id)
    }
}

/// The value held by one document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar or unstructured data, stored as is.
    Value(Value),
    /// Single reference to another document.
    Reference(Reference),
    /// Ordered list of references.
    ReferenceList(Vec<Reference>),
}

impl FieldValue {
    /// The plain JSON value, if this is not a reference field.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            FieldValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_reference_list(&self) -> Option<&[Reference]> {
        match self {
            FieldValue::ReferenceList(refs) => Some(refs),
            _ => None,
        }
    }

    /// A reference field explicitly set to nothing.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Value(Value::Null))
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Value(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Value(Value::from(v))
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Value(Value::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Value(Value::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Value(Value::from(v))
    }
}

impl From<Reference> for FieldValue {
    fn from(r: Reference) -> Self {
        FieldValue::Reference(r)
    }
}

impl From<Document> for FieldValue {
    fn from(doc: Document) -> Self {
        FieldValue::Reference(doc.into())
    }
}

impl From<Vec<Document>> for FieldValue {
    fn from(docs: Vec<Document>) -> Self {
        FieldValue::ReferenceList(docs.into_iter().map(Reference::from).collect())
    }
}

impl From<Vec<Reference>> for FieldValue {
    fn from(refs: Vec<Reference>) -> Self {
        FieldValue::ReferenceList(refs)
    }
}

/// A live document instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    type_name: String,
    id: Option<DocumentId>,
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Creates an unsaved, empty document of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Builder: sets the primary key.
    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: sets a field.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }

    #[inline]
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Shortcut for scalar fields.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_value)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Copy of this document with every nested instance replaced by its link.
    ///
    /// Fails if a nested instance has never been saved.
    pub fn detached(&self) -> StoreResult<Document> {
        let mut fields = BTreeMap::new();
        for (name, value) in &self.fields {
            let stored = match value {
                FieldValue::Value(v) => FieldValue::Value(v.clone()),
                FieldValue::Reference(r) => FieldValue::Reference(r.detached(name)?),
                FieldValue::ReferenceList(refs) => FieldValue::ReferenceList(
                    refs.iter()
                        .map(|r| r.detached(name))
                        .collect::<StoreResult<Vec<_>>>()?,
                ),
            };
            fields.insert(name.clone(), stored);
        }
        Ok(Document {
            type_name: self.type_name.clone(),
            id: self.id.clone(),
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_fields() {
        let doc = Document::new("Article")
            .with_id("a1")
            .with("title", "Hello")
            .with("views", 3i64);

        assert_eq!(doc.type_name(), "Article");
        assert_eq!(doc.id(), Some(&DocumentId::new("a1")));
        assert_eq!(doc.value("title"), Some(&json!("Hello")));
        assert_eq!(doc.value("views"), Some(&json!(3)));
    }

    #[test]
    fn test_detached_replaces_nested_with_links() {
        let author = Document::new("Author").with_id("au1").with("name", "Ann");
        let tag = Document::new("Tag").with_id("t1");
        let doc = Document::new("Article")
            .with_id("a1")
            .with("author", author)
            .with("tags", vec![tag]);

        let stored = doc.detached().unwrap();
        assert_eq!(
            stored.get("author"),
            Some(&FieldValue::Reference(Reference::Link("au1".into())))
        );
        assert_eq!(
            stored.get("tags"),
            Some(&FieldValue::ReferenceList(vec![Reference::Link("t1".into())]))
        );
    }

    #[test]
    fn test_detached_rejects_unsaved_nested() {
        let doc = Document::new("Article").with("author", Document::new("Author"));
        let err = doc.detached().unwrap_err();
        assert_eq!(
            err,
            StoreError::UnsavedReference {
                field: "author".into()
            }
        );
    }

    #[test]
    fn test_document_id_value_conversion() {
        let id = DocumentId::new("x");
        assert_eq!(id.to_value(), json!("x"));
        assert_eq!(DocumentId::from_value(&json!("x")), Some(id));
        assert_eq!(DocumentId::from_value(&json!(5)), None);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }
}

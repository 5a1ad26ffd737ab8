//! Schema type definitions
//!
//! A document schema is an explicit field-kind table built once per type.
//! Field kinds:
//! - scalar: any plain JSON value, tracked as is
//! - map: unstructured nested data, tracked as is, never a reference
//! - reference: foreign key to one document of the target type
//! - reference_list: ordered foreign keys to documents of the target type

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::document::PRIMARY_KEY_FIELD;

/// Kind of a single schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain JSON value
    Scalar,
    /// Unstructured nested map
    Map,
    /// Single reference to another document type
    Reference {
        /// Target document type name
        target: String,
    },
    /// List of references to another document type
    ReferenceList {
        /// Target document type name
        target: String,
    },
}

impl FieldKind {
    pub fn reference(target: impl Into<String>) -> Self {
        FieldKind::Reference {
            target: target.into(),
        }
    }

    pub fn reference_list(target: impl Into<String>) -> Self {
        FieldKind::ReferenceList {
            target: target.into(),
        }
    }

    /// Target type for reference kinds.
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldKind::Reference { target } | FieldKind::ReferenceList { target } => Some(target),
            FieldKind::Scalar | FieldKind::Map => None,
        }
    }

    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Map => "map",
            FieldKind::Reference { .. } => "reference",
            FieldKind::ReferenceList { .. } => "reference_list",
        }
    }
}

/// Opt-in revision tracking for a document type.
///
/// An allow-list of `None` tracks every field of that category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersioningOptions {
    /// Whether snapshots may be taken of this type
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Non-reference fields to track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioned_fields: Option<Vec<String>>,
    /// Reference fields to track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioned_related: Option<Vec<String>>,
}

fn default_enabled() -> bool {
    true
}

impl VersioningOptions {
    /// Tracks every field.
    pub fn all() -> Self {
        Self {
            enabled: true,
            versioned_fields: None,
            versioned_related: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versioned_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_related<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versioned_related = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Complete schema of one document type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSchema {
    /// Registered type name, unique per registry
    pub type_name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field kinds by name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldKind>,
    /// Revision tracking options; absent means not versioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versioning: Option<VersioningOptions>,
}

impl DocumentSchema {
    /// Create an unversioned schema with no fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: None,
            fields: BTreeMap::new(),
            versioning: None,
        }
    }

    /// Builder: declares a field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// Builder: opts the type into revision tracking.
    pub fn versioned(mut self, options: VersioningOptions) -> Self {
        self.versioning = Some(options);
        self
    }

    pub fn kind_of(&self, field: &str) -> Option<&FieldKind> {
        self.fields.get(field)
    }

    /// Whether the versioned marker is present and enabled.
    pub fn is_versioned(&self) -> bool {
        self.versioning.as_ref().is_some_and(|v| v.enabled)
    }

    /// Allow-list of non-reference fields, as a set.
    ///
    /// `None` means every field is tracked.
    pub fn scalar_allow_list(&self) -> Option<HashSet<&str>> {
        self.versioning
            .as_ref()
            .and_then(|v| v.versioned_fields.as_ref())
            .map(|fields| fields.iter().map(String::as_str).collect())
    }

    /// Allow-list of reference fields, as a set.
    pub fn related_allow_list(&self) -> Option<HashSet<&str>> {
        self.versioning
            .as_ref()
            .and_then(|v| v.versioned_related.as_ref())
            .map(|fields| fields.iter().map(String::as_str).collect())
    }

    /// Whether a non-reference field is captured in snapshots.
    ///
    /// Fields not declared in the schema are treated as scalars.
    pub fn tracks_scalar(&self, field: &str) -> bool {
        if matches!(
            self.kind_of(field),
            Some(FieldKind::Reference { .. } | FieldKind::ReferenceList { .. })
        ) {
            return false;
        }
        match self.versioning.as_ref().and_then(|v| v.versioned_fields.as_ref()) {
            Some(allowed) => allowed.iter().any(|f| f == field),
            None => true,
        }
    }

    /// Validates the schema structure itself (not a document)
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.type_name.trim().is_empty() {
            return Err("type name must not be empty".into());
        }

        if self.fields.contains_key(PRIMARY_KEY_FIELD) {
            return Err(format!(
                "field name '{}' is reserved for the primary key",
                PRIMARY_KEY_FIELD
            ));
        }

        for (name, kind) in &self.fields {
            if kind.target().is_some_and(|t| t.trim().is_empty()) {
                return Err(format!("{} field '{}' has no target type", kind.kind_name(), name));
            }
        }

        if let Some(related) = self.versioning.as_ref().and_then(|v| v.versioned_related.as_ref()) {
            for name in related {
                if self.kind_of(name).and_then(FieldKind::target).is_none() {
                    return Err(format!("versioned related field '{}' is not a reference", name));
                }
            }
        }

        Ok(())
    }
}

//! Field classifier
//!
//! Produces the lookup from field name to related target type for every
//! tracked reference field of a schema. Pure function of the schema, computed
//! fresh for each save or hydration.

use std::collections::BTreeMap;

use super::types::{DocumentSchema, FieldKind};

/// How many documents a reference field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// A tracked reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedField {
    /// Target document type name
    pub target: String,
    pub cardinality: Cardinality,
}

/// Field name to related field, reference fields only.
pub type ReferenceMap = BTreeMap<String, RelatedField>;

/// Classifies the reference fields of a schema.
///
/// Scalar and map fields are excluded. When the schema carries a
/// `versioned_related` allow-list, reference fields outside it are excluded
/// as well.
pub fn classify(schema: &DocumentSchema) -> ReferenceMap {
    let allowed = schema.related_allow_list();
    let mut references = ReferenceMap::new();

    for (name, kind) in &schema.fields {
        let (target, cardinality) = match kind {
            FieldKind::Reference { target } => (target, Cardinality::One),
            FieldKind::ReferenceList { target } => (target, Cardinality::Many),
            FieldKind::Scalar | FieldKind::Map => continue,
        };

        if let Some(allowed) = &allowed {
            if !allowed.contains(name.as_str()) {
                continue;
            }
        }

        references.insert(
            name.clone(),
            RelatedField {
                target: target.clone(),
                cardinality,
            },
        );
    }

    references
}

//! Schema subsystem
//!
//! Explicit per-type field-kind tables replace runtime reflection over
//! document classes.
//!
//! # Components
//!
//! - [`DocumentSchema`]: field kinds plus the opt-in versioning options
//! - [`SchemaRegistry`]: type name to schema, constructed once
//! - [`classify`]: reference fields of a schema, computed per operation

mod classifier;
mod errors;
mod registry;
mod types;

pub use classifier::{classify, Cardinality, ReferenceMap, RelatedField};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use registry::SchemaRegistry;
pub use types::{DocumentSchema, FieldKind, VersioningOptions};

//! Revision tracking
//!
//! Point-in-time snapshots of versioned documents.
//!
//! # Components
//!
//! - [`TypeRecord`]: persisted identity of a snapshotted document type
//! - [`Revision`]: immutable snapshot of one document's tracked fields
//! - [`RevisionStore`]: insert-only revision persistence
//! - [`diff_revisions`]: field-level delta between revisions
//! - [`Hydrator`]: rebuilds documents from revisions, following pinned
//!   references
//! - [`RevisionManager`]: save, query, diff, hydrate and revert
//!
//! A reference to a versioned type is pinned to the target's latest
//! revision at save time. Hydration follows that pin, so a related document
//! comes back as it was when the referencing snapshot was taken.

mod config;
mod diff;
mod errors;
mod hydrate;
mod manager;
mod revision;
mod store;
mod type_record;
mod versionable;

pub use config::RevisionConfig;
pub use diff::diff_revisions;
pub use errors::{RevisionError, RevisionResult};
pub use hydrate::Hydrator;
pub use manager::RevisionManager;
pub use revision::{Revision, RevisionId, RevisionPointer};
pub use store::{InMemoryRevisionStore, RevisionQuery, RevisionStore};
pub use type_record::{InMemoryTypeRecordStore, TypeRecord, TypeRecordId, TypeRecordStore};
pub use versionable::Versionable;

//! # Revision Store
//!
//! Persistence for revisions. Revisions are insert-only; the store assigns
//! identifiers and answers per-owner queries newest first.

use std::sync::RwLock;

use super::revision::{Revision, RevisionId};
use super::type_record::TypeRecordId;
use crate::document::{DocumentId, StoreError, StoreResult};

/// Revision persistence trait
pub trait RevisionStore: Send + Sync {
    /// Persist a new revision and return it with its assigned id.
    ///
    /// Revisions that already carry an id are rejected as immutable.
    fn insert(&self, revision: Revision) -> StoreResult<Revision>;

    fn get(&self, id: &RevisionId) -> StoreResult<Revision>;

    /// All revisions of one owner, newest first.
    ///
    /// Ordered by `created_at`; equal timestamps keep the later insert first.
    fn filter(&self, owner_type: &TypeRecordId, owner_id: &DocumentId) -> StoreResult<Vec<Revision>>;

    fn count(&self, owner_type: &TypeRecordId, owner_id: &DocumentId) -> StoreResult<usize> {
        Ok(self.filter(owner_type, owner_id)?.len())
    }

    fn latest(&self, owner_type: &TypeRecordId, owner_id: &DocumentId) -> StoreResult<Option<Revision>> {
        Ok(self.filter(owner_type, owner_id)?.into_iter().next())
    }
}

/// In-memory revision store for testing
#[derive(Debug, Default)]
pub struct InMemoryRevisionStore {
    /// Insertion order is the tie-breaker for equal timestamps
    revisions: RwLock<Vec<Revision>>,
}

impl InMemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total revisions across all owners.
    pub fn len(&self) -> usize {
        self.revisions.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RevisionStore for InMemoryRevisionStore {
    fn insert(&self, revision: Revision) -> StoreResult<Revision> {
        if let Some(id) = revision.id() {
            return Err(StoreError::Immutable(id.to_string()));
        }
        let stored = revision.persisted(RevisionId::generate());
        let mut revisions = self.revisions.write().map_err(|_| StoreError::poisoned())?;
        revisions.push(stored.clone());
        Ok(stored)
    }

    fn get(&self, id: &RevisionId) -> StoreResult<Revision> {
        let revisions = self.revisions.read().map_err(|_| StoreError::poisoned())?;
        revisions
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found("Revision", id))
    }

    fn filter(&self, owner_type: &TypeRecordId, owner_id: &DocumentId) -> StoreResult<Vec<Revision>> {
        let revisions = self.revisions.read().map_err(|_| StoreError::poisoned())?;
        let mut matching: Vec<(usize, &Revision)> = revisions
            .iter()
            .enumerate()
            .filter(|(_, r)| r.owner_type() == owner_type && r.owner_id() == owner_id)
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| ib.cmp(ia))
        });
        Ok(matching.into_iter().map(|(_, r)| r.clone()).collect())
    }
}

/// Lazy query over the revisions of one document.
///
/// Nothing is read until a method is called. Documents that were never
/// saved, or whose type was never snapshotted, have no revisions.
pub struct RevisionQuery<'a> {
    store: &'a dyn RevisionStore,
    owner: Option<(TypeRecordId, DocumentId)>,
}

impl<'a> RevisionQuery<'a> {
    pub(crate) fn new(store: &'a dyn RevisionStore, owner: Option<(TypeRecordId, DocumentId)>) -> Self {
        Self { store, owner }
    }

    /// All revisions, newest first.
    pub fn all(&self) -> StoreResult<Vec<Revision>> {
        match &self.owner {
            Some((owner_type, owner_id)) => self.store.filter(owner_type, owner_id),
            None => Ok(Vec::new()),
        }
    }

    pub fn latest(&self) -> StoreResult<Option<Revision>> {
        match &self.owner {
            Some((owner_type, owner_id)) => self.store.latest(owner_type, owner_id),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> StoreResult<usize> {
        match &self.owner {
            Some((owner_type, owner_id)) => self.store.count(owner_type, owner_id),
            None => Ok(0),
        }
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.count()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AuthorId;
    use chrono::{Duration, Utc};
    use serde_json::Map;

    fn revision(owner_type: &TypeRecordId, owner: &str) -> Revision {
        Revision::new(
            AuthorId::new("u1"),
            owner_type.clone(),
            DocumentId::new(owner),
            Map::new(),
        )
    }

    #[test]
    fn test_insert_assigns_id() {
        let store = InMemoryRevisionStore::new();
        let owner_type = TypeRecordId::generate();

        let saved = store.insert(revision(&owner_type, "a1")).unwrap();
        let id = saved.id().cloned().unwrap();
        assert_eq!(store.get(&id).unwrap(), saved);
    }

    #[test]
    fn test_persisted_revision_is_immutable() {
        let store = InMemoryRevisionStore::new();
        let owner_type = TypeRecordId::generate();
        let saved = store.insert(revision(&owner_type, "a1")).unwrap();

        let err = store.insert(saved).unwrap_err();
        assert!(matches!(err, StoreError::Immutable(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_filter_newest_first_per_owner() {
        let store = InMemoryRevisionStore::new();
        let owner_type = TypeRecordId::generate();
        let base = Utc::now();

        let old = store
            .insert(revision(&owner_type, "a1").with_created_at(base))
            .unwrap();
        let new = store
            .insert(revision(&owner_type, "a1").with_created_at(base + Duration::seconds(5)))
            .unwrap();
        store.insert(revision(&owner_type, "a2")).unwrap();

        let listed = store.filter(&owner_type, &DocumentId::new("a1")).unwrap();
        assert_eq!(listed, vec![new.clone(), old]);
        assert_eq!(store.latest(&owner_type, &"a1".into()).unwrap(), Some(new));
        assert_eq!(store.count(&owner_type, &"a2".into()).unwrap(), 1);
    }

    #[test]
    fn test_equal_timestamps_later_insert_wins() {
        let store = InMemoryRevisionStore::new();
        let owner_type = TypeRecordId::generate();
        let at = Utc::now();

        store.insert(revision(&owner_type, "a1").with_created_at(at)).unwrap();
        let second = store.insert(revision(&owner_type, "a1").with_created_at(at)).unwrap();

        assert_eq!(store.latest(&owner_type, &"a1".into()).unwrap(), Some(second));
    }

    #[test]
    fn test_query_without_owner_is_empty() {
        let store = InMemoryRevisionStore::new();
        let query = RevisionQuery::new(&store, None);

        assert!(query.all().unwrap().is_empty());
        assert!(query.latest().unwrap().is_none());
        assert!(query.is_empty().unwrap());
    }
}

//! Revision metrics
//!
//! Counters only, monotonic, reset only when the registry is recreated.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for one revision manager
#[derive(Debug, Default)]
pub struct RevisionMetrics {
    revisions_created: AtomicU64,
    noop_saves: AtomicU64,
    rejected_saves: AtomicU64,
    hydrations: AtomicU64,
    reverts: AtomicU64,
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub revisions_created: u64,
    pub noop_saves: u64,
    pub rejected_saves: u64,
    pub hydrations: u64,
    pub reverts: u64,
}

impl RevisionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_revisions_created(&self) {
        self.revisions_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_noop_saves(&self) {
        self.noop_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_saves(&self) {
        self.rejected_saves.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts top-level hydrations, not nested ones
    pub fn increment_hydrations(&self) {
        self.hydrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reverts(&self) {
        self.reverts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            revisions_created: self.revisions_created.load(Ordering::Relaxed),
            noop_saves: self.noop_saves.load(Ordering::Relaxed),
            rejected_saves: self.rejected_saves.load(Ordering::Relaxed),
            hydrations: self.hydrations.load(Ordering::Relaxed),
            reverts: self.reverts.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = RevisionMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increments() {
        let metrics = RevisionMetrics::new();
        metrics.increment_revisions_created();
        metrics.increment_revisions_created();
        metrics.increment_noop_saves();
        metrics.increment_reverts();

        let snap = metrics.snapshot();
        assert_eq!(snap.revisions_created, 2);
        assert_eq!(snap.noop_saves, 1);
        assert_eq!(snap.reverts, 1);
        assert_eq!(snap.hydrations, 0);
        assert_eq!(snap.rejected_saves, 0);
    }
}

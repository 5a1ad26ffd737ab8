//! Field-level diff between two revisions of the same document.
//!
//! Comparison is on the stored representation: identifiers, not hydrated
//! documents. Keys present only in the baseline are not reported.

use serde_json::{Map, Value};

use super::revision::Revision;

/// Fields of `revision` whose stored value differs from `baseline`.
///
/// Without a baseline every field of `revision` is reported.
pub fn diff_revisions(revision: &Revision, baseline: Option<&Revision>) -> Map<String, Value> {
    let Some(baseline) = baseline else {
        return revision.field_data().clone();
    };

    revision
        .field_data()
        .iter()
        .filter(|(key, value)| baseline.field_data().get(key.as_str()) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

//! Observable revision-tracking events

use std::fmt;

/// Events emitted by the revision subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,
    /// Schema directory loaded
    SchemasLoaded,
    /// A new revision was persisted
    RevisionCreated,
    /// Save found no difference from the latest revision
    RevisionUnchanged,
    /// Save refused for an unversioned type
    RevisionRejected,
    /// A live document was overwritten from a revision
    DocumentReverted,
    /// Hydration aborted
    HydrationFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::RevisionCreated => "REVISION_CREATED",
            Event::RevisionUnchanged => "REVISION_UNCHANGED",
            Event::RevisionRejected => "REVISION_REJECTED",
            Event::DocumentReverted => "DOCUMENT_REVERTED",
            Event::HydrationFailed => "HYDRATION_FAILED",
        }
    }

    /// Whether the event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::RevisionRejected | Event::HydrationFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

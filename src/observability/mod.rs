//! Observability for revision tracking
//!
//! - Structured JSON line logging
//! - Typed lifecycle events
//! - Counter metrics
//!
//! Observability never affects the outcome of an operation.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, RevisionMetrics};

fn severity_for(event: Event) -> Severity {
    if event.is_failure() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

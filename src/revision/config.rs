//! Revision manager configuration
//!
//! Read from JSON or built in code, immutable once the manager is constructed.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{RevisionError, RevisionResult};
use crate::observability::{log_event_with_fields, Event};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevisionConfig {
    /// Emit structured log lines for saves, reverts and hydration failures.
    pub log_events: bool,

    /// Optional bound on the chain of related revisions followed by one
    /// hydration. Unbounded by default; the cycle guard already ends every
    /// hydration.
    ///
    /// When set, must be at least 1.
    pub max_hydration_depth: Option<usize>,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            log_events: true,
            max_hydration_depth: None,
        }
    }
}

impl RevisionConfig {
    /// Configuration with logging turned off.
    pub fn quiet() -> Self {
        Self {
            log_events: false,
            ..Self::default()
        }
    }

    /// Parse from a JSON document. Missing keys take their defaults.
    pub fn from_json_str(content: &str) -> RevisionResult<Self> {
        let config: RevisionConfig = serde_json::from_str(content)
            .map_err(|e| RevisionError::Config(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> RevisionResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RevisionError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&content)?;
        if config.log_events {
            let path_name = path.display().to_string();
            log_event_with_fields(Event::ConfigLoaded, &[("path", path_name.as_str())]);
        }
        Ok(config)
    }

    pub fn validate(&self) -> RevisionResult<()> {
        if self.max_hydration_depth == Some(0) {
            return Err(RevisionError::Config(
                "max_hydration_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

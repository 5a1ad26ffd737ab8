//! Schema registry
//!
//! Maps registered type names to their field-kind tables. Constructed once
//! and passed by reference to the components that need it; there is no
//! global registry and no teardown.
//!
//! Schemas may be registered programmatically or loaded from a directory
//! holding one `<type_name>.json` file per type.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::errors::{SchemaError, SchemaResult};
use super::types::{DocumentSchema, VersioningOptions};
use crate::observability::{Event, Logger, Severity};

/// Registry of document schemas keyed by type name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, DocumentSchema>>,
    /// Suppresses the `SCHEMAS_LOADED` log line
    quiet: bool,
}

fn poisoned() -> SchemaError {
    SchemaError::io("<registry>", "lock poisoned")
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that never logs.
    ///
    /// Pairs with `RevisionConfig::quiet`; the registry does not read the
    /// revision configuration.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// Registers a schema.
    ///
    /// A type name may only be registered once.
    pub fn register(&self, schema: DocumentSchema) -> SchemaResult<()> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::invalid(&schema.type_name, e))?;

        let mut schemas = self.schemas.write().map_err(|_| poisoned())?;
        if schemas.contains_key(&schema.type_name) {
            return Err(SchemaError::already_registered(&schema.type_name));
        }
        schemas.insert(schema.type_name.clone(), schema);
        Ok(())
    }

    /// Gets a copy of the schema for a type.
    pub fn get(&self, type_name: &str) -> SchemaResult<DocumentSchema> {
        let schemas = self.schemas.read().map_err(|_| poisoned())?;
        schemas
            .get(type_name)
            .cloned()
            .ok_or_else(|| SchemaError::unknown_type(type_name))
    }

    /// Checks if a type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas
            .read()
            .map(|s| s.contains_key(type_name))
            .unwrap_or(false)
    }

    /// Whether the type is registered and carries an enabled versioned marker.
    pub fn is_versioned(&self, type_name: &str) -> bool {
        self.schemas
            .read()
            .map(|s| s.get(type_name).is_some_and(DocumentSchema::is_versioned))
            .unwrap_or(false)
    }

    /// Toggles the versioned marker at runtime.
    ///
    /// Enabling a type that never declared versioning tracks every field.
    pub fn set_versioned(&self, type_name: &str, enabled: bool) -> SchemaResult<()> {
        let mut schemas = self.schemas.write().map_err(|_| poisoned())?;
        let schema = schemas
            .get_mut(type_name)
            .ok_or_else(|| SchemaError::unknown_type(type_name))?;

        match schema.versioning.as_mut() {
            Some(options) => options.enabled = enabled,
            None if enabled => schema.versioning = Some(VersioningOptions::all()),
            None => {}
        }
        Ok(())
    }

    /// Returns all registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads every `*.json` schema file in a directory.
    ///
    /// Returns the number of schemas loaded. A missing directory loads nothing.
    pub fn load_dir(&self, dir: &Path) -> SchemaResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::io(dir.display().to_string(), format!("Failed to read directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::io(dir.display().to_string(), format!("Failed to read entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // Deterministic load order
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }

        self.log_loaded(paths.len(), dir, &mut io::stdout());
        Ok(paths.len())
    }

    fn log_loaded<W: Write>(&self, count: usize, dir: &Path, writer: &mut W) {
        if self.quiet {
            return;
        }
        let count = count.to_string();
        let dir_name = dir.display().to_string();
        Logger::log_to_writer(
            Severity::Info,
            Event::SchemasLoaded.as_str(),
            &[("count", count.as_str()), ("dir", dir_name.as_str())],
            writer,
        );
    }

    fn load_file(&self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::io(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        let schema: DocumentSchema = serde_json::from_str(&content).map_err(|e| {
            SchemaError::io(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        self.register(schema)
    }

    /// Writes a schema to `<dir>/<type_name>.json`.
    ///
    /// Existing files are never overwritten.
    pub fn save_schema(dir: &Path, schema: &DocumentSchema) -> SchemaResult<PathBuf> {
        schema
            .validate_structure()
            .map_err(|e| SchemaError::invalid(&schema.type_name, e))?;

        let path = dir.join(format!("{}.json", schema.type_name));
        if path.exists() {
            return Err(SchemaError::already_registered(&schema.type_name));
        }

        fs::create_dir_all(dir).map_err(|e| {
            SchemaError::io(dir.display().to_string(), format!("Failed to create directory: {}", e))
        })?;

        let content = serde_json::to_string_pretty(schema).map_err(|e| {
            SchemaError::io(path.display().to_string(), format!("Failed to serialize: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            SchemaError::io(path.display().to_string(), format!("Failed to write file: {}", e))
        })?;

        Ok(path)
    }
}

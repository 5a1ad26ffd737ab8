//! Schema error types
//!
//! Error codes:
//! - REV_UNKNOWN_TYPE
//! - REV_SCHEMA_INVALID
//! - REV_SCHEMA_EXISTS
//! - REV_SCHEMA_IO

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// No schema registered under the type name
    RevUnknownType,
    /// Schema definition is structurally invalid
    RevSchemaInvalid,
    /// A schema with the same type name is already registered
    RevSchemaExists,
    /// Schema file could not be read, parsed or written
    RevSchemaIo,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::RevUnknownType => "REV_UNKNOWN_TYPE",
            SchemaErrorCode::RevSchemaInvalid => "REV_SCHEMA_INVALID",
            SchemaErrorCode::RevSchemaExists => "REV_SCHEMA_EXISTS",
            SchemaErrorCode::RevSchemaIo => "REV_SCHEMA_IO",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    type_name: Option<String>,
}

impl SchemaError {
    /// Create an unknown type error
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::RevUnknownType,
            message: format!("No schema registered for type '{}'", name),
            type_name: Some(name),
        }
    }

    /// Create an invalid schema error
    pub fn invalid(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::RevSchemaInvalid,
            message: format!("Schema '{}' is invalid: {}", name, reason.into()),
            type_name: Some(name),
        }
    }

    /// Create a duplicate registration error
    pub fn already_registered(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::RevSchemaExists,
            message: format!("Schema '{}' is already registered", name),
            type_name: Some(name),
        }
    }

    /// Create an error for an unreadable or malformed schema file
    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::RevSchemaIo,
            message: format!("Schema file '{}': {}", path.into(), reason.into()),
            type_name: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

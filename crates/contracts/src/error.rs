//! Layered error definitions
//!
//! Categorized by source: config / schema / registration / source / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum CoreError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Option key not in the plugin's declared allow-list
    #[error("plugin '{plugin}' does not accept option '{key}'")]
    UnknownConfigKey { plugin: String, key: String },

    // ===== Identifier Errors =====
    /// Identifier exceeds the fixed length bound
    #[error("identifier '{field}' is {len} bytes, limit is {max}")]
    NameTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    // ===== Schema Errors =====
    /// Dispatch referenced a type absent from the schema catalog
    #[error("no data set registered for type '{type_name}'")]
    SchemaNotFound { type_name: String },

    /// Value count does not match the schema
    #[error("type '{type_name}' expects {expected} values, got {actual}")]
    SchemaMismatch {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    // ===== Registration Errors =====
    /// Duplicate schema name, or conflicting capability registration
    #[error("registration conflict for '{name}': {message}")]
    RegistrationConflict { name: String, message: String },

    // ===== Source / Sink Errors =====
    /// Read callback failure
    #[error("source '{plugin}' read error: {message}")]
    SourceRead { plugin: String, message: String },

    /// Write subscriber failure
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== Lifecycle Errors =====
    /// Illegal lifecycle transition
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create registration conflict error
    pub fn registration_conflict(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegistrationConflict {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create source read error
    pub fn source_read(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceRead {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

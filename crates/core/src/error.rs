//! Error types shared by every layer of the engine
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//! Three families live here:
//! - [`ConfigError`]: rejects a single configuration-set call
//! - [`SchemaError`]: rejects an index definition at creation time
//! - [`IndexingFailure`]: per-document, per-field failure recorded by an index
//!   and never returned to the writer

use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while reading or changing runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The option name is not recognized
    #[error("Invalid option: {0}")]
    UnknownOption(String),

    /// The option value failed validation
    #[error("Invalid value for {option}: {reason}")]
    InvalidValue {
        /// Option name as given by the caller
        option: String,
        /// Human readable reason
        reason: String,
    },

    /// The configuration file could not be read or parsed
    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    /// Build an `InvalidValue` error
    pub fn invalid(option: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while compiling an index definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The schema declares no fields
    #[error("Fields arguments are missing")]
    NoFields,

    /// Two fields resolve to the same name
    #[error("Duplicate field in schema - {0}")]
    DuplicateField(String),

    /// A JSON path failed to parse
    #[error("Invalid JSONPath '{path}': {reason}")]
    InvalidPath {
        /// Path as written
        path: String,
        /// Parser message
        reason: String,
    },

    /// A modifier does not apply to the field type
    #[error("Invalid field option {option} for field {field}")]
    InvalidOption {
        /// Field name
        field: String,
        /// Modifier name
        option: &'static str,
    },
}

/// Why a single field of a document could not be indexed
///
/// The document keeps its other valid fields; the owning index counts the
/// failure once per document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexingFailure {
    /// Value of an unsupported JSON type under a TEXT/TAG/NUMERIC field
    #[error("Invalid JSON type: {field} expected {expected}, got {actual}")]
    InvalidType {
        /// Field name in the schema
        field: String,
        /// Type the field expects
        expected: &'static str,
        /// JSON type encountered
        actual: &'static str,
    },

    /// Array found where only scalars are allowed
    #[error("Invalid JSON type: {field} does not accept nested arrays")]
    NestedArray {
        /// Field name in the schema
        field: String,
    },

    /// Array reached through a definite path on a field that does not index arrays
    #[error("Invalid JSON type: {field} does not accept an array value")]
    ArrayNotAllowed {
        /// Field name in the schema
        field: String,
    },

    /// Hash value that cannot be parsed as a number
    #[error("Invalid numeric value '{value}' for field {field}")]
    NotNumeric {
        /// Field name in the schema
        field: String,
        /// Raw value
        value: String,
    },
}

impl IndexingFailure {
    /// Schema field the failure refers to
    pub fn field(&self) -> &str {
        match self {
            IndexingFailure::InvalidType { field, .. }
            | IndexingFailure::NestedArray { field }
            | IndexingFailure::ArrayNotAllowed { field }
            | IndexingFailure::NotNumeric { field, .. } => field,
        }
    }
}

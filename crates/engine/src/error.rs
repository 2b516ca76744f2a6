//! Engine error type
//!
//! Wraps the lower layers' errors and adds the index lifecycle and keyspace
//! failures that only the engine can detect.

use sieve_core::{ConfigError, SchemaError};
use sieve_search::QueryError;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No index with that name (or it expired)
    #[error("Unknown index name")]
    IndexNotFound(String),

    /// CREATE on a name that is taken
    #[error("Index already exists")]
    IndexExists(String),

    /// Key holds a document of the other kind
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType {
        /// Key
        key: String,
        /// Kind stored under the key
        actual: &'static str,
    },

    /// Malformed request argument
    #[error("{0}")]
    InvalidArgument(String),

    /// Schema rejected at creation
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Query failed to parse, validate, or evaluate
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration change rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A background thread could not be started
    #[error("background worker failed: {0}")]
    Background(String),
}

impl Error {
    /// Build an `InvalidArgument` error
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

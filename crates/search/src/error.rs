//! Query error taxonomy
//!
//! Every variant is fatal to the single query that raised it. Messages are
//! surfaced verbatim to the caller.

use sieve_storage::StorageError;
use thiserror::Error;

/// Result type alias for query operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Errors raised while parsing, validating, or evaluating a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query string is malformed
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax {
        /// Byte offset of the problem
        offset: usize,
        /// What went wrong
        message: String,
    },

    /// Slop or inorder requested over a field without a stable element order
    #[error("field '{field}' has undefined ordering and cannot be used with slop/inorder")]
    UndefinedOrdering {
        /// Offending field
        field: String,
    },

    /// A prefix/suffix/contains pattern is shorter than MINPREFIX
    #[error("Pattern '{pattern}' is shorter than the minimum prefix length {min}")]
    PrefixTooShort {
        /// Pattern as written
        pattern: String,
        /// Configured minimum
        min: usize,
    },

    /// SCORER names an unregistered scorer
    #[error("Unknown scorer '{0}'")]
    UnknownScorer(String),

    /// The query deadline passed
    #[error("Timeout limit was reached")]
    Timeout,

    /// A pattern expanded to more than MAXEXPANSIONS terms
    #[error("Max prefix expansions limit was reached ({limit})")]
    ExpansionLimit {
        /// Configured bound
        limit: usize,
    },

    /// A field named by the query is not in the schema
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// A field is used with an operator its type does not support
    #[error("Field '{field}' is not a {expected} field")]
    WrongFieldType {
        /// Field name
        field: String,
        /// Type the operator requires
        expected: &'static str,
    },
}

impl QueryError {
    /// Build a syntax error
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        QueryError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

impl From<StorageError> for QueryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ExpansionLimit { limit, .. } => QueryError::ExpansionLimit { limit },
            StorageError::Timeout => QueryError::Timeout,
            StorageError::PrefixTooShort { pattern, min } => QueryError::PrefixTooShort { pattern, min },
        }
    }
}

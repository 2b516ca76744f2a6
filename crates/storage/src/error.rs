//! Error types for term expansion
//!
//! Expansion errors are fatal to a single query. The query layer decides
//! whether an [`StorageError::ExpansionLimit`] truncates or fails, using the
//! partial term list carried by the error.

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors raised by the term store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The pattern expands to more than MAXEXPANSIONS terms
    #[error("Max prefix expansions limit was reached ({limit})")]
    ExpansionLimit {
        /// Configured bound
        limit: usize,
        /// The first `limit` terms found
        partial: Vec<String>,
    },

    /// The query deadline passed during expansion
    #[error("Timeout limit was reached")]
    Timeout,

    /// The pattern's literal span is shorter than MINPREFIX
    #[error("Pattern '{pattern}' is shorter than the minimum prefix length {min}")]
    PrefixTooShort {
        /// Pattern as written
        pattern: String,
        /// Configured minimum
        min: usize,
    },
}

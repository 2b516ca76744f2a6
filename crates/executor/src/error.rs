//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Verbatim**: The display message is the one the engine produced

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | Not Found | `IndexNotFound` |
/// | State | `IndexExists`, `WrongType` |
/// | Validation | `InvalidInput`, `Schema`, `Config` |
/// | Query | `Syntax`, `UndefinedOrdering`, `QueryLimit`, `Query` |
/// | System | `Internal` |
///
/// # Example
///
/// ```ignore
/// match executor.execute(cmd) {
///     Ok(output) => { /* handle success */ }
///     Err(Error::IndexNotFound { index }) => {
///         println!("no index '{}'", index);
///     }
///     Err(e) => println!("{}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// Index missing or expired
    #[error("Unknown index name")]
    IndexNotFound { index: String },

    // ==================== State Errors ====================
    /// Index name already taken
    #[error("Index already exists")]
    IndexExists { index: String },

    /// Key holds the other document kind
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType { key: String, actual: String },

    // ==================== Validation Errors ====================
    /// Malformed argument
    #[error("{reason}")]
    InvalidInput { reason: String },

    /// Schema rejected
    #[error("{reason}")]
    Schema { reason: String },

    /// Configuration change rejected
    #[error("{reason}")]
    Config { reason: String },

    // ==================== Query Errors ====================
    /// Query string does not parse
    #[error("{reason}")]
    Syntax { reason: String },

    /// Slop or inorder over a field without a stable element order
    #[error("{reason}")]
    UndefinedOrdering { field: String, reason: String },

    /// TIMEOUT or MAXEXPANSIONS hit under ON_TIMEOUT FAIL
    #[error("{reason}")]
    QueryLimit { reason: String },

    /// Any other query failure
    #[error("{reason}")]
    Query { reason: String },

    // ==================== System Errors ====================
    /// Internal error (background worker failure)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

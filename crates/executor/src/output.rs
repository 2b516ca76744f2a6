//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant. This mapping is
//! deterministic: the same command always produces the same variant.

use serde::{Deserialize, Serialize};
use sieve_engine::{AggregateResponse, GcStats, IndexInfo, SearchResponse};

/// Successful command execution results.
///
/// ```ignore
/// match executor.execute(Command::DebugTtl { index: "idx".into() })? {
///     Output::Int(-1) => println!("permanent"),
///     Output::Int(secs) => println!("{}s left", secs),
///     _ => unreachable!("DebugTtl always returns Int"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    // ==================== Primitive Results ====================
    /// No return value
    Unit,

    /// Boolean result
    Bool(bool),

    /// Signed integer result
    Int(i64),

    /// Unsigned integer result (for count operations)
    Uint(u64),

    /// `(option, value)` pairs
    ConfigPairs(Vec<(String, String)>),

    // ==================== Query Results ====================
    /// Search results
    SearchResults(SearchResponse),

    /// Aggregation rows
    AggregateResults(AggregateResponse),

    // ==================== Introspection ====================
    /// Index description
    IndexInfo(IndexInfo),

    /// GC statistics after a forced cycle
    GcStats(GcStats),

    /// Ping response
    Pong {
        /// Crate version
        version: String,
    },
}

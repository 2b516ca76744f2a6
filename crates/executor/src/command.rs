//! Command enum defining every Sieve operation.
//!
//! Commands are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Can be converted to/from JSON for cross-language use
//! - **Typed**: No generic fallback, every operation has explicit types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sieve_core::IndexDefinition;
use sieve_engine::{AggregateRequest, SearchRequest};

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Commands |
/// |----------|----------|
/// | Index | `CreateIndex`, `DropIndex`, `Info` |
/// | Query | `Search`, `Aggregate` |
/// | Debug | `DebugTtl`, `DebugGcForceInvoke` |
/// | Config | `ConfigGet`, `ConfigSet` |
/// | Document | `HSet`, `JsonSet`, `Del`, `Expire`, `Persist` |
/// | Connection | `Ping` |
///
/// # Example
///
/// ```ignore
/// use sieve_executor::Command;
/// use sieve_engine::SearchRequest;
///
/// let cmd = Command::Search {
///     index: "idx".into(),
///     request: SearchRequest::new("hello").limit(0, 5),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Index ====================
    /// Create an index and index existing matching keys.
    /// Returns: `Output::Unit`
    CreateIndex { definition: IndexDefinition },

    /// Remove an index; documents stay.
    /// Returns: `Output::Unit`
    DropIndex { index: String },

    /// Describe an index.
    /// Returns: `Output::IndexInfo`
    Info { index: String },

    // ==================== Query ====================
    /// Full-text search.
    /// Returns: `Output::SearchResults`
    Search { index: String, request: SearchRequest },

    /// Aggregation pipeline.
    /// Returns: `Output::AggregateResults`
    Aggregate { index: String, request: AggregateRequest },

    // ==================== Debug ====================
    /// Remaining idle seconds of a temporary index, `-1` otherwise.
    /// Returns: `Output::Int`
    DebugTtl { index: String },

    /// Run one GC cycle now.
    /// Returns: `Output::GcStats`
    DebugGcForceInvoke { index: String },

    // ==================== Config ====================
    /// Read one option or `*`.
    /// Returns: `Output::ConfigPairs`
    ConfigGet { option: String },

    /// Validate and apply one option.
    /// Returns: `Output::Unit`
    ConfigSet { option: String, value: String },

    // ==================== Document ====================
    /// Set hash fields.
    /// Returns: `Output::Uint` (fields added)
    HSet {
        key: String,
        fields: Vec<(String, String)>,
    },

    /// Replace a JSON document at the root path.
    /// Returns: `Output::Unit`
    JsonSet {
        key: String,
        #[serde(default = "root_path")]
        path: String,
        value: Value,
    },

    /// Delete a key.
    /// Returns: `Output::Bool` (true if the key existed)
    Del { key: String },

    /// Set a key's TTL in seconds; `0` deletes it.
    /// Returns: `Output::Bool` (true if the key exists)
    Expire { key: String, seconds: u64 },

    /// Remove a key's TTL.
    /// Returns: `Output::Bool` (true if a TTL was removed)
    Persist { key: String },

    // ==================== Connection ====================
    /// Liveness check.
    /// Returns: `Output::Pong`
    Ping,
}

fn root_path() -> String {
    "$".to_string()
}

impl Command {
    /// Command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateIndex { .. } => "FT.CREATE",
            Command::DropIndex { .. } => "FT.DROPINDEX",
            Command::Info { .. } => "FT.INFO",
            Command::Search { .. } => "FT.SEARCH",
            Command::Aggregate { .. } => "FT.AGGREGATE",
            Command::DebugTtl { .. } => "FT.DEBUG TTL",
            Command::DebugGcForceInvoke { .. } => "FT.DEBUG GC_FORCEINVOKE",
            Command::ConfigGet { .. } => "FT.CONFIG GET",
            Command::ConfigSet { .. } => "FT.CONFIG SET",
            Command::HSet { .. } => "HSET",
            Command::JsonSet { .. } => "JSON.SET",
            Command::Del { .. } => "DEL",
            Command::Expire { .. } => "EXPIRE",
            Command::Persist { .. } => "PERSIST",
            Command::Ping => "PING",
        }
    }
}

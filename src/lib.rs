//! Sieve - embedded full-text search over hash and JSON documents
//!
//! Sieve keeps a keyspace of hash and JSON documents and maintains secondary
//! indexes over them: TEXT fields with positional postings, TAG fields, and
//! NUMERIC ranges. Indexes follow every write, answer boolean/proximity/pattern
//! queries, and reclaim deleted documents with a background garbage collector.
//!
//! # Quick Start
//!
//! ```ignore
//! use sieve::{Engine, FieldSpec, IndexDefinition, SearchConfig, SearchRequest, StorageModel};
//!
//! let engine = Engine::new(SearchConfig::default())?;
//! engine.create_index(
//!     IndexDefinition::new("idx", StorageModel::Json)
//!         .field(FieldSpec::text("$.category").alias("category")),
//! )?;
//! engine.json_set("doc:1", "$", serde_json::json!({"category": ["logic", "database"]}))?;
//!
//! let response = engine.search("idx", &SearchRequest::new("@category:(database)"))?;
//! assert_eq!(response.keys(), vec!["doc:1"]);
//! ```
//!
//! # Architecture
//!
//! The [`Engine`] is the typed entry point. The [`Executor`] wraps it with a
//! serializable [`Command`]/[`Output`] surface. Internal layers (term storage,
//! query evaluation, garbage collection) are not exposed.

// Re-export the public API from sieve-executor
pub use sieve_executor::*;

//! # Sieve Executor
//!
//! The command surface of Sieve, an embedded full-text search engine for
//! hash and JSON documents.
//!
//! This crate provides:
//! - [`Command`]/[`Output`] - the serializable instruction set and its results
//! - [`Error`] - a flat, serializable error enum with verbatim messages
//! - [`Executor`] - the dispatcher that runs commands against an [`Engine`]
//!
//! ## Quick Start
//!
//! ```text
//! use sieve_executor::{Command, Engine, Executor, SearchRequest};
//!
//! let executor = Executor::new(Arc::new(Engine::builder().open()?));
//! executor.execute(Command::HSet { key: "doc:1".into(), fields: vec![("title".into(), "hello".into())] })?;
//! let output = executor.execute(Command::Search { index: "idx".into(), request: SearchRequest::new("hello") })?;
//! ```

#![warn(missing_docs)]

mod command;
mod convert;
mod error;
mod executor;
mod output;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;

// Re-export request/response types so users don't need sieve-engine directly
pub use sieve_engine::{
    AggregateRequest, AggregateResponse, Engine, EngineBuilder, GcStats, GroupBy, IndexInfo, Reducer,
    ReducerSpec, ReturnField, SearchHit, SearchRequest, SearchResponse,
};

// Re-export schema and configuration types
pub use sieve_core::{FieldSpec, IndexDefinition, SearchConfig, StorageModel};
pub use sieve_search::{SortOrder, DEFAULT_STOPWORDS};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;

//! Core types for Sieve
//!
//! This crate defines the foundational types used throughout the system:
//! - Budget: per-query deadline and expansion limits
//! - Config: process-wide runtime options published as immutable snapshots
//! - Schema: index definitions, field types, and compiled schemas
//! - Document: backing records and per-field value resolution
//! - JSON paths: parsing, definiteness, and resolution
//! - Errors: configuration, schema, and per-document indexing failures

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod budget;
pub mod config;
pub mod document;
pub mod error;
pub mod json;
pub mod schema;
pub mod types;

pub use budget::QueryBudget;
pub use config::{ConfigRegistry, GcPolicy, SearchConfig, TimeoutPolicy};
pub use document::{resolve_field, Document, FieldValues, ResolvedField, SortKey};
pub use error::{ConfigError, ConfigResult, IndexingFailure, SchemaError};
pub use json::{JsonPath, PathParseError, PathSegment};
pub use schema::{
    FieldSource, FieldSpec, FieldType, IndexDefinition, IndexSchema, SchemaField, StorageModel,
};
pub use types::{DocId, FieldIndex, Position};

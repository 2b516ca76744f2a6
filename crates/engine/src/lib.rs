//! Index engine for Sieve
//!
//! This crate orchestrates the lower layers:
//! - Index: schema, ingestion into the term store and posting lists, GC
//! - IndexRegistry: name lookup and idle TTL for temporary indexes
//! - Keyspace: in-memory document store that notifies indexes of changes
//! - Search and aggregate execution against one index snapshot
//! - Background GC workers and the expiry sweeper
//! - Engine: the facade the executor dispatches commands to
//!
//! The engine is the only component that knows how documents, indexes, and
//! configuration snapshots meet.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod index;
pub mod keyspace;
mod project;
pub mod registry;
pub mod scheduler;
pub mod search;
pub mod sweeper;

pub use aggregate::{AggregateRequest, AggregateResponse, GroupBy, Reducer, ReducerSpec, Row};
pub use engine::{Engine, EngineBuilder};
pub use error::{Error, Result};
pub use index::{FieldInfo, GcMode, GcRun, GcStats, Index, IndexInfo, IndexReader};
pub use keyspace::{DocumentSource, Keyspace, KeyspaceListener};
pub use registry::IndexRegistry;
pub use scheduler::{BackpressureError, GcScheduler, SchedulerStats, Submitted};
pub use search::{ReturnField, SearchHit, SearchRequest, SearchResponse, DEFAULT_LIMIT};
pub use sweeper::{SweepReport, Sweeper};

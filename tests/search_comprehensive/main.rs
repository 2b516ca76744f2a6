//! Search Comprehensive Test Suite
//!
//! End-to-end behaviour of the engine through its public API.
//!
//! ## Test Module Structure
//!
//! - **multi_value**: offset delta, slop and inorder across array elements
//! - **undefined_ordering**: slop/inorder rejection over flattened paths
//! - **indexing_failures**: per-document failure counting, null handling
//! - **sorting**: first-element sort keys, SORTABLE parity
//! - **wildcard**: prefix/suffix/contains expansion, suffix trie parity, limits
//! - **expiry**: index idle TTL, key TTL, garbage collection
//! - **config**: option validation and snapshot semantics
//! - **concurrency**: readers never see torn documents
//! - **properties**: property-based invariants
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test search_comprehensive
//! cargo test --test search_comprehensive wildcard
//! ```

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod config;
mod expiry;
mod indexing_failures;
mod multi_value;
mod properties;
mod sorting;
mod undefined_ordering;
mod wildcard;

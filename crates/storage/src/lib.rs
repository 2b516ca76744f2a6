//! Storage layer for Sieve indexes
//!
//! This crate implements the in-memory structures an index is built from:
//! - RadixTrie: compressed-edge trie with ordered and guided walks
//! - TermStore: term trie with optional suffix trie and bounded expansion
//! - WildcardPattern: three-state glob matcher used to prune trie walks
//! - PostingStore: copy-on-write posting lists with compare-and-swap publish
//! - NumericIndex: ordered `(value, doc)` pairs for range queries
//! - DocTable: doc id allocation and versioned snapshot visibility
//! - TTL index for key expiration
//!
//! # Concurrency
//!
//! Posting lists live in a `DashMap` of `Arc`s, so readers never block on
//! writers of other terms. The term trie and numeric index are plain data;
//! the engine guards them with `parking_lot::RwLock`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod doc_table;
pub mod error;
pub mod numeric;
pub mod posting;
pub mod suffix;
pub mod term_store;
pub mod trie;
pub mod ttl;
pub mod wildcard;

pub use doc_table::{DocMeta, DocSnapshot, DocTable};
pub use error::{StorageError, StorageResult};
pub use numeric::{NumBound, NumKey, NumericIndex};
pub use posting::{Posting, PostingList, PostingStore, Publish};
pub use suffix::SuffixTrie;
pub use term_store::{TermPattern, TermStore};
pub use trie::{Guide, RadixTrie, Visit};
pub use ttl::TTLIndex;
pub use wildcard::{MatchState, WildcardPattern};

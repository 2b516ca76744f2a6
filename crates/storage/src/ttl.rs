//! TTL (Time-To-Live) index for efficient expiration cleanup
//!
//! This module provides TTLIndex that enables efficient queries for expired keys
//! without scanning the entire keyspace:
//! - Maps expiry instant → Set<key> using BTreeMap for sorted order
//! - find_expired() returns all keys expired at a given instant
//! - O(expired count) instead of O(total data)

use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::time::Instant;

/// TTL index: expiry instant → keys
///
/// Uses BTreeMap for sorted ordering, allowing efficient range queries
/// for all keys expired before a given instant.
#[derive(Debug, Default)]
pub struct TTLIndex {
    index: BTreeMap<Instant, FxHashSet<String>>,
}

impl TTLIndex {
    /// Create a new empty TTLIndex
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
        }
    }

    /// Add key to TTL index with given expiry
    pub fn insert(&mut self, expires_at: Instant, key: impl Into<String>) {
        self.index.entry(expires_at).or_default().insert(key.into());
    }

    /// Remove key from TTL index at given expiry
    ///
    /// Used when a key is deleted, persisted, or given a new TTL.
    /// If the set becomes empty, removes the instant entry entirely.
    pub fn remove(&mut self, expires_at: Instant, key: &str) {
        if let Some(keys) = self.index.get_mut(&expires_at) {
            keys.remove(key);
            if keys.is_empty() {
                self.index.remove(&expires_at);
            }
        }
    }

    /// Find all keys whose expiry is at or before `now`
    pub fn find_expired(&self, now: Instant) -> Vec<String> {
        self.index
            .range(..=now)
            .flat_map(|(_, keys)| keys.iter().cloned())
            .collect()
    }

    /// Remove and return every key expired at `now`
    pub fn drain_expired(&mut self, now: Instant) -> Vec<String> {
        let expired: Vec<Instant> = self.index.range(..=now).map(|(at, _)| *at).collect();
        let mut keys = Vec::new();
        for at in expired {
            if let Some(set) = self.index.remove(&at) {
                keys.extend(set);
            }
        }
        keys
    }

    /// Earliest pending expiry
    pub fn next_expiry(&self) -> Option<Instant> {
        self.index.keys().next().copied()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Get the total number of keys in the index
    pub fn len(&self) -> usize {
        self.index.values().map(|keys| keys.len()).sum()
    }
}

//! Name → index map with lazy idle expiry
//!
//! The registry is also the keyspace listener: every write or delete is
//! routed to the indexes whose prefixes cover the key, using the
//! configuration snapshot current at that moment.

use crate::error::{Error, Result};
use crate::index::Index;
use crate::keyspace::{DocumentSource, KeyspaceListener};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sieve_core::{ConfigRegistry, Document, IndexDefinition, SearchConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// All live indexes
#[derive(Debug)]
pub struct IndexRegistry {
    indexes: DashMap<String, Arc<Index>>,
    config: Arc<ConfigRegistry>,
}

impl IndexRegistry {
    /// Create an empty registry reading options from `config`
    pub fn new(config: Arc<ConfigRegistry>) -> Self {
        IndexRegistry {
            indexes: DashMap::new(),
            config,
        }
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<SearchConfig> {
        self.config.snapshot()
    }

    /// Create an index and index every existing matching key
    pub fn create(&self, definition: IndexDefinition, source: &dyn DocumentSource) -> Result<Arc<Index>> {
        if let Some(existing) = self.indexes.get(&definition.name).map(|i| Arc::clone(&i)) {
            if !existing.is_expired(Instant::now()) {
                return Err(Error::IndexExists(definition.name));
            }
            self.evict(&existing);
        }

        let name = definition.name.clone();
        let index = Arc::new(Index::new(definition)?);
        // Holding the entry until the backfill is done makes concurrent
        // keyspace notifications wait, so no write falls between scan and insert
        match self.indexes.entry(name.clone()) {
            Entry::Occupied(_) => Err(Error::IndexExists(name)),
            Entry::Vacant(slot) => {
                let config = self.config.snapshot();
                let existing = source.scan(&index.definition().prefixes);
                for (key, doc) in &existing {
                    index.index_document(key, doc, &config);
                }
                slot.insert(Arc::clone(&index));
                info!(
                    target: "sieve::index",
                    index = %name,
                    docs = index.num_docs(),
                    scanned = existing.len(),
                    "Index created"
                );
                Ok(index)
            }
        }
    }

    /// Look up an index, expiring it first if its idle TTL elapsed
    pub fn get(&self, name: &str) -> Result<Arc<Index>> {
        let index = self
            .indexes
            .get(name)
            .map(|i| Arc::clone(&i))
            .ok_or_else(|| Error::IndexNotFound(name.to_string()))?;
        if index.is_expired(Instant::now()) {
            self.evict(&index);
            return Err(Error::IndexNotFound(name.to_string()));
        }
        Ok(index)
    }

    /// Remove an index; stored documents are untouched
    pub fn drop_index(&self, name: &str) -> Result<()> {
        let index = self.get(name)?;
        self.indexes.remove_if(name, |_, current| Arc::ptr_eq(current, &index));
        info!(target: "sieve::index", index = %name, "Index dropped");
        Ok(())
    }

    fn evict(&self, index: &Arc<Index>) {
        if self
            .indexes
            .remove_if(index.name(), |_, current| Arc::ptr_eq(current, index))
            .is_some()
        {
            info!(target: "sieve::ttl", index = %index.name(), "Temporary index expired");
        }
    }

    /// Remove every index idle past its TTL at `now`; returns their names
    pub fn expire_idle(&self, now: Instant) -> Vec<String> {
        let expired: Vec<Arc<Index>> = self
            .indexes
            .iter()
            .filter(|i| i.is_expired(now))
            .map(|i| Arc::clone(i.value()))
            .collect();
        for index in &expired {
            self.evict(index);
        }
        expired.iter().map(|i| i.name().to_string()).collect()
    }

    /// Indexes whose garbage the sweeper should collect at `now`
    pub fn due_for_gc(&self, now: Instant) -> Vec<Arc<Index>> {
        let config = self.config.snapshot();
        self.indexes
            .iter()
            .filter(|i| i.gc_due(&config, now))
            .map(|i| Arc::clone(i.value()))
            .collect()
    }

    /// Index names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.iter().map(|i| i.key().clone()).collect();
        names.sort();
        names
    }

    /// Number of indexes, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// True if there are no indexes
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    fn covering(&self, key: &str) -> Vec<Arc<Index>> {
        let now = Instant::now();
        self.indexes
            .iter()
            .filter(|i| i.covers(key) && !i.is_expired(now))
            .map(|i| Arc::clone(i.value()))
            .collect()
    }
}

impl KeyspaceListener for IndexRegistry {
    fn on_write(&self, key: &str, doc: &Document) {
        let config = self.config.snapshot();
        for index in self.covering(key) {
            index.index_document(key, doc, &config);
            index.touch();
        }
    }

    fn on_delete(&self, key: &str) {
        let config = self.config.snapshot();
        for index in self.covering(key) {
            if index.delete_document(key, &config) {
                index.touch();
            }
        }
    }
}

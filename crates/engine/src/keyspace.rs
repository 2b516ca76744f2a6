//! In-memory keyspace: the document store indexes are built from
//!
//! Keys hold either a hash or a JSON document. Every mutation is forwarded to
//! the subscribed [`KeyspaceListener`]s after the store is updated, so an
//! index always sees writes in the order the keyspace applied them.
//!
//! Keys with a TTL are tracked in a [`TTLIndex`]. Expiry is lazy on reads and
//! active through [`Keyspace::expire_due`], which the sweeper calls.

use crate::error::{Error, Result};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use sieve_core::Document;
use sieve_storage::TTLIndex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

// ============================================================================
// Traits
// ============================================================================

/// Read access to backing documents
pub trait DocumentSource: Send + Sync {
    /// Current document under a key
    fn load(&self, key: &str) -> Option<Document>;

    /// True if a live document is stored under `key`
    fn contains(&self, key: &str) -> bool {
        self.load(key).is_some()
    }

    /// Every document whose key starts with one of `prefixes` (all keys if empty)
    fn scan(&self, prefixes: &[String]) -> Vec<(String, Document)>;
}

/// Receives keyspace mutations
pub trait KeyspaceListener: Send + Sync {
    /// A key was created or overwritten
    fn on_write(&self, key: &str, doc: &Document);

    /// A key was deleted or expired
    fn on_delete(&self, key: &str);
}

// ============================================================================
// Keyspace
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    doc: Document,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// DashMap-backed document store
#[derive(Default)]
pub struct Keyspace {
    entries: DashMap<String, Entry>,
    ttl: Mutex<TTLIndex>,
    listeners: RwLock<Vec<Arc<dyn KeyspaceListener>>>,
    /// Serializes mutate-then-notify so listeners observe store order
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Keyspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyspace")
            .field("keys", &self.entries.len())
            .field("volatile", &self.ttl.lock().len())
            .finish()
    }
}

impl Keyspace {
    /// Create an empty keyspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for future mutations
    pub fn subscribe(&self, listener: Arc<dyn KeyspaceListener>) {
        self.listeners.write().push(listener);
    }

    fn notify_write(&self, key: &str, doc: &Document) {
        for listener in self.listeners.read().iter() {
            listener.on_write(key, doc);
        }
    }

    fn notify_delete(&self, key: &str) {
        for listener in self.listeners.read().iter() {
            listener.on_delete(key);
        }
    }

    /// Set hash fields, creating the key if needed; returns the number of new fields
    pub fn hset<I, K, V>(&self, key: &str, pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let _guard = self.write_lock.lock();
        self.purge_if_expired(key, Instant::now());

        let (doc, added) = {
            let mut entry = self.entries.entry(key.to_string()).or_insert_with(|| Entry {
                doc: Document::Hash(BTreeMap::new()),
                expires_at: None,
            });
            let map = match &mut entry.doc {
                Document::Hash(map) => map,
                Document::Json(_) => {
                    return Err(Error::WrongType {
                        key: key.to_string(),
                        actual: "json",
                    })
                }
            };
            let mut added = 0;
            for (field, value) in pairs {
                if map.insert(field.into(), value.into()).is_none() {
                    added += 1;
                }
            }
            (entry.doc.clone(), added)
        };

        self.notify_write(key, &doc);
        Ok(added)
    }

    /// Replace the JSON document at the root path
    pub fn json_set(&self, key: &str, path: &str, value: Value) -> Result<()> {
        if !matches!(path.trim(), "$" | ".") {
            return Err(Error::invalid("JSON.SET only supports the root path"));
        }
        let _guard = self.write_lock.lock();
        let now = Instant::now();
        self.purge_if_expired(key, now);

        let doc = Document::Json(value);
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                if let Document::Hash(_) = entry.doc {
                    return Err(Error::WrongType {
                        key: key.to_string(),
                        actual: "hash",
                    });
                }
                entry.doc = doc.clone();
            }
            None => {
                self.entries.insert(
                    key.to_string(),
                    Entry {
                        doc: doc.clone(),
                        expires_at: None,
                    },
                );
            }
        }

        self.notify_write(key, &doc);
        Ok(())
    }

    /// Delete a key; returns true if it existed
    pub fn del(&self, key: &str) -> bool {
        let _guard = self.write_lock.lock();
        let now = Instant::now();
        match self.entries.remove(key) {
            Some((_, entry)) => {
                if let Some(at) = entry.expires_at {
                    self.ttl.lock().remove(at, key);
                }
                self.notify_delete(key);
                !entry.is_expired(now)
            }
            None => false,
        }
    }

    /// Set a time to live; a zero TTL deletes the key
    pub fn expire(&self, key: &str, ttl: Duration) -> bool {
        if ttl.is_zero() {
            return self.del(key);
        }
        let _guard = self.write_lock.lock();
        let now = Instant::now();
        if self.purge_if_expired(key, now) {
            return false;
        }
        let Some(mut entry) = self.entries.get_mut(key) else {
            return false;
        };
        let at = now + ttl;
        let mut ttl_index = self.ttl.lock();
        if let Some(previous) = entry.expires_at.replace(at) {
            ttl_index.remove(previous, key);
        }
        ttl_index.insert(at, key);
        true
    }

    /// Remove a key's TTL; returns true if one was removed
    pub fn persist(&self, key: &str) -> bool {
        let _guard = self.write_lock.lock();
        if self.purge_if_expired(key, Instant::now()) {
            return false;
        }
        let Some(mut entry) = self.entries.get_mut(key) else {
            return false;
        };
        match entry.expires_at.take() {
            Some(at) => {
                self.ttl.lock().remove(at, key);
                true
            }
            None => false,
        }
    }

    /// Remaining time to live; `None` for missing keys, `Some(None)` for persistent ones
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(entry.expires_at.map(|at| at.saturating_duration_since(now)))
    }

    /// Current document, expiring the key first if its TTL elapsed
    pub fn get(&self, key: &str) -> Option<Document> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.doc.clone());
            }
        }
        let _guard = self.write_lock.lock();
        self.purge_if_expired(key, now);
        None
    }

    /// True if the key exists and has not expired
    pub fn exists(&self, key: &str) -> bool {
        let now = Instant::now();
        {
            let Some(entry) = self.entries.get(key) else {
                return false;
            };
            if !entry.is_expired(now) {
                return true;
            }
        }
        let _guard = self.write_lock.lock();
        self.purge_if_expired(key, now);
        false
    }

    /// Expire every key whose TTL elapsed by `now`; returns how many were removed
    pub fn expire_due(&self, now: Instant) -> usize {
        let due = self.ttl.lock().find_expired(now);
        if due.is_empty() {
            return 0;
        }
        let _guard = self.write_lock.lock();
        let removed = due.iter().filter(|key| self.purge_if_expired(key, now)).count();
        if removed > 0 {
            debug!(target: "sieve::ttl", removed, "expired keys");
        }
        removed
    }

    /// Number of keys, including expired keys not yet purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no keys are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove `key` if its TTL elapsed; caller holds the write lock
    fn purge_if_expired(&self, key: &str, now: Instant) -> bool {
        let Some((_, entry)) = self.entries.remove_if(key, |_, e| e.is_expired(now)) else {
            return false;
        };
        if let Some(at) = entry.expires_at {
            self.ttl.lock().remove(at, key);
        }
        self.notify_delete(key);
        true
    }
}

impl DocumentSource for Keyspace {
    fn load(&self, key: &str) -> Option<Document> {
        self.get(key)
    }

    fn contains(&self, key: &str) -> bool {
        self.exists(key)
    }

    fn scan(&self, prefixes: &[String]) -> Vec<(String, Document)> {
        let now = Instant::now();
        let mut out: Vec<(String, Document)> = self
            .entries
            .iter()
            .filter(|e| !e.is_expired(now))
            .filter(|e| prefixes.is_empty() || prefixes.iter().any(|p| e.key().starts_with(p.as_str())))
            .map(|e| (e.key().clone(), e.doc.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

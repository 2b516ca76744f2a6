//! Document table: doc id allocation, per-document metadata, and versioned
//! visibility
//!
//! Every write bumps a single published version. A document carries the
//! version that created it and, once deleted, the version that retired it.
//! A query captures a [`DocSnapshot`] at start and sees exactly the documents
//! with `created <= v < deleted`, so a concurrent write is either fully
//! visible or not visible at all.
//!
//! Retired documents stay in the table until no open snapshot can see them;
//! only then does [`DocTable::collectable`] hand them to the garbage
//! collector.

use dashmap::DashMap;
use parking_lot::Mutex;
use sieve_core::{DocId, FieldIndex, SortKey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// DocMeta
// ============================================================================

/// Everything the index remembers about one document version
#[derive(Debug, Clone, PartialEq)]
pub struct DocMeta {
    /// Backing record key
    pub key: String,
    /// Version that published this document
    pub created: u64,
    /// Retained TEXT tokens across all fields
    pub len: u32,
    /// Document score
    pub score: f64,
    /// Precomputed sort keys of SORTABLE fields, by field position
    pub sort_keys: Vec<Option<SortKey>>,
    /// Distinct TEXT terms (forward index for garbage collection)
    pub terms: Vec<String>,
    /// TAG values by field
    pub tags: Vec<(FieldIndex, String)>,
    /// NUMERIC values by field
    pub numbers: Vec<(FieldIndex, f64)>,
}

impl DocMeta {
    /// Metadata with no indexed content
    pub fn new(key: impl Into<String>, created: u64) -> Self {
        DocMeta {
            key: key.into(),
            created,
            len: 0,
            score: 1.0,
            sort_keys: Vec::new(),
            terms: Vec::new(),
            tags: Vec::new(),
            numbers: Vec::new(),
        }
    }

    /// Sort key of a field, if precomputed
    pub fn sort_key(&self, field: FieldIndex) -> Option<&SortKey> {
        self.sort_keys.get(field as usize).and_then(Option::as_ref)
    }
}

#[derive(Debug)]
struct Retired {
    meta: Arc<DocMeta>,
    deleted: u64,
}

// ============================================================================
// DocTable
// ============================================================================

/// Per-index document table
#[derive(Debug)]
pub struct DocTable {
    live: DashMap<DocId, Arc<DocMeta>>,
    keys: DashMap<String, DocId>,
    retired: DashMap<DocId, Retired>,
    next_id: AtomicU64,
    version: AtomicU64,
    total_len: AtomicU64,
    /// Open snapshot versions → count
    readers: Mutex<BTreeMap<u64, usize>>,
}

impl Default for DocTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTable {
    /// Create an empty table
    pub fn new() -> Self {
        DocTable {
            live: DashMap::new(),
            keys: DashMap::new(),
            retired: DashMap::new(),
            next_id: AtomicU64::new(1),
            version: AtomicU64::new(0),
            total_len: AtomicU64::new(0),
            readers: Mutex::new(BTreeMap::new()),
        }
    }

    // ========================================================================
    // Writer side (callers serialize writes per index)
    // ========================================================================

    /// Allocate the next doc id
    pub fn allocate_id(&self) -> DocId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Version the next [`DocTable::publish`] will make visible
    pub fn pending_version(&self) -> u64 {
        self.version.load(Ordering::Acquire) + 1
    }

    /// Register a document; invisible until the next publish
    pub fn insert(&self, id: DocId, meta: DocMeta) {
        self.total_len.fetch_add(meta.len as u64, Ordering::Relaxed);
        self.keys.insert(meta.key.clone(), id);
        self.live.insert(id, Arc::new(meta));
    }

    /// Retire the document stored under `key`; it disappears at the next publish
    pub fn retire_key(&self, key: &str) -> Option<(DocId, Arc<DocMeta>)> {
        let (_, id) = self.keys.remove(key)?;
        let meta = self.live.get(&id).map(|m| Arc::clone(m.value()))?;
        self.retired.insert(
            id,
            Retired {
                meta: Arc::clone(&meta),
                deleted: self.pending_version(),
            },
        );
        self.live.remove(&id);
        self.total_len.fetch_sub(meta.len as u64, Ordering::Relaxed);
        Some((id, meta))
    }

    /// Make every pending insert and retire visible at once
    pub fn publish(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Retired documents no open snapshot can see
    pub fn collectable(&self) -> Vec<(DocId, Arc<DocMeta>)> {
        let horizon = {
            let readers = self.readers.lock();
            readers
                .keys()
                .next()
                .copied()
                .unwrap_or_else(|| self.version.load(Ordering::Acquire))
        };
        let mut out: Vec<(DocId, Arc<DocMeta>)> = self
            .retired
            .iter()
            .filter(|r| r.deleted <= horizon)
            .map(|r| (*r.key(), Arc::clone(&r.meta)))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Drop retired documents after their postings are gone
    pub fn forget(&self, ids: &[DocId]) {
        for id in ids {
            self.retired.remove(id);
        }
    }

    /// Retired documents not yet collected
    pub fn pending_garbage(&self) -> usize {
        self.retired.len()
    }

    /// Remove everything
    pub fn clear(&self) {
        self.live.clear();
        self.keys.clear();
        self.retired.clear();
        self.total_len.store(0, Ordering::Relaxed);
    }

    // ========================================================================
    // Reader side
    // ========================================================================

    /// Open a snapshot at the current published version
    pub fn snapshot(&self) -> DocSnapshot<'_> {
        let mut readers = self.readers.lock();
        let version = self.version.load(Ordering::Acquire);
        *readers.entry(version).or_insert(0) += 1;
        DocSnapshot { table: self, version }
    }

    /// Current doc id of a key
    pub fn id_for_key(&self, key: &str) -> Option<DocId> {
        self.keys.get(key).map(|id| *id)
    }

    /// Number of live documents
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Average retained token count of live documents
    pub fn avg_len(&self) -> f64 {
        let n = self.live.len();
        if n == 0 {
            return 0.0;
        }
        self.total_len.load(Ordering::Relaxed) as f64 / n as f64
    }

    /// Published version
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

// ============================================================================
// DocSnapshot
// ============================================================================

/// A consistent view of the table; deregisters on drop
#[derive(Debug)]
pub struct DocSnapshot<'a> {
    table: &'a DocTable,
    version: u64,
}

impl DocSnapshot<'_> {
    /// Version this snapshot sees
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Metadata of a document visible in this snapshot
    pub fn meta(&self, id: DocId) -> Option<Arc<DocMeta>> {
        if let Some(meta) = self.table.live.get(&id) {
            return (meta.created <= self.version).then(|| Arc::clone(meta.value()));
        }
        let retired = self.table.retired.get(&id)?;
        (retired.meta.created <= self.version && self.version < retired.deleted)
            .then(|| Arc::clone(&retired.meta))
    }

    /// True if the document is visible
    pub fn is_visible(&self, id: DocId) -> bool {
        self.meta(id).is_some()
    }

    /// Every visible doc id, ascending
    pub fn all_ids(&self) -> Vec<DocId> {
        let mut ids: Vec<DocId> = self
            .table
            .live
            .iter()
            .filter(|m| m.created <= self.version)
            .map(|m| *m.key())
            .collect();
        ids.extend(
            self.table
                .retired
                .iter()
                .filter(|r| r.meta.created <= self.version && self.version < r.deleted)
                .map(|r| *r.key()),
        );
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Number of visible documents
    pub fn doc_count(&self) -> usize {
        self.all_ids().len()
    }
}

impl Drop for DocSnapshot<'_> {
    fn drop(&mut self) {
        let mut readers = self.table.readers.lock();
        if let Some(count) = readers.get_mut(&self.version) {
            *count -= 1;
            if *count == 0 {
                readers.remove(&self.version);
            }
        }
    }
}

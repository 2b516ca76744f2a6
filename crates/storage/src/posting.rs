//! Posting List Manager
//!
//! Each term maps to an `Arc<PostingList>` sorted by `(doc_id, field)`.
//! Writers mutate through [`Arc::make_mut`], so a reader holding a clone of
//! the `Arc` keeps iterating an immutable snapshot. The background sweeper
//! builds a pruned copy off-lock and swaps it in with
//! [`PostingStore::publish_if_unchanged`], which only succeeds when nobody
//! replaced the list in the meantime.

use dashmap::DashMap;
use sieve_core::{DocId, FieldIndex, Position};
use smallvec::SmallVec;
use std::sync::Arc;

// ============================================================================
// Posting
// ============================================================================

/// Occurrences of one term in one field of one document
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    /// Document identifier
    pub doc_id: DocId,
    /// Schema position of the field
    pub field: FieldIndex,
    /// Term frequency within the field
    pub tf: u32,
    /// Sorted token positions (empty for tags)
    pub positions: SmallVec<[Position; 4]>,
}

impl Posting {
    /// Create a posting from its positions
    pub fn new(doc_id: DocId, field: FieldIndex, positions: SmallVec<[Position; 4]>) -> Self {
        Posting {
            doc_id,
            field,
            tf: positions.len().max(1) as u32,
            positions,
        }
    }

    /// A positionless posting (tags)
    pub fn tag(doc_id: DocId, field: FieldIndex) -> Self {
        Posting {
            doc_id,
            field,
            tf: 1,
            positions: SmallVec::new(),
        }
    }

    fn sort_key(&self) -> (DocId, FieldIndex) {
        (self.doc_id, self.field)
    }
}

// ============================================================================
// PostingList
// ============================================================================

/// Postings of one term, ordered by `(doc_id, field)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingList {
    entries: Vec<Posting>,
}

impl PostingList {
    /// Create an empty list
    pub fn new() -> Self {
        PostingList { entries: Vec::new() }
    }

    /// Insert keeping order; an existing `(doc, field)` entry is replaced
    pub fn insert(&mut self, posting: Posting) {
        // Doc ids are allocated monotonically, so this is almost always an append
        if self.entries.last().map_or(true, |last| last.sort_key() < posting.sort_key()) {
            self.entries.push(posting);
            return;
        }
        match self
            .entries
            .binary_search_by_key(&posting.sort_key(), Posting::sort_key)
        {
            Ok(i) => self.entries[i] = posting,
            Err(i) => self.entries.insert(i, posting),
        }
    }

    /// All postings
    pub fn entries(&self) -> &[Posting] {
        &self.entries
    }

    /// Postings of one document
    pub fn postings_for(&self, doc_id: DocId) -> &[Posting] {
        let start = self.entries.partition_point(|p| p.doc_id < doc_id);
        let end = start + self.entries[start..].partition_point(|p| p.doc_id == doc_id);
        &self.entries[start..end]
    }

    /// Distinct document ids in ascending order
    pub fn doc_ids(&self) -> Vec<DocId> {
        let mut ids: Vec<DocId> = self.entries.iter().map(|p| p.doc_id).collect();
        ids.dedup();
        ids
    }

    /// Number of distinct documents
    pub fn doc_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for p in &self.entries {
            if last != Some(p.doc_id) {
                count += 1;
                last = Some(p.doc_id);
            }
        }
        count
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the list has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the list without entries of the given documents
    pub fn without(&self, doomed: &dyn Fn(DocId) -> bool) -> PostingList {
        PostingList {
            entries: self.entries.iter().filter(|p| !doomed(p.doc_id)).cloned().collect(),
        }
    }

    /// Drop entries of the given documents in place; returns entries removed
    pub fn retain_docs(&mut self, doomed: &dyn Fn(DocId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|p| !doomed(p.doc_id));
        before - self.entries.len()
    }

    /// Rough heap footprint in bytes
    pub fn approx_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|p| std::mem::size_of::<Posting>() + p.positions.len().saturating_sub(4) * 4)
            .sum()
    }
}

// ============================================================================
// PostingStore
// ============================================================================

/// Outcome of a compare-and-swap publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// The pruned list replaced the snapshot
    Replaced,
    /// The pruned list was empty and the term was removed
    Removed,
    /// The list changed since the snapshot; nothing was written
    Conflict,
}

/// Term → posting list map
#[derive(Debug, Default)]
pub struct PostingStore {
    lists: DashMap<String, Arc<PostingList>>,
}

impl PostingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a posting under a term
    pub fn add(&self, term: &str, posting: Posting) {
        let mut list = self.lists.entry(term.to_string()).or_default();
        Arc::make_mut(list.value_mut()).insert(posting);
    }

    /// Snapshot of a term's list
    pub fn get(&self, term: &str) -> Option<Arc<PostingList>> {
        self.lists.get(term).map(|l| Arc::clone(l.value()))
    }

    /// Prune entries in place; returns (entries removed, list now empty)
    pub fn prune(&self, term: &str, doomed: &dyn Fn(DocId) -> bool) -> (usize, bool) {
        let (removed, empty) = match self.lists.get_mut(term) {
            Some(mut list) => {
                let removed = Arc::make_mut(list.value_mut()).retain_docs(doomed);
                (removed, list.is_empty())
            }
            None => return (0, false),
        };
        if empty {
            self.lists.remove_if(term, |_, l| l.is_empty());
        }
        (removed, empty)
    }

    /// Replace `expected` with `pruned` only if the term still maps to `expected`
    pub fn publish_if_unchanged(
        &self,
        term: &str,
        expected: &Arc<PostingList>,
        pruned: PostingList,
    ) -> Publish {
        if pruned.is_empty() {
            return match self.lists.remove_if(term, |_, current| Arc::ptr_eq(current, expected)) {
                Some(_) => Publish::Removed,
                None => Publish::Conflict,
            };
        }
        match self.lists.get_mut(term) {
            Some(mut current) if Arc::ptr_eq(current.value(), expected) => {
                *current.value_mut() = Arc::new(pruned);
                Publish::Replaced
            }
            _ => Publish::Conflict,
        }
    }

    /// Remove a term
    pub fn remove(&self, term: &str) -> Option<Arc<PostingList>> {
        self.lists.remove(term).map(|(_, l)| l)
    }

    /// Number of terms with a list
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// True if there are no lists
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of entries across all lists
    pub fn total_entries(&self) -> usize {
        self.lists.iter().map(|l| l.len()).sum()
    }

    /// Remove every list
    pub fn clear(&self) {
        self.lists.clear();
    }
}

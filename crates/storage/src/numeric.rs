//! Ordered numeric index for NUMERIC fields
//!
//! Entries are `(value, doc_id)` pairs in a `BTreeSet`, ordered by
//! `f64::total_cmp`. Ranges support inclusive and exclusive bounds and
//! infinite endpoints.

use sieve_core::DocId;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::ops::Bound;

/// `f64` with a total order
#[derive(Debug, Clone, Copy)]
pub struct NumKey(f64);

impl NumKey {
    /// Wrap a value; `-0.0` is folded into `0.0`
    pub fn new(value: f64) -> Self {
        NumKey(if value == 0.0 { 0.0 } else { value })
    }

    /// Wrapped value
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for NumKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NumKey {}

impl PartialOrd for NumKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NumKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// One bound of a numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumBound {
    /// Bound value, possibly infinite
    pub value: f64,
    /// True for `(` exclusive bounds
    pub exclusive: bool,
}

impl NumBound {
    /// Inclusive bound
    pub fn inclusive(value: f64) -> Self {
        NumBound {
            value,
            exclusive: false,
        }
    }

    /// Exclusive bound
    pub fn exclusive(value: f64) -> Self {
        NumBound {
            value,
            exclusive: true,
        }
    }
}

/// `(value, doc)` index of one NUMERIC field
#[derive(Debug, Default, Clone)]
pub struct NumericIndex {
    entries: BTreeSet<(NumKey, DocId)>,
}

impl NumericIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for a document
    pub fn insert(&mut self, value: f64, doc_id: DocId) {
        self.entries.insert((NumKey::new(value), doc_id));
    }

    /// Remove one value of a document; true if it was present
    pub fn remove(&mut self, value: f64, doc_id: DocId) -> bool {
        self.entries.remove(&(NumKey::new(value), doc_id))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Documents with a value inside `[min, max]`, ascending and deduplicated
    pub fn range(&self, min: NumBound, max: NumBound) -> Vec<DocId> {
        let lower = if min.exclusive {
            Bound::Excluded((NumKey::new(min.value), DocId::MAX))
        } else {
            Bound::Included((NumKey::new(min.value), DocId::MIN))
        };
        let upper = if max.exclusive {
            Bound::Excluded((NumKey::new(max.value), DocId::MIN))
        } else {
            Bound::Included((NumKey::new(max.value), DocId::MAX))
        };
        let (lo, hi) = (NumKey::new(min.value), NumKey::new(max.value));
        if lo > hi || (lo == hi && (min.exclusive || max.exclusive)) {
            return Vec::new();
        }
        let mut docs: Vec<DocId> = self.entries.range((lower, upper)).map(|(_, d)| *d).collect();
        docs.sort_unstable();
        docs.dedup();
        docs
    }
}

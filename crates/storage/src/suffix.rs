//! Suffix trie for `*suffix` and `*contains*` term lookups
//!
//! Every suffix of at least [`MIN_SUFFIX_LEN`] characters of each indexed
//! term is a key; its value is the set of full terms ending with it.
//! A term containing `mid` has a suffix starting with `mid`, so a contains
//! lookup is a prefix walk over the suffix keys.

use crate::trie::{RadixTrie, Visit};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;

/// Shortest suffix stored in the trie
pub const MIN_SUFFIX_LEN: usize = 2;

/// Suffix → terms index
#[derive(Debug, Default, Clone)]
pub struct SuffixTrie {
    trie: RadixTrie<BTreeSet<String>>,
}

fn suffixes(term: &str) -> impl Iterator<Item = &str> {
    let count = term.chars().count();
    term.char_indices()
        .enumerate()
        .take_while(move |(n, _)| count - n >= MIN_SUFFIX_LEN)
        .map(move |(_, (i, _))| &term[i..])
}

impl SuffixTrie {
    /// Create an empty suffix trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct suffix keys
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    /// True if no term is indexed
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Index every suffix of `term`
    pub fn insert(&mut self, term: &str) {
        for suffix in suffixes(term) {
            match self.trie.get_mut(suffix) {
                Some(terms) => {
                    terms.insert(term.to_string());
                }
                None => {
                    let mut terms = BTreeSet::new();
                    terms.insert(term.to_string());
                    self.trie.insert(suffix, terms);
                }
            }
        }
    }

    /// Drop every suffix entry of `term`
    pub fn remove(&mut self, term: &str) {
        for suffix in suffixes(term) {
            let now_empty = match self.trie.get_mut(suffix) {
                Some(terms) => {
                    terms.remove(term);
                    terms.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.trie.remove(suffix);
            }
        }
    }

    /// Visit the terms ending with `suffix` in lexicographic order until
    /// `visit` stops
    ///
    /// Returns false when `suffix` is too short to be indexed.
    pub fn for_each_ending_with<F>(&self, suffix: &str, mut visit: F) -> bool
    where
        F: FnMut(&str) -> Visit,
    {
        if suffix.chars().count() < MIN_SUFFIX_LEN {
            return false;
        }
        if let Some(terms) = self.trie.get(suffix) {
            for term in terms {
                if visit(term) == Visit::Stop {
                    break;
                }
            }
        }
        true
    }

    /// Visit each term containing `mid` once until `visit` stops
    ///
    /// Terms arrive grouped by the suffix that matched, not sorted. Returns
    /// false when `mid` is too short to be indexed.
    pub fn for_each_containing<F>(&self, mid: &str, mut visit: F) -> bool
    where
        F: FnMut(&str) -> Visit,
    {
        if mid.chars().count() < MIN_SUFFIX_LEN {
            return false;
        }
        let mut seen = FxHashSet::default();
        self.trie.for_each_prefixed(mid, |_, terms| {
            for term in terms {
                if seen.contains(term) {
                    continue;
                }
                seen.insert(term.clone());
                if visit(term) == Visit::Stop {
                    return Visit::Stop;
                }
            }
            Visit::Continue
        });
        true
    }
}

//! Term Store: every distinct token of a field group, with pattern expansion
//!
//! Terms live in a [`RadixTrie`] with a per-term document counter. An
//! optional [`SuffixTrie`] serves `*suffix` and `*contains*` patterns;
//! without it (or for literals shorter than the suffix trie's minimum),
//! those patterns fall back to a full scan of the term trie.
//!
//! Expansion is bounded by MAXEXPANSIONS and polls the query deadline.

use crate::error::{StorageError, StorageResult};
use crate::suffix::SuffixTrie;
use crate::trie::{Guide, RadixTrie, Visit};
use crate::wildcard::{MatchState, WildcardPattern};
use sieve_core::QueryBudget;
use tracing::trace;

// ============================================================================
// TermPattern
// ============================================================================

/// What a query asks the term store to expand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermPattern {
    /// One exact term
    Exact(String),
    /// `foo*`
    Prefix(String),
    /// `*foo`
    Suffix(String),
    /// `*foo*`
    Contains(String),
    /// `'f?o*bar'` with `$type:wildcard`
    Wildcard(WildcardPattern),
}

impl TermPattern {
    /// Literal characters the pattern requires
    pub fn literal_len(&self) -> usize {
        match self {
            TermPattern::Exact(s)
            | TermPattern::Prefix(s)
            | TermPattern::Suffix(s)
            | TermPattern::Contains(s) => s.chars().count(),
            TermPattern::Wildcard(w) => w.literal_len(),
        }
    }

    /// Pattern in query syntax, for messages
    pub fn display(&self) -> String {
        match self {
            TermPattern::Exact(s) => s.clone(),
            TermPattern::Prefix(s) => format!("{}*", s),
            TermPattern::Suffix(s) => format!("*{}", s),
            TermPattern::Contains(s) => format!("*{}*", s),
            TermPattern::Wildcard(w) => format!("'{}'", w),
        }
    }
}

/// Gathers expanded terms against the budget
struct Collector<'a> {
    budget: &'a QueryBudget,
    terms: Vec<String>,
    visited: usize,
    exceeded: bool,
    timed_out: bool,
}

impl<'a> Collector<'a> {
    fn new(budget: &'a QueryBudget) -> Self {
        Collector {
            budget,
            terms: Vec::new(),
            visited: 0,
            exceeded: false,
            timed_out: false,
        }
    }

    /// Poll the deadline; returns Stop when it has passed
    ///
    /// The first visit always polls.
    fn tick(&mut self) -> Visit {
        let due = self.budget.check_time(self.visited);
        self.visited += 1;
        if due {
            self.timed_out = true;
            return Visit::Stop;
        }
        Visit::Continue
    }

    /// Tick, then collect `term`
    fn visit(&mut self, term: &str) -> Visit {
        match self.tick() {
            Visit::Stop => Visit::Stop,
            Visit::Continue => self.push(term),
        }
    }

    fn push(&mut self, term: &str) -> Visit {
        if self.terms.len() >= self.budget.max_expansions {
            self.exceeded = true;
            return Visit::Stop;
        }
        self.terms.push(term.to_string());
        Visit::Continue
    }

    fn finish(self) -> StorageResult<Vec<String>> {
        if self.timed_out {
            Err(StorageError::Timeout)
        } else if self.exceeded {
            Err(StorageError::ExpansionLimit {
                limit: self.budget.max_expansions,
                partial: self.terms,
            })
        } else {
            Ok(self.terms)
        }
    }
}

// ============================================================================
// TermStore
// ============================================================================

/// Term trie plus optional suffix trie
#[derive(Debug, Default, Clone)]
pub struct TermStore {
    terms: RadixTrie<u32>,
    suffixes: Option<SuffixTrie>,
}

impl TermStore {
    /// Create an empty store
    pub fn new(with_suffix_trie: bool) -> Self {
        TermStore {
            terms: RadixTrie::new(),
            suffixes: with_suffix_trie.then(SuffixTrie::new),
        }
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if no term is stored
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True if a suffix trie is maintained
    pub fn has_suffix_trie(&self) -> bool {
        self.suffixes.is_some()
    }

    /// Record one more document containing `term`; true if the term is new
    pub fn insert(&mut self, term: &str) -> bool {
        if let Some(count) = self.terms.get_mut(term) {
            *count += 1;
            return false;
        }
        self.terms.insert(term, 1);
        if let Some(suffixes) = &mut self.suffixes {
            suffixes.insert(term);
        }
        true
    }

    /// Forget `docs` documents containing `term`; true if the term is gone
    pub fn release(&mut self, term: &str, docs: u32) -> bool {
        let remaining = match self.terms.get_mut(term) {
            Some(count) => {
                *count = count.saturating_sub(docs);
                *count
            }
            None => return false,
        };
        if remaining == 0 {
            self.remove(term);
            return true;
        }
        false
    }

    /// Drop a term entirely
    pub fn remove(&mut self, term: &str) -> bool {
        if self.terms.remove(term).is_none() {
            return false;
        }
        if let Some(suffixes) = &mut self.suffixes {
            suffixes.remove(term);
        }
        true
    }

    /// True if the term is present
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Number of documents recorded for a term
    pub fn doc_count(&self, term: &str) -> u32 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    /// Every term in lexicographic order
    pub fn terms(&self) -> Vec<String> {
        self.terms.keys()
    }

    /// Expand a pattern into the matching terms
    ///
    /// Non-exact patterns whose literal span is shorter than MINPREFIX fail
    /// before any lookup.
    pub fn expand(&self, pattern: &TermPattern, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        if !matches!(pattern, TermPattern::Exact(_)) && pattern.literal_len() < budget.min_prefix {
            return Err(StorageError::PrefixTooShort {
                pattern: pattern.display(),
                min: budget.min_prefix,
            });
        }
        let result = match pattern {
            TermPattern::Exact(term) => Ok(if self.contains_term(term) {
                vec![term.clone()]
            } else {
                Vec::new()
            }),
            TermPattern::Prefix(prefix) => self.prefix(prefix, budget),
            TermPattern::Suffix(suffix) => self.suffix(suffix, budget),
            TermPattern::Contains(mid) => self.contains(mid, budget),
            TermPattern::Wildcard(w) => self.wildcard(w, budget),
        };
        if let Ok(terms) = &result {
            trace!(target: "sieve::terms", pattern = %pattern.display(), expanded = terms.len(), "expanded");
        }
        result
    }

    /// Terms starting with `prefix`
    pub fn prefix(&self, prefix: &str, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        let mut c = Collector::new(budget);
        self.terms.for_each_prefixed(prefix, |term, _| c.visit(term));
        c.finish()
    }

    /// Terms ending with `suffix`
    pub fn suffix(&self, suffix: &str, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        if let Some(suffixes) = &self.suffixes {
            let mut c = Collector::new(budget);
            if suffixes.for_each_ending_with(suffix, |term| c.visit(term)) {
                return c.finish();
            }
        }
        self.scan(budget, |term| term.ends_with(suffix))
    }

    /// Terms containing `mid`
    pub fn contains(&self, mid: &str, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        if let Some(suffixes) = &self.suffixes {
            let mut c = Collector::new(budget);
            if suffixes.for_each_containing(mid, |term| c.visit(term)) {
                c.terms.sort();
                return c.finish();
            }
        }
        self.scan(budget, |term| term.contains(mid))
    }

    /// Terms matching a glob pattern, pruning the trie walk
    pub fn wildcard(&self, pattern: &WildcardPattern, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        let mut c = Collector::new(budget);
        let mut timed_out = false;
        let mut visited = 0usize;
        self.terms.for_each_guided(
            |key| {
                if timed_out || budget.check_time(visited) {
                    timed_out = true;
                    return Guide::Prune;
                }
                visited += 1;
                match pattern.match_state(key) {
                    MatchState::Full => Guide::Match,
                    MatchState::Partial => Guide::Descend,
                    MatchState::NoMatch => Guide::Prune,
                }
            },
            |term, _| c.push(term),
        );
        c.timed_out |= timed_out;
        c.finish()
    }

    fn scan<F>(&self, budget: &QueryBudget, pred: F) -> StorageResult<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let mut c = Collector::new(budget);
        self.terms.for_each(|term, _| {
            if c.tick() == Visit::Stop {
                return Visit::Stop;
            }
            if pred(term) {
                c.push(term)
            } else {
                Visit::Continue
            }
        });
        c.finish()
    }
}

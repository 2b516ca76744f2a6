//! Result ordering
//!
//! Without SORTBY results are ranked by score, highest first. With SORTBY
//! they are ordered by the field's sort key: the first value of the field,
//! lowercased for text. Documents without a key sort last in either
//! direction, and ties always fall back to ascending doc id, so the order is
//! total and does not depend on how the keys were obtained.

use serde::{Deserialize, Serialize};
use sieve_core::{DocId, SortKey};
use std::cmp::Ordering;

/// SORTBY direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl SortOrder {
    /// Parse `ASC` / `DESC`, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(SortOrder::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }
}

/// A matching document and its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    /// Document
    pub doc: DocId,
    /// Relevance score
    pub score: f64,
}

/// Order by score descending, then doc id ascending
pub fn rank_by_score(docs: &mut [ScoredDoc]) {
    docs.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc.cmp(&b.doc)));
}

/// Order by a per-document sort key
///
/// `key` is called once per document.
pub fn sort_by_key<F>(docs: Vec<ScoredDoc>, order: SortOrder, mut key: F) -> Vec<ScoredDoc>
where
    F: FnMut(DocId) -> Option<SortKey>,
{
    let mut keyed: Vec<(ScoredDoc, Option<SortKey>)> = docs.into_iter().map(|d| (d, key(d.doc))).collect();
    keyed.sort_by(|(a, ka), (b, kb)| {
        let by_key = match (ka, kb) {
            (Some(x), Some(y)) => match order {
                SortOrder::Asc => x.compare(y),
                SortOrder::Desc => y.compare(x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_key.then(a.doc.cmp(&b.doc))
    });
    keyed.into_iter().map(|(d, _)| d).collect()
}

/// The `LIMIT offset count` window of a result list
pub fn page<T>(items: &[T], offset: usize, count: usize) -> &[T] {
    let start = offset.min(items.len());
    let end = start.saturating_add(count).min(items.len());
    &items[start..end]
}

//! Scoring infrastructure
//!
//! This module provides:
//! - Scorer trait for pluggable scoring algorithms
//! - ScorerContext for corpus-level statistics
//! - TF-IDF, document-normalised TF-IDF, BM25, and document-score scorers
//! - ScorerRegistry resolving SCORER names
//!
//! Scores only order results; they are not a bit-exact contract.

use crate::error::{QueryError, QueryResult};
use crate::eval::{DocMatch, Hit};
use crate::sort::ScoredDoc;
use crate::view::IndexView;
use rustc_hash::FxHashMap;
use std::sync::Arc;

// ============================================================================
// ScorerContext
// ============================================================================

/// Corpus-level statistics captured once per query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerContext {
    /// Total documents in the index (for IDF calculation)
    pub total_docs: usize,

    /// Average document length in tokens (for length normalization)
    pub avg_doc_len: f64,
}

impl ScorerContext {
    /// Create a context
    pub fn new(total_docs: usize, avg_doc_len: f64) -> Self {
        ScorerContext {
            total_docs,
            avg_doc_len,
        }
    }

    /// Statistics of an index view
    pub fn from_view(view: &dyn IndexView) -> Self {
        Self::new(view.total_docs(), view.avg_doc_len())
    }

    /// Classic IDF: log2(1 + N / df)
    pub fn idf(&self, doc_freq: usize) -> f64 {
        let df = doc_freq.max(1) as f64;
        (1.0 + self.total_docs as f64 / df).log2()
    }

    /// BM25 IDF with smoothing: ln((N - df + 0.5) / (df + 0.5) + 1)
    pub fn bm25_idf(&self, doc_freq: usize) -> f64 {
        let df = doc_freq as f64;
        let n = self.total_docs as f64;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}

/// What a scorer sees of one matching document
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    /// Term hits that matched the document
    pub hits: &'a [Hit],
    /// Retained token count of the document
    pub doc_len: u32,
    /// Document score
    pub doc_score: f64,
}

// ============================================================================
// Scorer Trait
// ============================================================================

/// Pluggable scoring interface
///
/// Higher scores indicate more relevant documents.
///
/// # Thread Safety
///
/// Scorers must be Send + Sync; one instance serves concurrent queries.
pub trait Scorer: Send + Sync {
    /// Score one matching document
    fn score(&self, input: &ScoreInput<'_>, ctx: &ScorerContext) -> f64;

    /// Registry name (upper case)
    fn name(&self) -> &str;
}

// ============================================================================
// Built-in scorers
// ============================================================================

fn tfidf_sum(hits: &[Hit], ctx: &ScorerContext) -> f64 {
    hits.iter()
        .map(|h| h.tf as f64 * ctx.idf(h.doc_freq) * h.weight)
        .sum()
}

/// Document score times the weighted TF-IDF sum
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfScorer;

impl Scorer for TfIdfScorer {
    fn score(&self, input: &ScoreInput<'_>, ctx: &ScorerContext) -> f64 {
        input.doc_score * tfidf_sum(input.hits, ctx)
    }

    fn name(&self) -> &str {
        "TFIDF"
    }
}

/// TF-IDF divided by the document length
#[derive(Debug, Clone, Copy, Default)]
pub struct DocNormScorer;

impl Scorer for DocNormScorer {
    fn score(&self, input: &ScoreInput<'_>, ctx: &ScorerContext) -> f64 {
        input.doc_score * tfidf_sum(input.hits, ctx) / input.doc_len.max(1) as f64
    }

    fn name(&self) -> &str {
        "TFIDF.DOCNORM"
    }
}

/// BM25
///
/// For each hit:
/// score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
///
/// Where:
/// - tf = term frequency in the field
/// - dl = document length
/// - avgdl = average document length
/// - k1 = term saturation parameter (default 1.2)
/// - b = length normalization parameter (default 0.75)
#[derive(Debug, Clone, Copy)]
pub struct BM25Scorer {
    /// k1 parameter: term frequency saturation (default 1.2)
    k1: f64,
    /// b parameter: length normalization (default 0.75)
    b: f64,
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer { k1: 1.2, b: 0.75 }
    }
}

impl BM25Scorer {
    /// Create a BM25 scorer with custom parameters
    pub fn new(k1: f64, b: f64) -> Self {
        BM25Scorer { k1, b }
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, input: &ScoreInput<'_>, ctx: &ScorerContext) -> f64 {
        let doc_len = input.doc_len as f64;
        let avg_len = ctx.avg_doc_len.max(1.0);
        let sum: f64 = input
            .hits
            .iter()
            .map(|h| {
                let tf = h.tf as f64;
                let tf_component =
                    (tf * (self.k1 + 1.0)) / (tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_len));
                ctx.bm25_idf(h.doc_freq) * tf_component * h.weight
            })
            .sum();
        input.doc_score * sum
    }

    fn name(&self) -> &str {
        "BM25"
    }
}

/// The document's own score
#[derive(Debug, Clone, Copy, Default)]
pub struct DocScoreScorer;

impl Scorer for DocScoreScorer {
    fn score(&self, input: &ScoreInput<'_>, _ctx: &ScorerContext) -> f64 {
        input.doc_score
    }

    fn name(&self) -> &str {
        "DOCSCORE"
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Name → scorer map; names are case-insensitive
#[derive(Clone)]
pub struct ScorerRegistry {
    scorers: FxHashMap<String, Arc<dyn Scorer>>,
}

impl std::fmt::Debug for ScorerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerRegistry")
            .field("scorers", &self.names())
            .finish()
    }
}

impl Default for ScorerRegistry {
    fn default() -> Self {
        let mut registry = ScorerRegistry {
            scorers: FxHashMap::default(),
        };
        registry.register(Arc::new(TfIdfScorer));
        registry.register(Arc::new(DocNormScorer));
        registry.register(Arc::new(BM25Scorer::default()));
        registry.register(Arc::new(DocScoreScorer));
        registry
    }
}

impl ScorerRegistry {
    /// Registry with the built-in scorers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a scorer under its name
    pub fn register(&mut self, scorer: Arc<dyn Scorer>) {
        self.scorers.insert(scorer.name().to_ascii_uppercase(), scorer);
    }

    /// Look up a scorer
    pub fn get(&self, name: &str) -> QueryResult<Arc<dyn Scorer>> {
        self.scorers
            .get(&name.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| QueryError::UnknownScorer(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scorers.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Score every match against a view
pub fn score_matches(view: &dyn IndexView, scorer: &dyn Scorer, matches: &[DocMatch]) -> Vec<ScoredDoc> {
    let ctx = ScorerContext::from_view(view);
    matches
        .iter()
        .map(|m| {
            let (doc_len, doc_score) = view
                .doc_meta(m.doc)
                .map_or((0, 1.0), |meta| (meta.len, meta.score));
            let input = ScoreInput {
                hits: &m.hits,
                doc_len,
                doc_score,
            };
            ScoredDoc {
                doc: m.doc,
                score: scorer.score(&input, &ctx),
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

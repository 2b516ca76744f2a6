//! Query processing for Sieve indexes
//!
//! This crate provides:
//! - Tokenizer shared by indexing and query parsing
//! - MultiValueEncoder assigning positions across multi-value fields
//! - Query parser, AST, and the undefined-ordering validation
//! - Evaluator walking posting lists through the IndexView seam
//! - Scorer trait, built-in scorers, and the ScorerRegistry
//! - Sort layer for SORTBY and score ranking
//!
//! # Usage
//!
//! ```ignore
//! use sieve_search::{plan, Evaluator, GlobalProximity};
//!
//! let node = plan("hello world", view.tokenizer(), 2, view.schema(), GlobalProximity::default())?;
//! let evaluation = Evaluator::new(&view, &budget, GlobalProximity::default()).evaluate(&node)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoder;
pub mod error;
pub mod eval;
pub mod query;
pub mod scorer;
pub mod sort;
pub mod tokenizer;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use encoder::{EncodedField, MultiValueEncoder};
pub use error::{QueryError, QueryResult};
pub use eval::{within_slop, DocMatch, Evaluation, Evaluator, Hit};
pub use query::{plan, Attributes, GlobalProximity, NodeKind, QueryNode, QueryParser};
pub use scorer::{
    score_matches, BM25Scorer, DocNormScorer, DocScoreScorer, ScoreInput, Scorer, ScorerContext, ScorerRegistry,
    TfIdfScorer,
};
pub use sort::{page, rank_by_score, sort_by_key, ScoredDoc, SortOrder};
pub use tokenizer::{normalize, Tokenizer, DEFAULT_STOPWORDS};
pub use view::IndexView;

//! Read-only view of one index, as seen by the evaluator
//!
//! The engine implements this over a consistent snapshot: every method
//! answers for the same published version of the index.

use crate::tokenizer::Tokenizer;
use sieve_core::{DocId, FieldIndex, IndexSchema, QueryBudget};
use sieve_storage::{DocMeta, NumBound, PostingList, StorageResult, TermPattern};
use std::sync::Arc;

/// Everything query evaluation needs from an index
pub trait IndexView {
    /// Compiled schema
    fn schema(&self) -> &IndexSchema;

    /// Tokenizer the index was built with
    fn tokenizer(&self) -> &Tokenizer;

    /// Expand a pattern over the TEXT term store
    fn expand_text(&self, pattern: &TermPattern, budget: &QueryBudget) -> StorageResult<Vec<String>>;

    /// Posting list of a TEXT term
    fn text_postings(&self, term: &str) -> Option<Arc<PostingList>>;

    /// Expand a pattern over one TAG field's values
    fn expand_tag(
        &self,
        field: FieldIndex,
        pattern: &TermPattern,
        budget: &QueryBudget,
    ) -> StorageResult<Vec<String>>;

    /// Posting list of one tag value
    fn tag_postings(&self, field: FieldIndex, tag: &str) -> Option<Arc<PostingList>>;

    /// Documents with a value of a NUMERIC field in range, ascending
    fn numeric_range(&self, field: FieldIndex, min: NumBound, max: NumBound) -> Vec<DocId>;

    /// True if the document is visible in this view
    fn is_visible(&self, doc: DocId) -> bool;

    /// Metadata of a visible document
    fn doc_meta(&self, doc: DocId) -> Option<Arc<DocMeta>>;

    /// Every visible document, ascending
    fn all_docs(&self) -> Vec<DocId>;

    /// Number of visible documents
    fn total_docs(&self) -> usize;

    /// Average retained token count
    fn avg_doc_len(&self) -> f64;
}

//! In-memory index fixture for unit tests

use crate::encoder::MultiValueEncoder;
use crate::tokenizer::Tokenizer;
use crate::view::IndexView;
use rustc_hash::FxHashMap;
use sieve_core::{
    resolve_field, DocId, Document, FieldIndex, FieldSpec, FieldValues, IndexDefinition, IndexSchema, QueryBudget,
};
use sieve_storage::{
    DocMeta, DocTable, NumBound, NumericIndex, Posting, PostingList, PostingStore, StorageResult, TermPattern,
    TermStore,
};
use std::sync::Arc;

pub(crate) struct TestIndex {
    schema: IndexSchema,
    tokenizer: Tokenizer,
    delta: u32,
    terms: TermStore,
    postings: PostingStore,
    tags: FxHashMap<FieldIndex, (TermStore, PostingStore)>,
    numbers: FxHashMap<FieldIndex, NumericIndex>,
    docs: DocTable,
}

impl TestIndex {
    pub(crate) fn new(def: IndexDefinition, delta: u32) -> Self {
        let suffix = def.fields.iter().any(|f: &FieldSpec| f.with_suffix_trie);
        TestIndex {
            schema: IndexSchema::compile(&def).unwrap(),
            tokenizer: Tokenizer::for_index(def.stopwords.as_deref()),
            delta,
            terms: TermStore::new(suffix),
            postings: PostingStore::new(),
            tags: FxHashMap::default(),
            numbers: FxHashMap::default(),
            docs: DocTable::new(),
        }
    }

    pub(crate) fn add(&mut self, key: &str, doc: Document) -> DocId {
        let id = self.docs.allocate_id();
        let mut meta = DocMeta::new(key, self.docs.pending_version());
        for field in self.schema.fields() {
            let Ok(Some(resolved)) = resolve_field(field, &doc) else {
                continue;
            };
            match resolved.values {
                FieldValues::Text(values) => {
                    let encoded = MultiValueEncoder::new(&self.tokenizer, self.delta).encode(&values);
                    meta.len += encoded.token_count;
                    for (term, positions) in encoded.terms {
                        self.terms.insert(&term);
                        self.postings.add(&term, Posting::new(id, field.index, positions));
                        meta.terms.push(term);
                    }
                }
                FieldValues::Tag(values) => {
                    let (store, lists) = self.tags.entry(field.index).or_default();
                    for tag in values {
                        store.insert(&tag);
                        lists.add(&tag, Posting::tag(id, field.index));
                    }
                }
                FieldValues::Numeric(values) => {
                    let index = self.numbers.entry(field.index).or_default();
                    for value in values {
                        index.insert(value, id);
                    }
                }
            }
        }
        self.docs.insert(id, meta);
        self.docs.publish();
        id
    }
}

impl IndexView for TestIndex {
    fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    fn expand_text(&self, pattern: &TermPattern, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        self.terms.expand(pattern, budget)
    }

    fn text_postings(&self, term: &str) -> Option<Arc<PostingList>> {
        self.postings.get(term)
    }

    fn expand_tag(&self, field: FieldIndex, pattern: &TermPattern, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        match self.tags.get(&field) {
            Some((store, _)) => store.expand(pattern, budget),
            None => Ok(Vec::new()),
        }
    }

    fn tag_postings(&self, field: FieldIndex, tag: &str) -> Option<Arc<PostingList>> {
        self.tags.get(&field).and_then(|(_, lists)| lists.get(tag))
    }

    fn numeric_range(&self, field: FieldIndex, min: NumBound, max: NumBound) -> Vec<DocId> {
        self.numbers
            .get(&field)
            .map(|n| n.range(min, max))
            .unwrap_or_default()
    }

    fn is_visible(&self, doc: DocId) -> bool {
        self.docs.snapshot().is_visible(doc)
    }

    fn doc_meta(&self, doc: DocId) -> Option<Arc<DocMeta>> {
        self.docs.snapshot().meta(doc)
    }

    fn all_docs(&self) -> Vec<DocId> {
        self.docs.snapshot().all_ids()
    }

    fn total_docs(&self) -> usize {
        self.docs.live_count()
    }

    fn avg_doc_len(&self) -> f64 {
        self.docs.avg_len()
    }
}

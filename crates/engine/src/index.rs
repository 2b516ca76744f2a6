//! One search index: ingestion, snapshot reads, and garbage collection
//!
//! # Layout
//!
//! - TEXT: one term store and posting store shared by every TEXT field;
//!   postings carry the field position
//! - TAG: one term store and posting store per field
//! - NUMERIC: one ordered `(value, doc)` index per field
//! - DocTable: doc ids, per-document metadata, and versioned visibility
//!
//! # Writes
//!
//! Writers are serialized by a per-index mutex. A write allocates a fresh doc
//! id, adds its postings, retires the key's previous version, and publishes
//! both in one version bump. Readers open a [`DocSnapshot`] and filter every
//! posting through it, so they see either the old or the new document.
//!
//! # Garbage collection
//!
//! Retired documents keep their postings until no open snapshot can see
//! them. [`GcMode::Inline`] prunes lists in place under the writer lock.
//! [`GcMode::Concurrent`] builds pruned copies without blocking writers and
//! publishes each with a pointer compare-and-swap; a lost race leaves the
//! documents pending for the next cycle.

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use sieve_core::{
    resolve_field, DocId, Document, FieldIndex, FieldType, FieldValues, GcPolicy, IndexDefinition, IndexSchema,
    QueryBudget, SchemaError, SearchConfig, StorageModel,
};
use sieve_search::{IndexView, MultiValueEncoder, Tokenizer};
use sieve_storage::{
    DocMeta, DocSnapshot, DocTable, NumBound, NumericIndex, Posting, PostingList, PostingStore, Publish,
    StorageResult, TermPattern, TermStore,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ============================================================================
// Term index
// ============================================================================

/// A term trie plus the posting lists of its terms
#[derive(Debug)]
struct TermIndex {
    terms: RwLock<TermStore>,
    postings: PostingStore,
}

impl TermIndex {
    fn new(with_suffix_trie: bool) -> Self {
        TermIndex {
            terms: RwLock::new(TermStore::new(with_suffix_trie)),
            postings: PostingStore::new(),
        }
    }
}

// ============================================================================
// GC bookkeeping
// ============================================================================

/// How a collection cycle touches posting lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcMode {
    /// Prune in place while holding the writer lock
    Inline,
    /// Prune copies and publish with compare-and-swap
    Concurrent,
}

impl From<GcPolicy> for GcMode {
    fn from(policy: GcPolicy) -> Self {
        match policy {
            GcPolicy::Sync => GcMode::Inline,
            GcPolicy::Fork => GcMode::Concurrent,
        }
    }
}

/// Outcome of one collection cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GcRun {
    /// Retired documents released
    pub docs: usize,
    /// Posting entries removed
    pub entries: usize,
    /// Approximate bytes freed
    pub bytes: usize,
    /// False if a lost compare-and-swap deferred the cycle's documents
    pub settled: bool,
    /// Wall time
    pub elapsed: Duration,
}

/// Cumulative GC statistics of an index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GcStats {
    /// Approximate bytes freed
    pub bytes_collected: u64,
    /// Posting entries removed
    pub entries_collected: u64,
    /// Retired documents released
    pub docs_collected: u64,
    /// Cycles run
    pub cycles: u64,
    /// Total time spent collecting
    pub total_ms: u64,
    /// Duration of the most recent cycle
    pub last_run_ms: u64,
}

#[derive(Debug, Default)]
struct GcState {
    stats: GcStats,
    last_run: Option<Instant>,
}

fn prune(store: &PostingStore, term: &str, doomed: &dyn Fn(DocId) -> bool, mode: GcMode, run: &mut GcRun) -> bool {
    match mode {
        GcMode::Inline => {
            let before = store.get(term).map_or(0, |list| list.approx_bytes());
            let (removed, _) = store.prune(term, doomed);
            let after = store.get(term).map_or(0, |list| list.approx_bytes());
            run.entries += removed;
            run.bytes += before.saturating_sub(after);
            true
        }
        GcMode::Concurrent => {
            let Some(snapshot) = store.get(term) else {
                return true;
            };
            let pruned = snapshot.without(doomed);
            let removed = snapshot.len() - pruned.len();
            if removed == 0 {
                return true;
            }
            let bytes = snapshot.approx_bytes().saturating_sub(pruned.approx_bytes());
            match store.publish_if_unchanged(term, &snapshot, pruned) {
                Publish::Replaced | Publish::Removed => {
                    run.entries += removed;
                    run.bytes += bytes;
                    true
                }
                Publish::Conflict => false,
            }
        }
    }
}

// ============================================================================
// Introspection
// ============================================================================

/// One field of an index as reported by INFO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    /// Hash attribute or JSON path
    pub identifier: String,
    /// Query-facing name
    pub attribute: String,
    /// TEXT, TAG, or NUMERIC
    pub field_type: String,
    /// SORTABLE
    pub sortable: bool,
    /// NOINDEX
    pub noindex: bool,
    /// WITHSUFFIXTRIE
    pub with_suffix_trie: bool,
}

/// INFO report of an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Index name
    pub name: String,
    /// HASH or JSON
    pub storage: String,
    /// Key prefixes
    pub prefixes: Vec<String>,
    /// Visible documents
    pub num_docs: usize,
    /// Distinct TEXT terms
    pub num_terms: usize,
    /// Posting entries across TEXT, TAG, and NUMERIC structures
    pub num_records: usize,
    /// Documents that failed to index at least one field
    pub hash_indexing_failures: u64,
    /// Message of the most recent indexing failure
    pub last_indexing_failure: Option<String>,
    /// Idle TTL, if temporary
    pub temporary_secs: Option<u64>,
    /// Garbage collector statistics
    pub gc: GcStats,
    /// Field definitions
    pub fields: Vec<FieldInfo>,
}

// ============================================================================
// Index
// ============================================================================

/// A search index over the keys matching its prefixes
#[derive(Debug)]
pub struct Index {
    definition: IndexDefinition,
    schema: IndexSchema,
    tokenizer: Tokenizer,
    text: TermIndex,
    /// TAG structures by field position
    tags: Vec<Option<TermIndex>>,
    /// NUMERIC structures by field position
    numbers: Vec<Option<RwLock<NumericIndex>>>,
    docs: DocTable,
    writer: Mutex<()>,
    /// Held by any collection cycle; taken after `writer` when both are needed
    gc_lock: Mutex<()>,
    gc: Mutex<GcState>,
    failures: AtomicU64,
    last_failure: Mutex<Option<String>>,
    last_access: Mutex<Instant>,
}

impl Index {
    /// Compile a definition into an empty index
    pub fn new(definition: IndexDefinition) -> Result<Self, SchemaError> {
        let schema = IndexSchema::compile(&definition)?;
        let tokenizer = Tokenizer::for_index(definition.stopwords.as_deref());
        let text_suffixes = schema
            .fields_of(FieldType::Text)
            .any(|f| f.spec.with_suffix_trie);
        let tags = schema
            .fields()
            .iter()
            .map(|f| (f.field_type() == FieldType::Tag).then(|| TermIndex::new(f.spec.with_suffix_trie)))
            .collect();
        let numbers = schema
            .fields()
            .iter()
            .map(|f| (f.field_type() == FieldType::Numeric).then(|| RwLock::new(NumericIndex::new())))
            .collect();

        Ok(Index {
            definition,
            schema,
            tokenizer,
            text: TermIndex::new(text_suffixes),
            tags,
            numbers,
            docs: DocTable::new(),
            writer: Mutex::new(()),
            gc_lock: Mutex::new(()),
            gc: Mutex::new(GcState::default()),
            failures: AtomicU64::new(0),
            last_failure: Mutex::new(None),
            last_access: Mutex::new(Instant::now()),
        })
    }

    /// Index name
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Definition as created
    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    /// Compiled schema
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// True if writes to `key` concern this index
    pub fn covers(&self, key: &str) -> bool {
        self.definition.matches_key(key)
    }

    fn tag_index(&self, field: FieldIndex) -> Option<&TermIndex> {
        self.tags.get(field as usize).and_then(Option::as_ref)
    }

    fn numeric_index(&self, field: FieldIndex) -> Option<&RwLock<NumericIndex>> {
        self.numbers.get(field as usize).and_then(Option::as_ref)
    }

    // ========================================================================
    // Idle TTL
    // ========================================================================

    /// Reset the idle clock
    pub fn touch(&self) {
        *self.last_access.lock() = Instant::now();
    }

    /// Idle TTL of a temporary index
    pub fn idle_ttl(&self) -> Option<Duration> {
        self.definition.temporary_secs.map(Duration::from_secs)
    }

    /// Time left before a temporary index expires
    pub fn remaining_ttl(&self, now: Instant) -> Option<Duration> {
        let ttl = self.idle_ttl()?;
        let idle = now.saturating_duration_since(*self.last_access.lock());
        Some(ttl.saturating_sub(idle))
    }

    /// True once a temporary index has been idle for its whole TTL
    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining_ttl(now).map_or(false, |left| left.is_zero())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    fn accepts(&self, doc: &Document) -> bool {
        matches!(
            (self.schema.storage(), doc),
            (StorageModel::Hash, Document::Hash(_)) | (StorageModel::Json, Document::Json(_))
        )
    }

    /// Index (or re-index) the document stored under `key`
    pub fn index_document(&self, key: &str, doc: &Document, config: &SearchConfig) {
        let _writer = self.writer.lock();
        if !self.accepts(doc) {
            // The key changed kind; it no longer belongs to this index
            if self.docs.retire_key(key).is_some() {
                self.docs.publish();
                self.after_delete(config);
            }
            return;
        }

        let id = self.docs.allocate_id();
        let mut meta = DocMeta::new(key, self.docs.pending_version());
        meta.score = self.definition.default_score;
        meta.sort_keys = vec![None; self.schema.fields().len()];

        let encoder = MultiValueEncoder::new(&self.tokenizer, config.multi_text_offset_delta);
        let mut text_terms = BTreeSet::new();
        let mut failure = None;

        for field in self.schema.fields() {
            let resolved = match resolve_field(field, doc) {
                Ok(Some(resolved)) => resolved,
                Ok(None) => continue,
                Err(err) => {
                    failure.get_or_insert(err);
                    continue;
                }
            };
            if field.spec.sortable {
                meta.sort_keys[field.index as usize] = resolved.values.sort_key();
            }
            if field.spec.noindex {
                continue;
            }

            match &resolved.values {
                FieldValues::Text(values) => {
                    let encoded = encoder.encode(values);
                    meta.len += encoded.token_count;
                    for (term, positions) in encoded.terms {
                        self.text.postings.add(&term, Posting::new(id, field.index, positions));
                        text_terms.insert(term);
                    }
                }
                FieldValues::Tag(values) => {
                    let Some(tags) = self.tag_index(field.index) else {
                        continue;
                    };
                    let distinct: BTreeSet<&String> = values.iter().collect();
                    let mut terms = tags.terms.write();
                    for tag in distinct {
                        tags.postings.add(tag, Posting::tag(id, field.index));
                        terms.insert(tag);
                        meta.tags.push((field.index, tag.clone()));
                    }
                }
                FieldValues::Numeric(values) => {
                    let Some(numbers) = self.numeric_index(field.index) else {
                        continue;
                    };
                    let mut numbers = numbers.write();
                    for &value in values {
                        numbers.insert(value, id);
                        meta.numbers.push((field.index, value));
                    }
                }
            }
        }

        {
            let mut terms = self.text.terms.write();
            for term in &text_terms {
                terms.insert(term);
            }
        }
        meta.terms = text_terms.into_iter().collect();

        if let Some(err) = failure {
            self.failures.fetch_add(1, Ordering::Relaxed);
            warn!(
                target: "sieve::index",
                index = %self.definition.name,
                key = %key,
                field = %err.field(),
                error = %err,
                "Indexing failure"
            );
            *self.last_failure.lock() = Some(err.to_string());
        }

        let replaced = self.docs.retire_key(key).is_some();
        self.docs.insert(id, meta);
        self.docs.publish();
        if replaced {
            self.after_delete(config);
        }
    }

    /// Remove the document stored under `key`; true if it was indexed
    pub fn delete_document(&self, key: &str, config: &SearchConfig) -> bool {
        let _writer = self.writer.lock();
        if self.docs.retire_key(key).is_none() {
            return false;
        }
        self.docs.publish();
        self.after_delete(config);
        true
    }

    /// Inline collection for SYNC; caller holds the writer lock
    fn after_delete(&self, config: &SearchConfig) {
        if config.gc_policy == GcPolicy::Sync {
            self.collect(GcMode::Inline);
        }
    }

    // ========================================================================
    // Garbage collection
    // ========================================================================

    /// Retired documents not yet collected
    pub fn pending_garbage(&self) -> usize {
        self.docs.pending_garbage()
    }

    /// True if the background sweeper should collect this index now
    pub fn gc_due(&self, config: &SearchConfig, now: Instant) -> bool {
        let pending = self.docs.pending_garbage();
        if pending == 0 {
            return false;
        }
        match config.gc_policy {
            // Leftovers that were still visible to a reader during the delete
            GcPolicy::Sync => true,
            GcPolicy::Fork => {
                let interval_elapsed = self
                    .gc
                    .lock()
                    .last_run
                    .map_or(true, |last| now.saturating_duration_since(last) >= config.gc_interval());
                interval_elapsed && pending >= config.fork_gc_clean_threshold
            }
        }
    }

    /// Run one collection cycle
    pub fn collect_garbage(&self, mode: GcMode) -> GcRun {
        match mode {
            GcMode::Inline => {
                let _writer = self.writer.lock();
                self.collect(mode)
            }
            GcMode::Concurrent => self.collect(mode),
        }
    }

    fn collect(&self, mode: GcMode) -> GcRun {
        let _gc = self.gc_lock.lock();
        let started = Instant::now();
        let garbage = self.docs.collectable();
        let mut run = GcRun {
            settled: true,
            ..GcRun::default()
        };

        if !garbage.is_empty() {
            let doomed: FxHashSet<DocId> = garbage.iter().map(|(id, _)| *id).collect();
            let is_doomed = |doc: DocId| doomed.contains(&doc);

            let mut text_terms: BTreeMap<&str, u32> = BTreeMap::new();
            let mut tag_terms: BTreeMap<(FieldIndex, &str), u32> = BTreeMap::new();
            for (_, meta) in &garbage {
                for term in &meta.terms {
                    *text_terms.entry(term.as_str()).or_insert(0) += 1;
                }
                for (field, tag) in &meta.tags {
                    *tag_terms.entry((*field, tag.as_str())).or_insert(0) += 1;
                }
            }

            for term in text_terms.keys() {
                run.settled &= prune(&self.text.postings, term, &is_doomed, mode, &mut run);
            }
            for (field, tag) in tag_terms.keys() {
                if let Some(tags) = self.tag_index(*field) {
                    run.settled &= prune(&tags.postings, tag, &is_doomed, mode, &mut run);
                }
            }

            if run.settled {
                {
                    let mut terms = self.text.terms.write();
                    for (term, docs) in &text_terms {
                        terms.release(term, *docs);
                    }
                }
                for ((field, tag), docs) in &tag_terms {
                    if let Some(tags) = self.tag_index(*field) {
                        tags.terms.write().release(tag, *docs);
                    }
                }
                for (id, meta) in &garbage {
                    for (field, value) in &meta.numbers {
                        if let Some(numbers) = self.numeric_index(*field) {
                            if numbers.write().remove(*value, *id) {
                                run.entries += 1;
                            }
                        }
                    }
                }
                let ids: Vec<DocId> = garbage.iter().map(|(id, _)| *id).collect();
                self.docs.forget(&ids);
                run.docs = ids.len();
            } else {
                debug!(
                    target: "sieve::gc",
                    index = %self.definition.name,
                    pending = garbage.len(),
                    "posting list changed during collection; retrying next cycle"
                );
            }
        }

        run.elapsed = started.elapsed();
        let elapsed_ms = run.elapsed.as_millis() as u64;
        {
            let mut gc = self.gc.lock();
            gc.last_run = Some(Instant::now());
            gc.stats.cycles += 1;
            gc.stats.docs_collected += run.docs as u64;
            gc.stats.entries_collected += run.entries as u64;
            gc.stats.bytes_collected += run.bytes as u64;
            gc.stats.total_ms += elapsed_ms;
            gc.stats.last_run_ms = elapsed_ms;
        }
        if run.docs > 0 || run.entries > 0 {
            info!(
                target: "sieve::gc",
                index = %self.definition.name,
                docs = run.docs,
                entries = run.entries,
                bytes = run.bytes,
                elapsed_ms,
                "GC cycle"
            );
        }
        run
    }

    /// Cumulative GC statistics
    pub fn gc_stats(&self) -> GcStats {
        self.gc.lock().stats.clone()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Open a consistent reader at the current version
    pub fn reader(&self) -> IndexReader<'_> {
        IndexReader {
            index: self,
            snapshot: self.docs.snapshot(),
        }
    }

    /// Live documents
    pub fn num_docs(&self) -> usize {
        self.docs.live_count()
    }

    /// Documents that failed to index at least one field
    pub fn indexing_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// INFO report
    pub fn info(&self) -> IndexInfo {
        let tag_records: usize = self.tags.iter().flatten().map(|t| t.postings.total_entries()).sum();
        let numeric_records: usize = self.numbers.iter().flatten().map(|n| n.read().len()).sum();
        IndexInfo {
            name: self.definition.name.clone(),
            storage: self.schema.storage().to_string(),
            prefixes: self.definition.prefixes.clone(),
            num_docs: self.num_docs(),
            num_terms: self.text.terms.read().len(),
            num_records: self.text.postings.total_entries() + tag_records + numeric_records,
            hash_indexing_failures: self.indexing_failures(),
            last_indexing_failure: self.last_failure.lock().clone(),
            temporary_secs: self.definition.temporary_secs,
            gc: self.gc_stats(),
            fields: self
                .schema
                .fields()
                .iter()
                .map(|f| FieldInfo {
                    identifier: f.spec.path.clone(),
                    attribute: f.name().to_string(),
                    field_type: f.field_type().to_string(),
                    sortable: f.spec.sortable,
                    noindex: f.spec.noindex,
                    with_suffix_trie: f.spec.with_suffix_trie,
                })
                .collect(),
        }
    }
}

// ============================================================================
// IndexReader
// ============================================================================

/// An [`IndexView`] pinned to one published version
pub struct IndexReader<'a> {
    index: &'a Index,
    snapshot: DocSnapshot<'a>,
}

impl IndexReader<'_> {
    /// Version this reader sees
    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }
}

impl IndexView for IndexReader<'_> {
    fn schema(&self) -> &IndexSchema {
        &self.index.schema
    }

    fn tokenizer(&self) -> &Tokenizer {
        &self.index.tokenizer
    }

    fn expand_text(&self, pattern: &TermPattern, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        self.index.text.terms.read().expand(pattern, budget)
    }

    fn text_postings(&self, term: &str) -> Option<Arc<PostingList>> {
        self.index.text.postings.get(term)
    }

    fn expand_tag(&self, field: FieldIndex, pattern: &TermPattern, budget: &QueryBudget) -> StorageResult<Vec<String>> {
        match self.index.tag_index(field) {
            Some(tags) => tags.terms.read().expand(pattern, budget),
            None => Ok(Vec::new()),
        }
    }

    fn tag_postings(&self, field: FieldIndex, tag: &str) -> Option<Arc<PostingList>> {
        self.index.tag_index(field)?.postings.get(tag)
    }

    fn numeric_range(&self, field: FieldIndex, min: NumBound, max: NumBound) -> Vec<DocId> {
        self.index
            .numeric_index(field)
            .map_or_else(Vec::new, |numbers| numbers.read().range(min, max))
    }

    fn is_visible(&self, doc: DocId) -> bool {
        self.snapshot.is_visible(doc)
    }

    fn doc_meta(&self, doc: DocId) -> Option<Arc<DocMeta>> {
        self.snapshot.meta(doc)
    }

    fn all_docs(&self) -> Vec<DocId> {
        self.snapshot.all_ids()
    }

    fn total_docs(&self) -> usize {
        self.snapshot.doc_count()
    }

    fn avg_doc_len(&self) -> f64 {
        self.index.docs.avg_len()
    }
}

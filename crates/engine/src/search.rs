//! SEARCH execution
//!
//! Plan → evaluate against one snapshot → score → order → page → project.

use crate::error::{Error, Result};
use crate::index::{Index, IndexReader};
use crate::keyspace::DocumentSource;
use crate::project::{all_fields, named_value, sort_key_of};
use serde::{Deserialize, Serialize};
use sieve_core::config::MAX_DIALECT;
use sieve_core::{Document, IndexSchema, QueryBudget, SearchConfig};
use sieve_search::{
    page, plan, rank_by_score, score_matches, sort_by_key, DocMatch, Evaluation, Evaluator, GlobalProximity,
    IndexView, QueryError, ScorerRegistry, SortOrder,
};
use tracing::debug;

/// Results per page when LIMIT is not given
pub const DEFAULT_LIMIT: usize = 10;

/// A RETURN entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnField {
    /// Field name, alias, hash attribute, or JSON path
    pub name: String,
    /// Output name
    pub alias: Option<String>,
}

/// Options of one search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query string
    pub query: String,
    /// LIMIT offset
    pub offset: usize,
    /// LIMIT count
    pub count: usize,
    /// SORTBY field and direction
    pub sort_by: Option<(String, SortOrder)>,
    /// RETURN list
    pub return_fields: Option<Vec<ReturnField>>,
    /// NOCONTENT
    pub no_content: bool,
    /// WITHSCORES
    pub with_scores: bool,
    /// SCORER
    pub scorer: Option<String>,
    /// SLOP
    pub slop: Option<u32>,
    /// INORDER
    pub inorder: bool,
    /// DIALECT
    pub dialect: Option<u32>,
}

impl SearchRequest {
    /// Search with default options
    pub fn new(query: impl Into<String>) -> Self {
        SearchRequest {
            query: query.into(),
            offset: 0,
            count: DEFAULT_LIMIT,
            sort_by: None,
            return_fields: None,
            no_content: false,
            with_scores: false,
            scorer: None,
            slop: None,
            inorder: false,
            dialect: None,
        }
    }

    /// Builder: LIMIT
    pub fn limit(mut self, offset: usize, count: usize) -> Self {
        self.offset = offset;
        self.count = count;
        self
    }

    /// Builder: SORTBY
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some((field.into(), order));
        self
    }

    /// Builder: add a RETURN field
    pub fn return_field(mut self, name: impl Into<String>, alias: Option<&str>) -> Self {
        self.return_fields.get_or_insert_with(Vec::new).push(ReturnField {
            name: name.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    /// Builder: NOCONTENT
    pub fn no_content(mut self) -> Self {
        self.no_content = true;
        self
    }

    /// Builder: WITHSCORES
    pub fn with_scores(mut self) -> Self {
        self.with_scores = true;
        self
    }

    /// Builder: SCORER
    pub fn scorer(mut self, name: impl Into<String>) -> Self {
        self.scorer = Some(name.into());
        self
    }

    /// Builder: SLOP
    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = Some(slop);
        self
    }

    /// Builder: INORDER
    pub fn inorder(mut self) -> Self {
        self.inorder = true;
        self
    }

    /// Builder: DIALECT
    pub fn dialect(mut self, dialect: u32) -> Self {
        self.dialect = Some(dialect);
        self
    }

    fn proximity(&self) -> GlobalProximity {
        GlobalProximity {
            slop: self.slop,
            inorder: self.inorder,
        }
    }
}

/// One returned document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document key
    pub key: String,
    /// Score, with WITHSCORES
    pub score: Option<f64>,
    /// Projected fields; `None` with NOCONTENT
    pub fields: Option<Vec<(String, String)>>,
}

/// Result of a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matches before LIMIT
    pub total: usize,
    /// The requested page
    pub hits: Vec<SearchHit>,
    /// The query ran out of time and returned no results
    pub timed_out: bool,
    /// A pattern expansion hit MAXEXPANSIONS and was cut short
    pub truncated: bool,
}

impl SearchResponse {
    fn timed_out() -> Self {
        SearchResponse {
            total: 0,
            hits: Vec::new(),
            timed_out: true,
            truncated: false,
        }
    }

    /// Keys of the returned page, in order
    pub fn keys(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.key.as_str()).collect()
    }
}

/// Dialect a query runs under
pub(crate) fn resolve_dialect(requested: Option<u32>, config: &SearchConfig) -> Result<u32> {
    let dialect = requested.unwrap_or(config.default_dialect);
    if dialect == 0 || dialect > MAX_DIALECT {
        return Err(Error::invalid(format!(
            "DIALECT requires a value between 1 and {}",
            MAX_DIALECT
        )));
    }
    Ok(dialect)
}

/// Plan and evaluate; `None` when the query timed out under ON_TIMEOUT RETURN
pub(crate) fn evaluate(
    reader: &IndexReader<'_>,
    query: &str,
    dialect: u32,
    global: GlobalProximity,
    budget: &QueryBudget,
) -> Result<Option<Evaluation>> {
    let node = plan(query, reader.tokenizer(), dialect, reader.schema(), global)?;
    match Evaluator::new(reader, budget, global).evaluate(&node) {
        Ok(evaluation) => Ok(Some(evaluation)),
        Err(QueryError::Timeout) if !budget.fails_on_limit() => {
            debug!(target: "sieve::query", query, "query timed out; returning no results");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Drop matches whose backing key was deleted or expired after indexing
pub(crate) fn live_matches(
    reader: &IndexReader<'_>,
    matches: Vec<DocMatch>,
    source: &dyn DocumentSource,
) -> Vec<DocMatch> {
    matches
        .into_iter()
        .filter(|m| reader.doc_meta(m.doc).map_or(false, |meta| source.contains(&meta.key)))
        .collect()
}

fn project(schema: &IndexSchema, request: &SearchRequest, doc: Option<Document>) -> Vec<(String, String)> {
    let Some(doc) = doc else {
        return Vec::new();
    };
    match &request.return_fields {
        Some(fields) => fields
            .iter()
            .filter_map(|field| {
                let value = named_value(schema, &field.name, &doc)?;
                let name = field.alias.clone().unwrap_or_else(|| field.name.clone());
                Some((name, value))
            })
            .collect(),
        None => all_fields(&doc),
    }
}

/// Run a search against one index
pub fn execute_search(
    index: &Index,
    request: &SearchRequest,
    config: &SearchConfig,
    scorers: &ScorerRegistry,
    source: &dyn DocumentSource,
) -> Result<SearchResponse> {
    search_within(index, request, config, scorers, source, &QueryBudget::from_config(config))
}

/// Run a search under an explicit budget
pub(crate) fn search_within(
    index: &Index,
    request: &SearchRequest,
    config: &SearchConfig,
    scorers: &ScorerRegistry,
    source: &dyn DocumentSource,
    budget: &QueryBudget,
) -> Result<SearchResponse> {
    let dialect = resolve_dialect(request.dialect, config)?;
    let scorer = scorers.get(request.scorer.as_deref().unwrap_or(&config.default_scorer))?;
    let sort = match &request.sort_by {
        Some((name, order)) => {
            let field = index
                .schema()
                .field_by_name_or_path(name)
                .ok_or_else(|| QueryError::UnknownField(name.clone()))?;
            Some((field, *order))
        }
        None => None,
    };

    let reader = index.reader();
    let Some(evaluation) = evaluate(&reader, &request.query, dialect, request.proximity(), budget)? else {
        return Ok(SearchResponse::timed_out());
    };

    let live = live_matches(&reader, evaluation.matches, source);
    let mut scored = score_matches(&reader, scorer.as_ref(), &live);
    let ordered = match sort {
        Some((field, order)) => sort_by_key(scored, order, |doc| {
            let meta = reader.doc_meta(doc)?;
            if field.spec.sortable {
                meta.sort_key(field.index).cloned()
            } else {
                source.load(&meta.key).and_then(|d| sort_key_of(field, &d))
            }
        }),
        None => {
            rank_by_score(&mut scored);
            scored
        }
    };

    let hits = page(&ordered, request.offset, request.count)
        .iter()
        .filter_map(|scored| {
            let meta = reader.doc_meta(scored.doc)?;
            let fields = (!request.no_content).then(|| project(index.schema(), request, source.load(&meta.key)));
            Some(SearchHit {
                key: meta.key.clone(),
                score: request.with_scores.then_some(scored.score),
                fields,
            })
        })
        .collect();

    Ok(SearchResponse {
        total: ordered.len(),
        hits,
        timed_out: false,
        truncated: evaluation.truncated,
    })
}

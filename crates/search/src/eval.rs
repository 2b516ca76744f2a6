//! Query evaluation over posting lists
//!
//! Each node evaluates to an ordered map of matching documents, each with the
//! term hits that made it match. Hits carry positions, so a phrase node can
//! check slop and inorder per field after intersecting its children, and the
//! scorer later sees every term occurrence that contributed.
//!
//! The deadline is polled on the first posting visit and then every
//! [`sieve_core::budget::CHECK_INTERVAL`] visits.

use crate::error::{QueryError, QueryResult};
use crate::query::{GlobalProximity, NodeKind, QueryNode, TagValue};
use crate::view::IndexView;
use rustc_hash::FxHashSet;
use sieve_core::document::normalize_tag;
use sieve_core::{DocId, FieldIndex, FieldType, IndexSchema, Position, QueryBudget, SchemaField};
use sieve_storage::{NumBound, PostingList, StorageError, StorageResult, TermPattern};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// Results
// ============================================================================

/// One term occurrence set in one field of a matching document
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Field the term occurred in
    pub field: FieldIndex,
    /// Term frequency in that field
    pub tf: u32,
    /// Documents containing the term
    pub doc_freq: usize,
    /// Field weight times node weights
    pub weight: f64,
    /// Token positions (empty for tags)
    pub positions: SmallVec<[Position; 4]>,
}

/// A matching document and the hits that matched it
#[derive(Debug, Clone, PartialEq)]
pub struct DocMatch {
    /// Document
    pub doc: DocId,
    /// Contributing hits
    pub hits: Vec<Hit>,
}

/// Outcome of evaluating a whole query
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Matches ordered by doc id
    pub matches: Vec<DocMatch>,
    /// True if some expansion was cut at MAXEXPANSIONS
    pub truncated: bool,
}

type Matches = BTreeMap<DocId, Vec<Hit>>;

// ============================================================================
// Evaluator
// ============================================================================

/// Walks a validated query tree against an index view
pub struct Evaluator<'a> {
    view: &'a dyn IndexView,
    budget: &'a QueryBudget,
    global: GlobalProximity,
    steps: usize,
    truncated: bool,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator for one query
    pub fn new(view: &'a dyn IndexView, budget: &'a QueryBudget, global: GlobalProximity) -> Self {
        Evaluator {
            view,
            budget,
            global,
            steps: 0,
            truncated: false,
        }
    }

    /// Evaluate the tree
    pub fn evaluate(mut self, root: &QueryNode) -> QueryResult<Evaluation> {
        let matches = self.eval(root, 1.0)?;
        Ok(Evaluation {
            matches: matches
                .into_iter()
                .map(|(doc, hits)| DocMatch { doc, hits })
                .collect(),
            truncated: self.truncated,
        })
    }

    fn tick(&mut self) -> QueryResult<()> {
        let due = self.budget.check_time(self.steps);
        self.steps += 1;
        if due {
            return Err(QueryError::Timeout);
        }
        Ok(())
    }

    /// Apply the truncate-or-fail policy to an expansion
    fn expand(&mut self, result: StorageResult<Vec<String>>) -> QueryResult<Vec<String>> {
        match result {
            Ok(terms) => Ok(terms),
            Err(StorageError::ExpansionLimit { limit, partial }) if !self.budget.fails_on_limit() => {
                debug!(target: "sieve::query", limit, kept = partial.len(), "expansion truncated");
                self.truncated = true;
                Ok(partial)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn eval(&mut self, node: &QueryNode, weight: f64) -> QueryResult<Matches> {
        let weight = weight * node.attrs.weight.unwrap_or(1.0);
        match &node.kind {
            NodeKind::Universe => {
                let mut out = Matches::new();
                for doc in self.view.all_docs() {
                    self.tick()?;
                    out.insert(doc, Vec::new());
                }
                Ok(out)
            }
            NodeKind::Null => Ok(Matches::new()),
            NodeKind::Term { pattern, fields } => self.term(pattern, fields.as_deref(), weight),
            NodeKind::Phrase { children, exact, fields: _ } => self.phrase(node, children, *exact, weight),
            NodeKind::Union(children) => {
                let mut out = Matches::new();
                for child in children {
                    for (doc, hits) in self.eval(child, weight)? {
                        self.tick()?;
                        out.entry(doc).or_default().extend(hits);
                    }
                }
                Ok(out)
            }
            NodeKind::Not(inner) => {
                let excluded = self.eval(inner, weight)?;
                let mut out = Matches::new();
                for doc in self.view.all_docs() {
                    self.tick()?;
                    if !excluded.contains_key(&doc) {
                        out.insert(doc, Vec::new());
                    }
                }
                Ok(out)
            }
            NodeKind::Tag { field, values } => self.tag(field, values, weight),
            NodeKind::Numeric { field, min, max } => self.numeric(field, *min, *max),
        }
    }

    fn term(&mut self, pattern: &TermPattern, fields: Option<&[String]>, weight: f64) -> QueryResult<Matches> {
        let view = self.view;
        let allowed = text_fields(view.schema(), fields);
        let mut out = Matches::new();
        if allowed.is_empty() {
            return Ok(out);
        }
        let expanded = view.expand_text(pattern, self.budget);
        for term in self.expand(expanded)? {
            if let Some(list) = view.text_postings(&term) {
                self.collect(&list, Some(&allowed), weight, &mut out)?;
            }
        }
        Ok(out)
    }

    fn collect(
        &mut self,
        list: &PostingList,
        allowed: Option<&FxHashSet<FieldIndex>>,
        weight: f64,
        out: &mut Matches,
    ) -> QueryResult<()> {
        let view = self.view;
        let doc_freq = list.doc_count();
        for posting in list.entries() {
            self.tick()?;
            if allowed.map_or(false, |a| !a.contains(&posting.field)) || !view.is_visible(posting.doc_id) {
                continue;
            }
            let field_weight = view.schema().get(posting.field).map_or(1.0, |f| f.spec.weight);
            out.entry(posting.doc_id).or_default().push(Hit {
                field: posting.field,
                tf: posting.tf,
                doc_freq,
                weight: weight * field_weight,
                positions: posting.positions.clone(),
            });
        }
        Ok(())
    }

    fn phrase(&mut self, node: &QueryNode, children: &[QueryNode], exact: bool, weight: f64) -> QueryResult<Matches> {
        let slop = node
            .attrs
            .slop
            .or(if exact { Some(0) } else { None })
            .or(self.global.slop);
        let inorder = node
            .attrs
            .inorder
            .or(if exact { Some(true) } else { None })
            .unwrap_or(self.global.inorder);
        let positional = slop.is_some() || inorder;

        let mut results: Vec<Matches> = Vec::with_capacity(children.len());
        for child in children {
            let matched = self.eval(child, weight)?;
            if matched.is_empty() {
                return Ok(Matches::new());
            }
            results.push(matched);
        }
        let driver = results
            .iter()
            .enumerate()
            .min_by_key(|(_, m)| m.len())
            .map_or(0, |(i, _)| i);
        let candidates: Vec<DocId> = match results.get(driver) {
            Some(m) => m.keys().copied().collect(),
            None => return Ok(Matches::new()),
        };

        let mut out = Matches::new();
        'docs: for doc in candidates {
            self.tick()?;
            let mut per_child: Vec<&Vec<Hit>> = Vec::with_capacity(results.len());
            for result in &results {
                match result.get(&doc) {
                    Some(hits) => per_child.push(hits),
                    None => continue 'docs,
                }
            }
            if positional && !proximity_ok(&per_child, slop, inorder) {
                continue;
            }
            let hits = per_child.into_iter().flat_map(|h| h.iter().cloned()).collect();
            out.insert(doc, hits);
        }
        Ok(out)
    }

    fn tag(&mut self, name: &str, values: &[TagValue], weight: f64) -> QueryResult<Matches> {
        let view = self.view;
        let field = lookup(view.schema(), name, FieldType::Tag)?;
        let mut out = Matches::new();
        for value in values {
            let Some(normalized) = normalize_tag(field, &value.raw) else {
                continue;
            };
            let tags = match value.pattern(normalized) {
                TermPattern::Exact(tag) => vec![tag],
                pattern => {
                    let expanded = view.expand_tag(field.index, &pattern, self.budget);
                    self.expand(expanded)?
                }
            };
            for tag in tags {
                if let Some(list) = view.tag_postings(field.index, &tag) {
                    self.collect(&list, None, weight, &mut out)?;
                }
            }
        }
        Ok(out)
    }

    fn numeric(&mut self, name: &str, min: NumBound, max: NumBound) -> QueryResult<Matches> {
        let view = self.view;
        let field = lookup(view.schema(), name, FieldType::Numeric)?;
        let mut out = Matches::new();
        for doc in view.numeric_range(field.index, min, max) {
            self.tick()?;
            if view.is_visible(doc) {
                out.insert(doc, Vec::new());
            }
        }
        Ok(out)
    }
}

fn lookup<'s>(schema: &'s IndexSchema, name: &str, want: FieldType) -> QueryResult<&'s SchemaField> {
    let field = schema
        .field_by_name_or_path(name)
        .ok_or_else(|| QueryError::UnknownField(name.to_string()))?;
    if field.field_type() != want {
        return Err(QueryError::WrongFieldType {
            field: name.to_string(),
            expected: match want {
                FieldType::Text => "TEXT",
                FieldType::Tag => "TAG",
                FieldType::Numeric => "NUMERIC",
            },
        });
    }
    Ok(field)
}

/// TEXT fields a term may match; unknown names are ignored
fn text_fields(schema: &IndexSchema, fields: Option<&[String]>) -> FxHashSet<FieldIndex> {
    match fields {
        Some(names) => names
            .iter()
            .filter_map(|n| schema.field_by_name_or_path(n))
            .filter(|f| f.field_type() == FieldType::Text)
            .map(|f| f.index)
            .collect(),
        None => schema
            .fields_of(FieldType::Text)
            .filter(|f| !f.spec.noindex)
            .map(|f| f.index)
            .collect(),
    }
}

// ============================================================================
// Proximity
// ============================================================================

/// Check slop/inorder for one document, field by field
fn proximity_ok(per_child: &[&Vec<Hit>], slop: Option<u32>, inorder: bool) -> bool {
    let positional: Vec<&Vec<Hit>> = per_child
        .iter()
        .copied()
        .filter(|hits| hits.iter().any(|h| !h.positions.is_empty()))
        .collect();
    if positional.len() < 2 {
        return true;
    }

    let mut fields: Vec<FieldIndex> = positional[0]
        .iter()
        .filter(|h| !h.positions.is_empty())
        .map(|h| h.field)
        .collect();
    fields.sort_unstable();
    fields.dedup();

    fields.into_iter().any(|field| {
        let lists: Vec<Vec<Position>> = positional
            .iter()
            .map(|hits| {
                let mut p: Vec<Position> = hits
                    .iter()
                    .filter(|h| h.field == field)
                    .flat_map(|h| h.positions.iter().copied())
                    .collect();
                p.sort_unstable();
                p.dedup();
                p
            })
            .collect();
        within_slop(&lists, slop, inorder)
    })
}

/// True if one position per list satisfies the constraint
///
/// Slop counts the positions between the chosen ones that belong to none of
/// them: `max - min + 1 - k`. `None` means unbounded.
pub fn within_slop(lists: &[Vec<Position>], slop: Option<u32>, inorder: bool) -> bool {
    if lists.iter().any(Vec::is_empty) {
        return false;
    }
    let k = lists.len() as i64;
    let fits = |min: Position, max: Position| {
        slop.map_or(true, |s| max as i64 - min as i64 + 1 - k <= s as i64)
    };

    if inorder {
        for &start in &lists[0] {
            let mut prev = start;
            for list in &lists[1..] {
                let next = list.partition_point(|&p| p <= prev);
                match list.get(next) {
                    Some(&p) => prev = p,
                    // Later starts cannot find a successor either
                    None => return false,
                }
            }
            if fits(start, prev) {
                return true;
            }
        }
        return false;
    }

    let mut cursor = vec![0usize; lists.len()];
    loop {
        let mut min = (Position::MAX, 0usize);
        let mut max = 0;
        for (i, list) in lists.iter().enumerate() {
            let p = list[cursor[i]];
            if p < min.0 {
                min = (p, i);
            }
            max = max.max(p);
        }
        if fits(min.0, max) {
            return true;
        }
        cursor[min.1] += 1;
        if cursor[min.1] >= lists[min.1].len() {
            return false;
        }
    }
}

//! AGGREGATE execution
//!
//! The pipeline is fixed: query → LOAD → GROUPBY/REDUCE → SORTBY → LIMIT.
//! Rows are string maps; reducers parse numbers where they need them and
//! skip values that do not parse.

use crate::error::Result;
use crate::index::Index;
use crate::keyspace::DocumentSource;
use crate::project::{bare_name, named_value};
use crate::search::{evaluate, live_matches, resolve_dialect};
use serde::{Deserialize, Serialize};
use sieve_core::{QueryBudget, SearchConfig};
use sieve_search::{page, GlobalProximity, IndexView, SortOrder};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// One output row
pub type Row = BTreeMap<String, String>;

/// Reduce function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reducer {
    /// Rows in the group
    Count,
    /// Distinct values of a field
    CountDistinct(String),
    /// Sum of a numeric field
    Sum(String),
    /// Minimum of a numeric field
    Min(String),
    /// Maximum of a numeric field
    Max(String),
    /// Mean of a numeric field
    Avg(String),
}

impl Reducer {
    /// Parse `name` with its single argument (ignored by COUNT)
    pub fn parse(name: &str, arg: Option<&str>) -> Option<Self> {
        let field = || arg.map(|a| bare_name(a).to_string());
        Some(match name.to_ascii_uppercase().as_str() {
            "COUNT" => Reducer::Count,
            "COUNT_DISTINCT" => Reducer::CountDistinct(field()?),
            "SUM" => Reducer::Sum(field()?),
            "MIN" => Reducer::Min(field()?),
            "MAX" => Reducer::Max(field()?),
            "AVG" => Reducer::Avg(field()?),
            _ => return None,
        })
    }

    fn field(&self) -> Option<&str> {
        match self {
            Reducer::Count => None,
            Reducer::CountDistinct(f) | Reducer::Sum(f) | Reducer::Min(f) | Reducer::Max(f) | Reducer::Avg(f) => {
                Some(f)
            }
        }
    }

    fn default_name(&self) -> String {
        match self {
            Reducer::Count => "count".to_string(),
            Reducer::CountDistinct(f) => format!("count_distinct_{}", f),
            Reducer::Sum(f) => format!("sum_{}", f),
            Reducer::Min(f) => format!("min_{}", f),
            Reducer::Max(f) => format!("max_{}", f),
            Reducer::Avg(f) => format!("avg_{}", f),
        }
    }

    fn reduce(&self, rows: &[Row]) -> Option<String> {
        let numbers = |field: &str| -> Vec<f64> {
            rows.iter()
                .filter_map(|r| r.get(field))
                .filter_map(|v| v.trim().parse::<f64>().ok())
                .collect()
        };
        match self {
            Reducer::Count => Some(rows.len().to_string()),
            Reducer::CountDistinct(f) => {
                let distinct: BTreeSet<&String> = rows.iter().filter_map(|r| r.get(f.as_str())).collect();
                Some(distinct.len().to_string())
            }
            Reducer::Sum(f) => Some(format_number(numbers(f).iter().sum())),
            Reducer::Min(f) => numbers(f).into_iter().reduce(f64::min).map(format_number),
            Reducer::Max(f) => numbers(f).into_iter().reduce(f64::max).map(format_number),
            Reducer::Avg(f) => {
                let values = numbers(f);
                (!values.is_empty()).then(|| format_number(values.iter().sum::<f64>() / values.len() as f64))
            }
        }
    }
}

/// A reducer and its output name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducerSpec {
    /// Function
    pub reducer: Reducer,
    /// `AS` name
    pub alias: Option<String>,
}

impl ReducerSpec {
    /// Output column name
    pub fn output_name(&self) -> String {
        self.alias.clone().unwrap_or_else(|| self.reducer.default_name())
    }
}

/// GROUPBY clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBy {
    /// Grouping fields
    pub fields: Vec<String>,
    /// Reducers applied per group
    pub reducers: Vec<ReducerSpec>,
}

/// Options of one aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRequest {
    /// Query string
    pub query: String,
    /// Fields loaded into each row
    pub load: Vec<String>,
    /// GROUPBY clause
    pub group_by: Option<GroupBy>,
    /// SORTBY field and direction
    pub sort_by: Option<(String, SortOrder)>,
    /// LIMIT offset and count
    pub limit: Option<(usize, usize)>,
    /// DIALECT
    pub dialect: Option<u32>,
}

impl AggregateRequest {
    /// Aggregation without steps
    pub fn new(query: impl Into<String>) -> Self {
        AggregateRequest {
            query: query.into(),
            load: Vec::new(),
            group_by: None,
            sort_by: None,
            limit: None,
            dialect: None,
        }
    }

    /// Builder: LOAD a field
    pub fn load(mut self, field: impl Into<String>) -> Self {
        self.load.push(field.into());
        self
    }

    /// Builder: GROUPBY
    pub fn group_by<I, S>(mut self, fields: I, reducers: Vec<ReducerSpec>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(GroupBy {
            fields: fields.into_iter().map(Into::into).collect(),
            reducers,
        });
        self
    }

    /// Builder: SORTBY
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some((field.into(), order));
        self
    }

    /// Builder: LIMIT
    pub fn limit(mut self, offset: usize, count: usize) -> Self {
        self.limit = Some((offset, count));
        self
    }

    fn loaded_fields(&self) -> BTreeSet<String> {
        let mut fields: BTreeSet<String> = self.load.iter().map(|f| bare_name(f).to_string()).collect();
        if let Some(group) = &self.group_by {
            fields.extend(group.fields.iter().map(|f| bare_name(f).to_string()));
            fields.extend(
                group
                    .reducers
                    .iter()
                    .filter_map(|r| r.reducer.field())
                    .map(|f| bare_name(f).to_string()),
            );
        }
        fields
    }
}

/// Result of an aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// Rows before LIMIT
    pub total: usize,
    /// Output rows
    pub rows: Vec<Row>,
    /// The query ran out of time
    pub timed_out: bool,
    /// A pattern expansion was cut short
    pub truncated: bool,
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn group_rows(rows: Vec<Row>, group: &GroupBy) -> Vec<Row> {
    let keys: Vec<&str> = group.fields.iter().map(|f| bare_name(f)).collect();
    let mut groups: BTreeMap<Vec<Option<String>>, Vec<Row>> = BTreeMap::new();
    for row in rows {
        let key = keys.iter().map(|k| row.get(*k).cloned()).collect();
        groups.entry(key).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(key, members)| {
            let mut out = Row::new();
            for (name, value) in keys.iter().zip(key) {
                if let Some(value) = value {
                    out.insert(name.to_string(), value);
                }
            }
            for spec in &group.reducers {
                if let Some(value) = spec.reducer.reduce(&members) {
                    out.insert(spec.output_name(), value);
                }
            }
            out
        })
        .collect()
}

/// Run an aggregation against one index
pub fn execute_aggregate(
    index: &Index,
    request: &AggregateRequest,
    config: &SearchConfig,
    source: &dyn DocumentSource,
) -> Result<AggregateResponse> {
    aggregate_within(index, request, config, source, &QueryBudget::from_config(config))
}

/// Run an aggregation under an explicit budget
pub(crate) fn aggregate_within(
    index: &Index,
    request: &AggregateRequest,
    config: &SearchConfig,
    source: &dyn DocumentSource,
    budget: &QueryBudget,
) -> Result<AggregateResponse> {
    let dialect = resolve_dialect(request.dialect, config)?;
    let reader = index.reader();
    let Some(evaluation) = evaluate(&reader, &request.query, dialect, GlobalProximity::default(), budget)? else {
        return Ok(AggregateResponse {
            total: 0,
            rows: Vec::new(),
            timed_out: true,
            truncated: false,
        });
    };

    let fields = request.loaded_fields();
    let mut rows: Vec<Row> = live_matches(&reader, evaluation.matches, source)
        .iter()
        .filter_map(|m| reader.doc_meta(m.doc))
        .map(|meta| {
            let doc = source.load(&meta.key);
            fields
                .iter()
                .filter_map(|name| {
                    let value = named_value(index.schema(), name, doc.as_ref()?)?;
                    Some((name.clone(), value))
                })
                .collect()
        })
        .collect();

    if let Some(group) = &request.group_by {
        rows = group_rows(rows, group);
    }

    if let Some((field, order)) = &request.sort_by {
        let field = bare_name(field);
        rows.sort_by(|a, b| match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => match order {
                SortOrder::Asc => compare_values(x, y),
                SortOrder::Desc => compare_values(y, x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    let total = rows.len();
    let rows = match request.limit {
        Some((offset, count)) => page(&rows, offset, count).to_vec(),
        None => rows,
    };

    Ok(AggregateResponse {
        total,
        rows,
        timed_out: false,
        truncated: evaluation.truncated,
    })
}

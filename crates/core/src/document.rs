//! Documents and per-field value resolution
//!
//! [`resolve_field`] is a pure function of a compiled field and a document: it
//! returns the ordered values the field selects together with the field's
//! ordering flag, or the [`IndexingFailure`] that prevents the field from
//! being indexed for this document. Storage is not involved.

use crate::error::IndexingFailure;
use crate::json::type_name;
use crate::schema::{FieldSource, FieldType, SchemaField};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A backing record as seen by an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Document {
    /// Flat field/value record
    Hash(BTreeMap<String, String>),
    /// JSON document
    Json(Value),
}

impl Document {
    /// Build a hash document from pairs
    pub fn hash<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Document::Hash(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Hash attribute value, if this is a hash document
    pub fn hash_field(&self, name: &str) -> Option<&str> {
        match self {
            Document::Hash(map) => map.get(name).map(String::as_str),
            Document::Json(_) => None,
        }
    }

    /// Short type name used by WrongType errors
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Hash(_) => "hash",
            Document::Json(_) => "json",
        }
    }
}

/// Values one field selects from one document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    /// TEXT values in element order
    Text(Vec<String>),
    /// Normalized TAG values
    Tag(Vec<String>),
    /// NUMERIC values
    Numeric(Vec<f64>),
}

impl FieldValues {
    fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldValues::Text(Vec::new()),
            FieldType::Tag => FieldValues::Tag(Vec::new()),
            FieldType::Numeric => FieldValues::Numeric(Vec::new()),
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Text(v) | FieldValues::Tag(v) => v.len(),
            FieldValues::Numeric(v) => v.len(),
        }
    }

    /// True if the field selected nothing indexable
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort key from the first value
    pub fn sort_key(&self) -> Option<SortKey> {
        match self {
            FieldValues::Text(v) | FieldValues::Tag(v) => v.first().map(|s| SortKey::Str(s.to_lowercase())),
            FieldValues::Numeric(v) => v.first().map(|n| SortKey::Num(*n)),
        }
    }
}

/// Resolved values of one field plus its ordering flag
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// Values in source order
    pub values: FieldValues,
    /// False when the values came from a non-definite path
    pub ordering_defined: bool,
}

/// Precomputed comparison key of a sortable field
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    /// Lowercased first text/tag value
    Str(String),
    /// First numeric value
    Num(f64),
}

impl SortKey {
    /// Total order; strings sort after numbers when kinds are mixed
    pub fn compare(&self, other: &SortKey) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (SortKey::Num(a), SortKey::Num(b)) => a.total_cmp(b),
            (SortKey::Str(a), SortKey::Str(b)) => a.cmp(b),
            (SortKey::Num(_), SortKey::Str(_)) => Ordering::Less,
            (SortKey::Str(_), SortKey::Num(_)) => Ordering::Greater,
        }
    }
}

/// Resolve one schema field against one document
///
/// Returns `Ok(None)` when the field selects nothing (missing path, nulls
/// only, empty array, or a document of the other storage kind).
pub fn resolve_field(field: &SchemaField, doc: &Document) -> Result<Option<ResolvedField>, IndexingFailure> {
    let values = match (&field.source, doc) {
        (FieldSource::Hash(attr), Document::Hash(map)) => match map.get(attr) {
            Some(raw) => resolve_hash_value(field, raw)?,
            None => return Ok(None),
        },
        (FieldSource::Json(path), Document::Json(root)) => {
            let matches = path.resolve(root);
            if path.is_definite() {
                match matches.first() {
                    Some(value) => resolve_definite(field, value)?,
                    None => return Ok(None),
                }
            } else {
                resolve_multi(field, &matches)?
            }
        }
        _ => return Ok(None),
    };

    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(ResolvedField {
        values,
        ordering_defined: field.ordering_defined,
    }))
}

fn resolve_hash_value(field: &SchemaField, raw: &str) -> Result<FieldValues, IndexingFailure> {
    Ok(match field.field_type() {
        FieldType::Text => FieldValues::Text(vec![raw.to_string()]),
        FieldType::Tag => FieldValues::Tag(
            raw.split(field.spec.separator)
                .filter_map(|t| normalize_tag(field, t))
                .collect(),
        ),
        FieldType::Numeric => {
            let n = parse_number(raw).ok_or_else(|| IndexingFailure::NotNumeric {
                field: field.name().to_string(),
                value: raw.to_string(),
            })?;
            FieldValues::Numeric(vec![n])
        }
    })
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        _ => trimmed.parse::<f64>().ok().filter(|n| !n.is_nan()),
    }
}

/// Trim and case-fold a tag; empty tags are dropped
pub fn normalize_tag(field: &SchemaField, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if field.spec.case_sensitive {
        Some(trimmed.to_string())
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn invalid_type(field: &SchemaField, value: &Value) -> IndexingFailure {
    IndexingFailure::InvalidType {
        field: field.name().to_string(),
        expected: field.field_type().expected_json_type(),
        actual: type_name(value),
    }
}

/// Push one scalar match; arrays are rejected as nested
fn push_scalar(field: &SchemaField, value: &Value, out: &mut FieldValues) -> Result<(), IndexingFailure> {
    match (value, out) {
        (Value::Null, _) => Ok(()),
        (Value::Array(_), _) => Err(IndexingFailure::NestedArray {
            field: field.name().to_string(),
        }),
        (Value::String(s), FieldValues::Text(v)) => {
            v.push(s.clone());
            Ok(())
        }
        (Value::String(s), FieldValues::Tag(v)) => {
            if let Some(tag) = normalize_tag(field, s) {
                v.push(tag);
            }
            Ok(())
        }
        (Value::Number(n), FieldValues::Numeric(v)) => {
            if let Some(f) = n.as_f64() {
                v.push(f);
            }
            Ok(())
        }
        (other, _) => Err(invalid_type(field, other)),
    }
}

fn resolve_definite(field: &SchemaField, value: &Value) -> Result<FieldValues, IndexingFailure> {
    let mut out = FieldValues::empty(field.field_type());
    match value {
        Value::Array(items) => {
            if field.field_type() == FieldType::Tag {
                return Err(IndexingFailure::ArrayNotAllowed {
                    field: field.name().to_string(),
                });
            }
            for item in items {
                push_scalar(field, item, &mut out)?;
            }
        }
        scalar => push_scalar(field, scalar, &mut out)?,
    }
    Ok(out)
}

fn resolve_multi(field: &SchemaField, matches: &[&Value]) -> Result<FieldValues, IndexingFailure> {
    let mut out = FieldValues::empty(field.field_type());
    for value in matches {
        push_scalar(field, value, &mut out)?;
    }
    Ok(out)
}

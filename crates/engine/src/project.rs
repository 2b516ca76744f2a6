//! Reading field values back out of stored documents
//!
//! Used by RETURN projection, aggregation LOAD, and SORTBY on fields whose
//! sort key was not kept at indexing time.

use serde_json::Value;
use sieve_core::json::render_value;
use sieve_core::{resolve_field, Document, FieldSource, IndexSchema, JsonPath, SchemaField, SortKey};

/// Strip the `@` aggregation prefix from a field reference
pub(crate) fn bare_name(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

/// First value of a schema field, rendered as a string
pub(crate) fn field_value(field: &SchemaField, doc: &Document) -> Option<String> {
    match (&field.source, doc) {
        (FieldSource::Hash(attr), Document::Hash(map)) => map.get(attr).cloned(),
        (FieldSource::Json(path), Document::Json(root)) => {
            let matches = path.resolve(root);
            let first = if path.is_definite() {
                match matches.first()? {
                    Value::Array(items) => items.iter().find(|v| !v.is_null())?,
                    value => value,
                }
            } else {
                matches.into_iter().find(|v| !v.is_null())?
            };
            Some(render_value(first))
        }
        _ => None,
    }
}

/// Value of a schema field name, alias, hash attribute, or JSON path
pub(crate) fn named_value(schema: &IndexSchema, name: &str, doc: &Document) -> Option<String> {
    let name = bare_name(name);
    if let Some(field) = schema.field_by_name_or_path(name) {
        return field_value(field, doc);
    }
    match doc {
        Document::Hash(map) => map.get(name).cloned(),
        Document::Json(root) => {
            let path: JsonPath = name.parse().ok()?;
            let matches = path.resolve(root);
            match matches.as_slice() {
                [] => None,
                [single] => Some(render_value(single)),
                many => Some(Value::Array(many.iter().map(|v| (*v).clone()).collect()).to_string()),
            }
        }
    }
}

/// Every field of a document: hash pairs, or `$` with the serialized JSON
pub(crate) fn all_fields(doc: &Document) -> Vec<(String, String)> {
    match doc {
        Document::Hash(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Document::Json(root) => vec![("$".to_string(), root.to_string())],
    }
}

/// Sort key of a field computed from the stored document
pub(crate) fn sort_key_of(field: &SchemaField, doc: &Document) -> Option<SortKey> {
    resolve_field(field, doc).ok().flatten()?.values.sort_key()
}

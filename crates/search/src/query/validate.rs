//! Pre-evaluation checks
//!
//! Slop and inorder only make sense over fields whose element order is
//! stable. A positional request over a field resolved through a wildcard or
//! recursive JSON path is rejected here, before any posting list is read.

use super::ast::{NodeKind, QueryNode};
use crate::error::{QueryError, QueryResult};
use sieve_core::{FieldType, IndexSchema};

/// Search-level `SLOP` / `INORDER` flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalProximity {
    /// `SLOP n`
    pub slop: Option<u32>,
    /// `INORDER`
    pub inorder: bool,
}

impl GlobalProximity {
    /// True if either flag was given
    pub fn requested(&self) -> bool {
        self.slop.is_some() || self.inorder
    }
}

/// Reject positional constraints over fields with undefined ordering
pub fn validate(node: &QueryNode, schema: &IndexSchema, global: GlobalProximity) -> QueryResult<()> {
    match &node.kind {
        NodeKind::Phrase { children, fields, .. } => {
            if children.len() >= 2 && (node.attrs.sets_proximity() || global.requested()) {
                check_fields(fields.as_deref(), schema)?;
            }
            children.iter().try_for_each(|c| validate(c, schema, global))
        }
        NodeKind::Tag { field, .. } => {
            if node.attrs.sets_proximity() {
                check_fields(Some(std::slice::from_ref(field)), schema)?;
            }
            Ok(())
        }
        NodeKind::Union(children) => children.iter().try_for_each(|c| validate(c, schema, global)),
        NodeKind::Not(inner) => validate(inner, schema, global),
        NodeKind::Universe | NodeKind::Null | NodeKind::Term { .. } | NodeKind::Numeric { .. } => Ok(()),
    }
}

fn check_fields(fields: Option<&[String]>, schema: &IndexSchema) -> QueryResult<()> {
    let undefined = match fields {
        Some(names) => names
            .iter()
            .filter_map(|n| schema.field(n))
            .find(|f| !f.ordering_defined),
        None => schema
            .fields_of(FieldType::Text)
            .filter(|f| !f.spec.noindex)
            .find(|f| !f.ordering_defined),
    };
    match undefined {
        Some(field) => Err(QueryError::UndefinedOrdering {
            field: field.name().to_string(),
        }),
        None => Ok(()),
    }
}

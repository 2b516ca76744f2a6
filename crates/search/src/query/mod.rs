//! Query language: AST, parser, and validation

pub mod ast;
pub mod parser;
pub mod validate;

pub use ast::{Attributes, NodeKind, QueryNode, TagMatch, TagValue};
pub use parser::{QueryParser, WILDCARD_DIALECT};
pub use validate::{validate, GlobalProximity};

use crate::error::QueryResult;
use crate::tokenizer::Tokenizer;
use sieve_core::IndexSchema;

/// Parse and validate a query against a schema
pub fn plan(
    query: &str,
    tokenizer: &Tokenizer,
    dialect: u32,
    schema: &IndexSchema,
    global: GlobalProximity,
) -> QueryResult<QueryNode> {
    let node = QueryParser::new(tokenizer, dialect).parse(query)?;
    validate(&node, schema, global)?;
    Ok(node)
}

//! Search and aggregate handlers.

use sieve_engine::{AggregateRequest, Engine, SearchRequest};

use crate::{Output, Result};

/// Handle Search
pub fn search(engine: &Engine, index: &str, request: &SearchRequest) -> Result<Output> {
    Ok(Output::SearchResults(engine.search(index, request)?))
}

/// Handle Aggregate
pub fn aggregate(engine: &Engine, index: &str, request: &AggregateRequest) -> Result<Output> {
    Ok(Output::AggregateResults(engine.aggregate(index, request)?))
}

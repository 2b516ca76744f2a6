//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use serde_json::{json, Value};
pub use sieve::{
    AggregateRequest, Engine, Error, FieldSpec, IndexDefinition, SearchConfig, SearchRequest, SearchResponse,
    SortOrder, StorageModel,
};

// ============================================================================
// Engines
// ============================================================================

/// Engine without a sweeper thread; tests drive expiry through `Engine::sweep`
pub fn engine() -> Engine {
    Engine::new(SearchConfig::default()).unwrap()
}

/// Engine with some options applied through CONFIG SET
pub fn engine_with(options: &[(&str, &str)]) -> Engine {
    let engine = engine();
    for (name, value) in options {
        engine.config_set(name, value).unwrap();
    }
    engine
}

/// JSON index over every key
pub fn json_index(name: &str, fields: Vec<FieldSpec>) -> IndexDefinition {
    fields
        .into_iter()
        .fold(IndexDefinition::new(name, StorageModel::Json), |def, field| def.field(field))
}

// ============================================================================
// Queries
// ============================================================================

/// Run a search and return the keys in result order
pub fn search_keys(engine: &Engine, index: &str, request: SearchRequest) -> Vec<String> {
    engine
        .search(index, &request.no_content().limit(0, 10_000))
        .unwrap()
        .keys()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Keys matching `query`, sorted
pub fn sorted_keys(engine: &Engine, index: &str, query: &str) -> Vec<String> {
    let mut keys = search_keys(engine, index, SearchRequest::new(query));
    keys.sort();
    keys
}

/// Total matches of a request
pub fn total(engine: &Engine, index: &str, request: SearchRequest) -> usize {
    engine.search(index, &request.limit(0, 0)).unwrap().total
}

/// Message of a failing search
pub fn search_error(engine: &Engine, index: &str, request: SearchRequest) -> String {
    engine.search(index, &request).unwrap_err().to_string()
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn library_doc1() -> Value {
    json!({
        "name": "wonderbar",
        "category": ["mathematics and computer science", "logic", "programming", "database"],
        "books": [
            {"name": "Structure and Interpretation of Computer Programs",
             "authors": ["Harold Abelson", "Gerald Jay Sussman", "Julie Sussman"]},
            {"name": "The Art of Computer Programming", "authors": ["Donald Knuth"]},
            {"name": "Introduction to Algorithms",
             "authors": ["Thomas H. Cormen", "Charles E. Leiserson", "Ronald L. Rivest", "Clifford Stein"]},
            {"name": "Classical Mathematical Logic: The Semantic Foundations of Logic",
             "authors": ["Richard L. Epstein"]},
            {"name": "Design Patterns: Elements of Reusable Object-Oriented Software",
             "authors": ["Erich Gamma", "Richard Helm", "Ralph Johnson", "John Vlissides"]},
            {"name": "Redis Microservices for Dummies", "authors": ["Redis Ltd."]},
            {"name": "Redis 4.x Cookbook", "authors": ["Pengcheng Huang", "Zuofei Wang"]}
        ]
    })
}

pub fn library_doc2() -> Value {
    json!({
        "name": "foo",
        "category": ["database", "high performance"],
        "books": [
            {"name": "Redis for Dummies", "authors": ["Redis Ltd."]},
            {"name": "Redis Microservices for Dummies", "authors": ["Redis Ltd."]},
            {"name": "Systems Performance - Enterprise and the Cloud", "authors": ["Brendan Gregg"]}
        ]
    })
}

pub fn library_doc3() -> Value {
    json!({
        "name": "bar",
        "category": ["performance", "cloud"],
        "books": [
            {"name": "Redis for Dummies", "authors": ["Redis Ltd."]},
            {"name": "Designing Data-Intensive Applications", "authors": ["Martin Kleppmann"]},
            {"name": "Kubernetes: Up and Running",
             "authors": ["Kelsey Hightower", "Brendan Burns", "Joe Beda"]}
        ]
    })
}

/// Store the three library documents under `doc:1..3`
pub fn load_library(engine: &Engine) {
    engine.json_set("doc:1", "$", library_doc1()).unwrap();
    engine.json_set("doc:2", "$", library_doc2()).unwrap();
    engine.json_set("doc:3", "$", library_doc3()).unwrap();
}

/// Attributes mixing strings with nulls, numbers, booleans, objects, and nested arrays
pub fn non_text_doc() -> Value {
    json!({
        "attr1": ["first", "second", null, "third", null, "null", null],
        "attr2": "third",
        "attr3": [null, null],
        "attr4": [],
        "attr5": null,
        "attr6": ["first", "second", null, "third", null, 2.04],
        "attr7": ["first", "second", null, "third", null, false],
        "attr8": ["first", "second", null, "third", null, {"obj": "ection"}],
        "attr9": ["first", "second", null, "third", null, ["recursi", "on"]],
        "attr10": ["first", "second", null, "third", null, ["recursi", 50071]]
    })
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

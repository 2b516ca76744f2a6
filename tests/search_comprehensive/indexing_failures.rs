//! Values a field cannot index count as failures without aborting the write

use crate::common::*;
use serde_json::json;

#[test]
fn test_non_text_elements_root_level() {
    let engine = engine();
    engine.json_set("doc:1", "$", non_text_doc()).unwrap();

    for i in 1..=10 {
        let name = format!("idx{}", i);
        engine
            .create_index(json_index(&name, vec![FieldSpec::text(format!("$.attr{}", i)).alias("attr")]))
            .unwrap();
        let expected = if i <= 5 { 0 } else { 1 };
        assert_eq!(engine.info(&name).unwrap().hash_indexing_failures, expected, "attr{}", i);
    }

    assert_eq!(search_keys(&engine, "idx1", SearchRequest::new("@attr:(third)")), strings(&["doc:1"]));
    assert_eq!(search_keys(&engine, "idx2", SearchRequest::new("@attr:(third)")), strings(&["doc:1"]));
    // The document stays a member; only the offending field is skipped
    for idx in ["idx3", "idx4", "idx5", "idx6", "idx7", "idx8", "idx9", "idx10"] {
        assert_eq!(search_keys(&engine, idx, SearchRequest::new("*")), strings(&["doc:1"]), "{}", idx);
        assert!(search_keys(&engine, idx, SearchRequest::new("@attr:(third)")).is_empty(), "{}", idx);
    }
}

#[test]
fn test_non_text_elements_nested() {
    let engine = engine();
    engine
        .json_set("doc:1", "$", json!({ "nested": [non_text_doc()] }))
        .unwrap();

    for i in 1..=10 {
        let name = format!("idx{}", i);
        engine
            .create_index(json_index(
                &name,
                vec![FieldSpec::text(format!("$.nested[*].attr{}[*]", i)).alias("attr")],
            ))
            .unwrap();
        let expected = if i <= 5 { 0 } else { 1 };
        assert_eq!(engine.info(&name).unwrap().hash_indexing_failures, expected, "attr{}", i);
    }
}

#[test]
fn test_array_of_arrays_is_not_text() {
    let engine = engine();
    load_library(&engine);
    engine
        .create_index(json_index(
            "idx_authors",
            vec![FieldSpec::text("$.books[*].authors").alias("author")],
        ))
        .unwrap();

    let info = engine.info("idx_authors").unwrap();
    assert_eq!(info.hash_indexing_failures, 3);
    assert!(info.last_indexing_failure.is_some());
    assert!(search_keys(&engine, "idx_authors", SearchRequest::new("@author:(Redis)")).is_empty());
}

#[test]
fn test_failures_count_per_document_and_recover() {
    let engine = engine();
    engine
        .create_index(json_index("idx", vec![FieldSpec::text("$.val").alias("val")]))
        .unwrap();

    engine.json_set("doc:1", "$", json!({"val": ["ok", 7]})).unwrap();
    engine.json_set("doc:2", "$", json!({"val": ["ok", {"x": 1}]})).unwrap();
    assert_eq!(engine.info("idx").unwrap().hash_indexing_failures, 2);

    // A corrected document indexes again; the counter only ever grows
    engine.json_set("doc:1", "$", json!({"val": ["ok", "fine"]})).unwrap();
    assert_eq!(search_keys(&engine, "idx", SearchRequest::new("@val:(fine)")), strings(&["doc:1"]));
    assert_eq!(engine.info("idx").unwrap().hash_indexing_failures, 2);
}

#[test]
fn test_numeric_and_hash_failures() {
    let engine = engine();
    engine
        .create_index(
            IndexDefinition::new("hidx", StorageModel::Hash)
                .prefix("h:")
                .field(FieldSpec::numeric("price"))
                .field(FieldSpec::text("title")),
        )
        .unwrap();

    engine.hset("h:1", [("price", "10"), ("title", "cheap lamp")]).unwrap();
    engine.hset("h:2", [("price", "ten"), ("title", "broken lamp")]).unwrap();

    let info = engine.info("hidx").unwrap();
    assert_eq!(info.hash_indexing_failures, 1);
    assert_eq!(info.num_docs, 2);
    assert_eq!(sorted_keys(&engine, "hidx", "lamp"), strings(&["h:1", "h:2"]));
    assert_eq!(sorted_keys(&engine, "hidx", "@price:[5 15]"), strings(&["h:1"]));
}

//! Multi-value TEXT fields: position gaps between array elements

use crate::common::*;

fn category_index(name: &str) -> IndexDefinition {
    json_index(name, vec![FieldSpec::text("$.category").alias("category")])
}

fn category(query: &str) -> SearchRequest {
    SearchRequest::new(format!("@category:({})", query))
}

#[test]
fn test_default_delta_gap() {
    let engine = engine();
    engine.json_set("doc:1", "$", library_doc1()).unwrap();
    engine.create_index(category_index("idx")).unwrap();
    assert_eq!(engine.config_get("MULTI_TEXT_OFFSET_DELTA").unwrap()[0].1, "100");

    // mathematics=1 computer=2 science=3 logic=103 programming=203 database=303
    assert_eq!(search_keys(&engine, "idx", category("mathematics database")), strings(&["doc:1"]));
    assert!(search_keys(&engine, "idx", category("mathematics database").slop(300)).is_empty());
    assert_eq!(
        search_keys(&engine, "idx", category("mathematics database").slop(301)),
        strings(&["doc:1"])
    );
}

#[test]
fn test_delta_applies_to_indexes_built_afterwards() {
    let engine = engine();
    engine.json_set("doc:1", "$", library_doc1()).unwrap();

    engine.config_set("MULTI_TEXT_OFFSET_DELTA", "101").unwrap();
    engine.create_index(category_index("idx_101")).unwrap();
    assert!(search_keys(&engine, "idx_101", category("mathematics database").slop(303)).is_empty());
    assert_eq!(
        search_keys(&engine, "idx_101", category("mathematics database").slop(304)),
        strings(&["doc:1"])
    );
    assert!(search_keys(&engine, "idx_101", category("science database").slop(301)).is_empty());
    assert_eq!(
        search_keys(&engine, "idx_101", category("science database").slop(302)),
        strings(&["doc:1"])
    );

    engine.config_set("MULTI_TEXT_OFFSET_DELTA", "0").unwrap();
    engine.create_index(category_index("idx_0")).unwrap();
    assert!(search_keys(&engine, "idx_0", category("mathematics database").slop(3)).is_empty());
    assert_eq!(
        search_keys(&engine, "idx_0", category("mathematics database").slop(4)),
        strings(&["doc:1"])
    );
    assert!(search_keys(&engine, "idx_0", category("science database").slop(1)).is_empty());
    assert_eq!(
        search_keys(&engine, "idx_0", category("science database").slop(2)),
        strings(&["doc:1"])
    );

    // The first index keeps the gap it was built with
    assert!(search_keys(&engine, "idx_101", category("mathematics database").slop(4)).is_empty());

    assert!(engine.config_set("MULTI_TEXT_OFFSET_DELTA", "-1").is_err());
}

fn check_category_searches(engine: &Engine, idx: &str) {
    let dp = || category("database programming");
    assert!(search_keys(engine, idx, dp().slop(98)).is_empty());
    assert_eq!(search_keys(engine, idx, dp().slop(99)), strings(&["doc:1"]));
    assert!(search_keys(engine, idx, dp().slop(99).inorder()).is_empty());
    assert_eq!(
        search_keys(
            engine,
            idx,
            SearchRequest::new("@category:(database programming)=>{$slop:99}").slop(1)
        ),
        strings(&["doc:1"])
    );
    assert!(search_keys(
        engine,
        idx,
        SearchRequest::new("@category:(database programming)=>{$slop:100; $inorder:true}")
    )
    .is_empty());
    assert_eq!(
        search_keys(
            engine,
            idx,
            SearchRequest::new("@category:(database programming)=>{$slop:100; $inorder:false}")
        ),
        strings(&["doc:1"])
    );

    assert_eq!(sorted_keys(engine, idx, "@category:(database)"), strings(&["doc:1", "doc:2"]));
    assert_eq!(sorted_keys(engine, idx, "@category:(performance)"), strings(&["doc:2", "doc:3"]));
    assert_eq!(sorted_keys(engine, idx, "@category:(high performance)"), strings(&["doc:2"]));
    assert_eq!(sorted_keys(engine, idx, "@category:(cloud)"), strings(&["doc:3"]));
}

#[test]
fn test_nested_category_searches() {
    let engine = engine();
    load_library(&engine);
    engine.create_index(category_index("idx_category_arr")).unwrap();
    engine
        .create_index(json_index(
            "idx_category_arr_author_flat",
            vec![
                FieldSpec::text("$.books[*].authors[*]").alias("author"),
                FieldSpec::text("$.category").alias("category"),
            ],
        ))
        .unwrap();

    check_category_searches(&engine, "idx_category_arr");
    check_category_searches(&engine, "idx_category_arr_author_flat");

    // A definite field next to a flattened one keeps slop and inorder
    let idx = "idx_category_arr_author_flat";
    for query in [
        "@category:(programming science)=>{$slop:200; $inorder:false}",
        "@category:(programming science)=>{$slop:200}",
        "@category:(programming science)=>{$inorder:false}",
    ] {
        assert_eq!(search_keys(&engine, idx, SearchRequest::new(query)), strings(&["doc:1"]), "{}", query);
    }
}

#[test]
fn test_root_array_documents() {
    let engine = engine();
    for (key, doc) in [("doc:1", library_doc1()), ("doc:2", library_doc2()), ("doc:3", library_doc3())] {
        engine.json_set(key, "$", doc["category"].clone()).unwrap();
    }
    engine
        .create_index(json_index("idx_category_arr", vec![FieldSpec::text("$").alias("category")]))
        .unwrap();
    engine
        .create_index(json_index(
            "idx_category_arr_author_flat",
            vec![
                FieldSpec::text("$.[*]").alias("author"),
                FieldSpec::text("$").alias("category"),
            ],
        ))
        .unwrap();

    check_category_searches(&engine, "idx_category_arr");
    check_category_searches(&engine, "idx_category_arr_author_flat");
}

#[test]
fn test_flattened_author_searches() {
    let engine = engine();
    load_library(&engine);
    engine
        .create_index(json_index(
            "idx_author_flat",
            vec![FieldSpec::text("$.books[*].authors[*]").alias("author")],
        ))
        .unwrap();

    assert_eq!(sorted_keys(&engine, "idx_author_flat", "@author:(Richard)"), strings(&["doc:1"]));
    assert_eq!(
        sorted_keys(&engine, "idx_author_flat", "@author:(Brendan)"),
        strings(&["doc:2", "doc:3"])
    );
    assert_eq!(
        sorted_keys(&engine, "idx_author_flat", "@author:(Redis)"),
        strings(&["doc:1", "doc:2", "doc:3"])
    );
}

#[test]
fn test_boolean_composition_over_fields() {
    let engine = engine();
    load_library(&engine);
    engine
        .create_index(json_index(
            "idx_book",
            vec![
                FieldSpec::text("$.category").alias("category"),
                FieldSpec::text("$.books[*].authors[*]").alias("author"),
                FieldSpec::text("$.books[*].name").alias("name"),
            ],
        ))
        .unwrap();

    let keys = sorted_keys(
        &engine,
        "idx_book",
        "(@name:(design*) -@category:(cloud)) | (@name:(Kubernetes*) @category:(cloud))",
    );
    assert_eq!(keys, strings(&["doc:1", "doc:3"]));
}

#[test]
fn test_multi_tag_returns_first_value() {
    let engine = engine();
    load_library(&engine);
    engine
        .create_index(json_index("idx1", vec![FieldSpec::tag("$.category[*]").alias("category")]))
        .unwrap();
    engine
        .create_index(json_index("idx2", vec![FieldSpec::tag("$.category").alias("category")]))
        .unwrap();

    for query in ["@category:{mathematics\\ and\\ computer\\ science}", "@category:{logic}"] {
        let response = engine
            .search("idx1", &SearchRequest::new(query).return_field("category", None))
            .unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.hits[0].key, "doc:1");
        assert_eq!(
            response.hits[0].fields,
            Some(vec![("category".to_string(), "mathematics and computer science".to_string())])
        );
    }

    let response = engine
        .search(
            "idx1",
            &SearchRequest::new("@category:{logic}").return_field("$.category", Some("category_arr")),
        )
        .unwrap();
    assert_eq!(
        response.hits[0].fields,
        Some(vec![(
            "category_arr".to_string(),
            r#"["mathematics and computer science","logic","programming","database"]"#.to_string()
        )])
    );

    // A whole array is not a TAG value
    assert_eq!(engine.info("idx2").unwrap().hash_indexing_failures, 3);
}

#[test]
fn test_empty_blank_and_null_arrays() {
    let engine = engine();
    engine
        .create_index(json_index("idx", vec![FieldSpec::text("$.val").alias("val")]))
        .unwrap();
    let values = [
        serde_json::json!(["", "", ""]),
        serde_json::json!([""]),
        serde_json::json!([]),
        serde_json::json!([null]),
        serde_json::json!([null, null]),
        serde_json::json!(["", null, ""]),
    ];
    for (i, val) in values.into_iter().enumerate() {
        engine
            .json_set(&format!("doc:{}", i + 1), "$", serde_json::json!({ "val": val }))
            .unwrap();
    }
    engine.json_set("doc", "$", serde_json::json!({"val": ["haha"]})).unwrap();

    let keys = search_keys(
        &engine,
        "idx",
        SearchRequest::new("@val:(haha)").sort_by("val", SortOrder::Asc),
    );
    assert_eq!(keys, strings(&["doc"]));
    assert_eq!(engine.info("idx").unwrap().hash_indexing_failures, 0);
}

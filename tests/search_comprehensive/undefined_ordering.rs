//! Slop and inorder are rejected over fields whose element order is not defined

use crate::common::*;

fn setup() -> Engine {
    let engine = engine();
    load_library(&engine);
    engine
        .create_index(json_index(
            "idx_author_flat",
            vec![FieldSpec::text("$.books[*].authors[*]").alias("author")],
        ))
        .unwrap();
    engine
        .create_index(json_index(
            "idx_mixed",
            vec![
                FieldSpec::text("$.books[*].authors[*]").alias("author"),
                FieldSpec::text("$.category").alias("category"),
                FieldSpec::tag("$.books[*].name").alias("title"),
            ],
        ))
        .unwrap();
    engine
}

fn assert_undefined(engine: &Engine, index: &str, request: SearchRequest) {
    let query = request.query.clone();
    let message = search_error(engine, index, request);
    assert!(message.contains("has undefined ordering"), "{}: {}", query, message);
}

#[test]
fn test_query_attributes_rejected() {
    let engine = setup();
    for query in [
        "@author:(Richard Brendan)=>{$slop:200}",
        "@author:(Richard Brendan)=>{$inorder:true}",
        "@author:(Richard Brendan)=>{$inorder:false}",
        "@author:(Richard Brendan)=>{$slop:10; $inorder:false}",
    ] {
        assert_undefined(&engine, "idx_author_flat", SearchRequest::new(query));
        assert_undefined(&engine, "idx_mixed", SearchRequest::new(query));
    }
}

#[test]
fn test_global_flags_rejected() {
    let engine = setup();
    assert_undefined(&engine, "idx_author_flat", SearchRequest::new("@author:(Richard Brendan)").slop(5));
    assert_undefined(&engine, "idx_author_flat", SearchRequest::new("@author:(Richard Brendan)").inorder());
    // Without a field restriction every TEXT field counts
    assert_undefined(&engine, "idx_mixed", SearchRequest::new("Richard database").slop(5));
}

#[test]
fn test_tag_with_proximity_rejected() {
    let engine = setup();
    assert_undefined(&engine, "idx_mixed", SearchRequest::new("@title:{Redis*}=>{$slop:1}"));
}

#[test]
fn test_single_term_and_plain_searches_allowed() {
    let engine = setup();
    assert_eq!(
        search_keys(&engine, "idx_author_flat", SearchRequest::new("@author:(Richard)").slop(5)),
        strings(&["doc:1"])
    );
    assert_eq!(
        sorted_keys(&engine, "idx_mixed", "@author:(Redis) @category:(database)"),
        strings(&["doc:1", "doc:2"])
    );
    assert_eq!(
        search_keys(
            &engine,
            "idx_mixed",
            SearchRequest::new("@category:(programming science)=>{$slop:200}")
        ),
        strings(&["doc:1"])
    );
}

//! Sorting by multi-value fields uses the first value

use crate::common::*;
use serde_json::{json, Value};

const GAGS: &[&str] = &[
    "mistral", "fireplace", "mismatch", "firefly", "ahoy", "class", "firecracker",
    "cluster", "firewall", "mischief", "classroom", "mistake", "classify",
];

fn definition(name: &str, prefix: &str, field: FieldSpec) -> IndexDefinition {
    IndexDefinition::new(name, StorageModel::Json)
        .prefix(prefix)
        .stopwords(std::iter::empty::<&str>())
        .field(field.alias("gag"))
}

/// Same data twice: `multi:` keys hold one-element arrays, `single:` keys the bare string
fn setup(path: &str, wrap: impl Fn(Value) -> Value) -> Engine {
    let engine = engine();
    let flat = format!("{}[*]", path);
    engine.create_index(definition("idx1_multi_text", "multi:", FieldSpec::text(path))).unwrap();
    engine.create_index(definition("idx2_multi_tag", "multi:", FieldSpec::tag(flat))).unwrap();
    engine
        .create_index(definition("idx3_multi_text_sort", "multi:", FieldSpec::text(path).sortable()))
        .unwrap();
    engine.create_index(definition("idx1_single_text", "single:", FieldSpec::text(path))).unwrap();
    engine.create_index(definition("idx2_single_tag", "single:", FieldSpec::tag(path))).unwrap();
    engine
        .create_index(definition("idx3_single_text_sort", "single:", FieldSpec::text(path).sortable()))
        .unwrap();

    for (i, gag) in GAGS.iter().enumerate() {
        engine.json_set(&format!("multi:doc:{}", i + 1), "$", wrap(json!([gag]))).unwrap();
        engine.json_set(&format!("single:doc:{}", i + 1), "$", wrap(json!(gag))).unwrap();
    }
    engine
}

fn sorted(query: &str, order: SortOrder) -> SearchRequest {
    SearchRequest::new(query).sort_by("gag", order)
}

fn trimmed(keys: Vec<String>, prefix: &str) -> Vec<String> {
    keys.into_iter()
        .map(|k| k.strip_prefix(prefix).unwrap_or(&k).to_string())
        .collect()
}

fn check(engine: &Engine) {
    let text = [
        sorted("@gag:(fire*)", SortOrder::Asc),
        sorted("@gag:(class*)", SortOrder::Asc),
        sorted("@gag:(fire*)", SortOrder::Desc),
        sorted("@gag:(class*)", SortOrder::Desc),
        sorted("*", SortOrder::Asc),
    ];
    let tag = [
        sorted("@gag:{fire*}", SortOrder::Asc),
        sorted("@gag:{class*}", SortOrder::Asc),
        sorted("@gag:{fire*}", SortOrder::Desc),
        sorted("@gag:{class*}", SortOrder::Desc),
        sorted("*", SortOrder::Asc),
    ];

    for (i, (text, tag)) in text.iter().zip(tag.iter()).enumerate() {
        let multi_text = search_keys(engine, "idx1_multi_text", text.clone());
        let single_text = search_keys(engine, "idx1_single_text", text.clone());
        assert_eq!(trimmed(multi_text.clone(), "multi:"), trimmed(single_text, "single:"), "text {}", i);

        let multi_tag = search_keys(engine, "idx2_multi_tag", tag.clone());
        let single_tag = search_keys(engine, "idx2_single_tag", tag.clone());
        assert_eq!(trimmed(multi_tag.clone(), "multi:"), trimmed(single_tag, "single:"), "tag {}", i);

        assert_eq!(multi_text, multi_tag, "text vs tag {}", i);

        let multi_sortable = search_keys(engine, "idx3_multi_text_sort", text.clone());
        assert_eq!(multi_text, multi_sortable, "sortable {}", i);
    }

    for (i, text) in text.iter().enumerate() {
        let request = text.clone().with_scores().no_content().limit(0, 100);
        let multi = engine.search("idx1_multi_text", &request).unwrap();
        let single = engine.search("idx1_single_text", &request).unwrap();
        let pairs = |r: &SearchResponse, prefix: &str| -> Vec<(String, Option<f64>)> {
            r.hits
                .iter()
                .map(|h| (h.key.strip_prefix(prefix).unwrap_or(&h.key).to_string(), h.score))
                .collect()
        };
        assert_eq!(pairs(&multi, "multi:"), pairs(&single, "single:"), "withscores {}", i);
    }
}

#[test]
fn test_sort_root_level() {
    let engine = setup("$", |v| v);
    check(&engine);

    let keys = search_keys(&engine, "idx1_multi_text", sorted("@gag:(fire*)", SortOrder::Asc));
    assert_eq!(
        keys,
        strings(&["multi:doc:7", "multi:doc:4", "multi:doc:2", "multi:doc:9"])
    );
}

#[test]
fn test_sort_nested() {
    let engine = setup("$.chalkboard", |v| json!({ "chalkboard": v }));
    check(&engine);

    let keys = search_keys(&engine, "idx2_multi_tag", sorted("@gag:{class*}", SortOrder::Desc));
    assert_eq!(
        keys,
        strings(&["multi:doc:11", "multi:doc:13", "multi:doc:6"])
    );
}

#[test]
fn test_sort_uses_first_value_of_longer_arrays() {
    let engine = engine();
    engine
        .create_index(json_index("idx", vec![FieldSpec::text("$.names").alias("names")]))
        .unwrap();
    engine.json_set("doc:a", "$", json!({"names": ["zebra", "apple"]})).unwrap();
    engine.json_set("doc:b", "$", json!({"names": ["mango", "zulu"]})).unwrap();
    engine.json_set("doc:c", "$", json!({"names": [null, "banana"]})).unwrap();

    let keys = search_keys(&engine, "idx", SearchRequest::new("*").sort_by("names", SortOrder::Asc));
    assert_eq!(keys, strings(&["doc:c", "doc:b", "doc:a"]));
}

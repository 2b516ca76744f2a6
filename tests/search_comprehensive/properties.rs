//! Property-based invariants

use crate::common::*;
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

fn word() -> impl Strategy<Value = String> {
    "[a-z]{3,8}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn universe_returns_every_document(docs in prop::collection::vec(prop::collection::vec(word(), 1..5), 0..40)) {
        let engine = engine();
        engine
            .create_index(json_index("idx", vec![FieldSpec::text("$.words").alias("words")]))
            .unwrap();
        for (i, words) in docs.iter().enumerate() {
            engine.json_set(&format!("doc:{}", i), "$", json!({ "words": words })).unwrap();
        }
        prop_assert_eq!(total(&engine, "idx", SearchRequest::new("*")), docs.len());
    }

    #[test]
    fn single_term_matches_containing_documents(
        docs in prop::collection::vec(prop::collection::vec(word(), 1..5), 1..30),
        pick in any::<prop::sample::Index>(),
    ) {
        let engine = engine_with(&[("MULTI_TEXT_OFFSET_DELTA", "0")]);
        engine
            .create_index(json_index("idx", vec![FieldSpec::text("$.words").alias("words")]))
            .unwrap();
        for (i, words) in docs.iter().enumerate() {
            engine.json_set(&format!("doc:{}", i), "$", json!({ "words": words })).unwrap();
        }

        let all: Vec<&String> = docs.iter().flatten().collect();
        let target = all[pick.index(all.len())];
        // Stopwords never reach the index
        prop_assume!(!sieve::DEFAULT_STOPWORDS.contains(&target.as_str()));

        let expected: BTreeSet<String> = docs
            .iter()
            .enumerate()
            .filter(|(_, words)| words.contains(target))
            .map(|(i, _)| format!("doc:{}", i))
            .collect();
        let found: BTreeSet<String> = search_keys(&engine, "idx", SearchRequest::new(format!("@words:({})", target)))
            .into_iter()
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn paging_partitions_results(n in 1usize..60, page in 1usize..12) {
        let engine = engine();
        engine
            .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("t").sortable()))
            .unwrap();
        for i in 0..n {
            engine.hset(&format!("doc:{:03}", i), [("t", format!("common w{:03}", i))]).unwrap();
        }

        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let response = engine
                .search("idx", &SearchRequest::new("common").sort_by("t", SortOrder::Asc).no_content().limit(offset, page))
                .unwrap();
            prop_assert_eq!(response.total, n);
            if response.hits.is_empty() {
                break;
            }
            seen.extend(response.hits.into_iter().map(|h| h.key));
            offset += page;
        }
        let expected: Vec<String> = (0..n).map(|i| format!("doc:{:03}", i)).collect();
        prop_assert_eq!(seen, expected);
    }
}

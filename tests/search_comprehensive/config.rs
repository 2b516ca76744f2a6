//! Runtime configuration through the engine and the command surface

use crate::common::*;
use sieve::{Command, Executor, Output};
use std::sync::Arc;

#[test]
fn test_get_all_lists_every_option() {
    let engine = engine();
    let all = engine.config_get("*").unwrap();
    let names: Vec<&str> = all.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "MULTI_TEXT_OFFSET_DELTA",
            "MINPREFIX",
            "MAXEXPANSIONS",
            "TIMEOUT",
            "ON_TIMEOUT",
            "DEFAULT_DIALECT",
            "GC_POLICY",
            "FORK_GC_RUN_INTERVAL",
            "FORK_GC_CLEAN_THRESHOLD",
            "DEFAULT_SCORER",
        ]
    );
}

#[test]
fn test_rejected_values_leave_config_untouched() {
    let engine = engine();
    for (name, value) in [
        ("MULTI_TEXT_OFFSET_DELTA", "-1"),
        ("MULTI_TEXT_OFFSET_DELTA", "many"),
        ("MINPREFIX", "0"),
        ("MAXEXPANSIONS", "0"),
        ("DEFAULT_DIALECT", "9"),
        ("GC_POLICY", "lazy"),
        ("ON_TIMEOUT", "ignore"),
        ("DEFAULT_SCORER", "PAGERANK"),
        ("NO_SUCH_OPTION", "1"),
    ] {
        assert!(engine.config_set(name, value).is_err(), "{} {}", name, value);
    }
    assert_eq!(*engine.config(), SearchConfig::default());
}

#[test]
fn test_names_are_case_insensitive() {
    let engine = engine();
    engine.config_set("default_scorer", "bm25").unwrap();
    assert_eq!(
        engine.config_get("Default_Scorer").unwrap(),
        vec![("DEFAULT_SCORER".to_string(), "BM25".to_string())]
    );
}

#[test]
fn test_snapshot_is_stable_across_updates() {
    let engine = engine();
    let before = engine.config();
    engine.config_set("MINPREFIX", "5").unwrap();
    assert_eq!(before.min_prefix, 2);
    assert_eq!(engine.config().min_prefix, 5);
}

#[test]
fn test_offset_delta_applies_to_later_writes() {
    let engine = engine();
    engine
        .create_index(json_index("idx", vec![FieldSpec::text("$.v").alias("v")]))
        .unwrap();
    engine.json_set("a", "$", serde_json::json!({"v": ["alpha", "omega"]})).unwrap();
    engine.config_set("MULTI_TEXT_OFFSET_DELTA", "0").unwrap();
    engine.json_set("b", "$", serde_json::json!({"v": ["alpha", "omega"]})).unwrap();

    // a: alpha=1 omega=101; b: alpha=1 omega=2
    let keys = search_keys(&engine, "idx", SearchRequest::new("@v:(alpha omega)").slop(0));
    assert_eq!(keys, strings(&["b"]));
    let mut keys = search_keys(&engine, "idx", SearchRequest::new("@v:(alpha omega)").slop(99));
    keys.sort();
    assert_eq!(keys, strings(&["a", "b"]));
}

#[test]
fn test_config_commands() {
    let executor = Executor::new(Arc::new(engine()));
    executor
        .execute(Command::ConfigSet {
            option: "TIMEOUT".into(),
            value: "0".into(),
        })
        .unwrap();
    let output = executor
        .execute(Command::ConfigGet {
            option: "TIMEOUT".into(),
        })
        .unwrap();
    assert_eq!(output, Output::ConfigPairs(vec![("TIMEOUT".into(), "0".into())]));

    let err = executor
        .execute(Command::ConfigSet {
            option: "BOGUS".into(),
            value: "1".into(),
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid option: BOGUS");
}

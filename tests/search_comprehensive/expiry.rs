//! Idle expiry of temporary indexes, key TTLs, and garbage collection

use crate::common::*;
use std::thread;
use std::time::{Duration, Instant};

fn temporary_engine(secs: u64) -> Engine {
    let engine = engine();
    engine
        .create_index(
            IndexDefinition::new("idx", StorageModel::Hash)
                .temporary(secs)
                .field(FieldSpec::text("title")),
        )
        .unwrap();
    engine
}

/// Runs `access` after a short pause and checks it restarted the idle window
/// that began at `window`; returns the start of the new window
fn assert_access_resets(engine: &Engine, window: Instant, access: impl FnOnce(&Engine)) -> Instant {
    thread::sleep(Duration::from_millis(5));
    let before = Instant::now();
    access(engine);
    assert_eq!(engine.debug_ttl_at("idx", before + Duration::from_millis(2500)).unwrap(), 1);
    let report = engine.sweep(window + Duration::from_secs(4));
    assert!(report.expired_indexes.is_empty());
    before
}

#[test]
fn test_debug_ttl_counts_down_and_resets() {
    let engine = temporary_engine(4);
    let created = Instant::now();
    assert_eq!(engine.debug_ttl_at("idx", created + Duration::from_millis(1)).unwrap(), 3);
    assert_eq!(engine.debug_ttl_at("idx", created + Duration::from_millis(2500)).unwrap(), 1);
    assert_eq!(engine.debug_ttl_at("idx", created + Duration::from_secs(4)).unwrap(), 0);
    assert_eq!(engine.debug_ttl_at("idx", created + Duration::from_secs(60)).unwrap(), 0);

    let window = assert_access_resets(&engine, created, |engine| {
        engine.hset("doc:1", [("title", "hello world")]).unwrap();
    });
    let window = assert_access_resets(&engine, window, |engine| {
        assert_eq!(sorted_keys(engine, "idx", "hello"), strings(&["doc:1"]));
    });
    let window = assert_access_resets(&engine, window, |engine| {
        engine.aggregate("idx", &AggregateRequest::new("*")).unwrap();
    });

    // Introspection alone does not count as access
    engine.debug_ttl("idx").unwrap();
    engine.info("idx").unwrap();
    let report = engine.sweep(window + Duration::from_secs(5));
    assert_eq!(report.expired_indexes, strings(&["idx"]));
}

#[test]
fn test_elapsed_key_ttl_hides_match_before_sweep() {
    let engine = engine();
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("title")))
        .unwrap();
    engine.hset("doc:1", [("title", "ephemeral")]).unwrap();
    engine.hset("doc:2", [("title", "ephemeral but kept")]).unwrap();
    assert!(engine.expire("doc:1", Duration::from_millis(50)));
    thread::sleep(Duration::from_millis(200));

    let response = engine.search("idx", &SearchRequest::new("ephemeral")).unwrap();
    assert_eq!(response.total, 1);
    assert_eq!(response.keys(), vec!["doc:2"]);
    assert!(response.hits.iter().all(|h| h.fields.as_ref().map_or(false, |f| !f.is_empty())));

    // The lazy purge removed the key and retired its document
    assert_eq!(total(&engine, "idx", SearchRequest::new("ephemeral")), 1);
    assert!(engine.get("doc:1").is_none());
    assert_eq!(engine.info("idx").unwrap().num_docs, 1);

    let rows = engine.aggregate("idx", &AggregateRequest::new("ephemeral")).unwrap();
    assert_eq!(rows.total, 1);
}

#[test]
fn test_idle_index_expires() {
    let engine = temporary_engine(4);
    engine.hset("doc:1", [("title", "hello")]).unwrap();

    let report = engine.sweep(Instant::now() + Duration::from_secs(1));
    assert!(report.expired_indexes.is_empty());
    assert_eq!(total(&engine, "idx", SearchRequest::new("hello")), 1);

    let report = engine.sweep(Instant::now() + Duration::from_secs(5));
    assert_eq!(report.expired_indexes, strings(&["idx"]));
    assert_eq!(search_error(&engine, "idx", SearchRequest::new("hello")), "Unknown index name");
    assert!(engine.debug_ttl("idx").is_err());
    assert!(engine.info("idx").is_err());

    // Documents outlive the index
    assert!(engine.get("doc:1").is_some());
}

#[test]
fn test_permanent_index_reports_minus_one() {
    let engine = engine();
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("title")))
        .unwrap();
    assert_eq!(engine.debug_ttl("idx").unwrap(), -1);
    let report = engine.sweep(Instant::now() + Duration::from_secs(3600));
    assert!(report.expired_indexes.is_empty());
    assert_eq!(engine.debug_ttl("idx").unwrap(), -1);
}

#[test]
fn test_expired_keys_leave_the_index() {
    let engine = engine_with(&[("FORK_GC_CLEAN_THRESHOLD", "0")]);
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("title")))
        .unwrap();

    const N: usize = 20;
    for i in 0..N {
        let key = format!("doc:{}", i);
        engine.hset(&key, [("title", "fleeting words")]).unwrap();
        assert!(engine.expire(&key, Duration::from_secs(2)));
    }
    engine.hset("stay", [("title", "fleeting but kept")]).unwrap();
    assert_eq!(total(&engine, "idx", SearchRequest::new("fleeting")), N + 1);

    let report = engine.sweep(Instant::now() + Duration::from_secs(3));
    assert_eq!(report.expired_keys, N);
    assert_eq!(report.gc_queued, 1);

    assert_eq!(sorted_keys(&engine, "idx", "fleeting"), strings(&["stay"]));
    let info = engine.info("idx").unwrap();
    assert_eq!(info.num_docs, 1);
    assert_eq!(info.gc.docs_collected, N as u64);
    assert!(info.gc.entries_collected > 0);
}

#[test]
fn test_persist_cancels_expiry() {
    let engine = engine();
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("title")))
        .unwrap();
    engine.hset("doc:1", [("title", "durable")]).unwrap();
    assert!(engine.expire("doc:1", Duration::from_secs(1)));
    assert!(engine.persist("doc:1"));

    let report = engine.sweep(Instant::now() + Duration::from_secs(10));
    assert_eq!(report.expired_keys, 0);
    assert_eq!(sorted_keys(&engine, "idx", "durable"), strings(&["doc:1"]));
}

#[test]
fn test_sync_gc_collects_on_delete() {
    let engine = engine_with(&[("GC_POLICY", "SYNC")]);
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("title")))
        .unwrap();
    for i in 0..5 {
        engine.hset(&format!("doc:{}", i), [("title", "gone soon")]).unwrap();
    }
    for i in 0..5 {
        assert!(engine.del(&format!("doc:{}", i)));
    }

    let info = engine.info("idx").unwrap();
    assert_eq!(info.num_docs, 0);
    assert_eq!(info.gc.docs_collected, 5);
    assert_eq!(info.num_terms, 0);
}

#[test]
fn test_force_invoke_under_fork_policy() {
    let engine = engine();
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("title")))
        .unwrap();
    engine.hset("doc:1", [("title", "alpha")]).unwrap();
    engine.hset("doc:2", [("title", "beta")]).unwrap();
    engine.del("doc:1");

    // Below the clean threshold nothing is due
    let report = engine.sweep(Instant::now());
    assert_eq!(report.gc_queued, 0);
    assert_eq!(engine.info("idx").unwrap().gc.docs_collected, 0);

    let stats = engine.debug_gc_force_invoke("idx").unwrap();
    assert_eq!(stats.docs_collected, 1);
    assert_eq!(stats.cycles, 1);
    assert!(sorted_keys(&engine, "idx", "alpha").is_empty());
    assert_eq!(sorted_keys(&engine, "idx", "beta"), strings(&["doc:2"]));
}

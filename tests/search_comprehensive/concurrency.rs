//! Readers racing writers see whole documents, never a mix of two versions

use crate::common::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn setup() -> Arc<Engine> {
    let engine = engine_with(&[("GC_POLICY", "SYNC")]);
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("t")))
        .unwrap();
    Arc::new(engine)
}

#[test]
fn test_no_torn_reads() {
    let engine = setup();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let engine = Arc::clone(&engine);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for round in 0..300 {
                let key = format!("doc:{}", round % 10);
                // Every version holds both words, so "alpha without beta" never matches
                let body = if round % 2 == 0 { "alpha beta" } else { "beta alpha gamma" };
                engine.hset(&key, [("t", body)]).unwrap();
                if round % 7 == 0 {
                    engine.del(&key);
                }
            }
            done.store(true, Ordering::Release);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut checks = 0;
                while !done.load(Ordering::Acquire) || checks < 50 {
                    let torn = engine
                        .search("idx", &SearchRequest::new("@t:(alpha) -@t:(beta)"))
                        .unwrap();
                    assert_eq!(torn.total, 0);
                    let both = engine.search("idx", &SearchRequest::new("alpha beta").limit(0, 0)).unwrap();
                    let any = engine.search("idx", &SearchRequest::new("alpha").limit(0, 0)).unwrap();
                    assert!(both.total <= 10 && any.total <= 10);
                    checks += 1;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let both = total(&engine, "idx", SearchRequest::new("alpha beta"));
    let any = total(&engine, "idx", SearchRequest::new("alpha"));
    assert_eq!(both, any);
    assert_eq!(engine.info("idx").unwrap().num_docs, any);
}

#[test]
fn test_parallel_writers_on_distinct_keys() {
    let engine = setup();
    let handles: Vec<_> = (0..4)
        .map(|w| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..50 {
                    engine
                        .hset(&format!("w{}:{}", w, i), [("t", format!("shared writer{}", w))])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(total(&engine, "idx", SearchRequest::new("shared")), 200);
    for w in 0..4 {
        assert_eq!(total(&engine, "idx", SearchRequest::new(format!("writer{}", w))), 50);
    }
}

#[test]
fn test_background_sweeper_runs() {
    let engine = Engine::builder()
        .config(SearchConfig::default())
        .background(true)
        .sweep_tick(std::time::Duration::from_millis(20))
        .open()
        .unwrap();
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("t")))
        .unwrap();
    engine.hset("doc:1", [("t", "ephemeral")]).unwrap();
    assert!(engine.expire("doc:1", std::time::Duration::from_millis(50)));

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while engine.get("doc:1").is_some() && std::time::Instant::now() < deadline {
        thread::sleep(std::time::Duration::from_millis(20));
    }
    assert!(engine.get("doc:1").is_none());
    assert_eq!(total(&engine, "idx", SearchRequest::new("ephemeral")), 0);
    engine.shutdown();
}

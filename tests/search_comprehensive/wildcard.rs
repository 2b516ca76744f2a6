//! Pattern expansion checked against a brute-force scan of the data

use crate::common::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DOCS: usize = 400;

/// Glob match with `*` only, the subset the corpus below needs
fn glob(pattern: &str, word: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == word;
    }
    let (first, last) = (parts[0], parts[parts.len() - 1]);
    if !word.starts_with(first) || word.len() < first.len() + last.len() || !word.ends_with(last) {
        return false;
    }
    let mut rest = &word[first.len()..word.len() - last.len()];
    for middle in &parts[1..parts.len() - 1] {
        match rest.find(middle) {
            Some(at) => rest = &rest[at + middle.len()..],
            None => return false,
        }
    }
    true
}

struct Corpus {
    words: Vec<Vec<String>>,
    tags: Vec<String>,
}

impl Corpus {
    fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut words = Vec::with_capacity(DOCS);
        let mut tags = Vec::with_capacity(DOCS);
        for _ in 0..DOCS {
            let n = rng.gen_range(1..4);
            words.push(
                (0..n)
                    .map(|_| format!("w{}x{}", rng.gen_range(0..500), rng.gen_range(0..50)))
                    .collect(),
            );
            tags.push(rng.gen_range(0..10_000).to_string());
        }
        Corpus { words, tags }
    }

    fn load(&self, engine: &Engine) {
        for (i, (words, tag)) in self.words.iter().zip(&self.tags).enumerate() {
            engine
                .hset(&format!("doc:{}", i), [("t", words.join(" ")), ("tag", tag.clone())])
                .unwrap();
        }
    }

    fn text_matches(&self, pattern: &str) -> usize {
        self.words
            .iter()
            .filter(|words| words.iter().any(|w| glob(pattern, w)))
            .count()
    }

    fn tag_matches(&self, pattern: &str) -> usize {
        self.tags.iter().filter(|t| glob(pattern, t)).count()
    }
}

fn setup(suffix_trie: bool) -> (Engine, Corpus) {
    let engine = engine_with(&[
        ("DEFAULT_DIALECT", "2"),
        ("MINPREFIX", "1"),
        ("TIMEOUT", "0"),
        ("MAXEXPANSIONS", "1000000"),
    ]);
    let (mut text, mut tag) = (FieldSpec::text("t"), FieldSpec::tag("tag"));
    if suffix_trie {
        text = text.with_suffix_trie();
        tag = tag.with_suffix_trie();
    }
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(text).field(tag))
        .unwrap();
    let corpus = Corpus::generate(7);
    corpus.load(&engine);
    (engine, corpus)
}

const TEXT_PATTERNS: &[&str] = &["w1*", "w12*", "*x7", "*x1", "*22*", "*3x*", "w4*x2", "*0x0*"];
const TAG_PATTERNS: &[&str] = &["1*", "99*", "*7", "*00", "*22*", "*5*", "1*9"];

fn check(engine: &Engine, corpus: &Corpus) {
    for pattern in TEXT_PATTERNS {
        let expected = corpus.text_matches(pattern);
        let query = format!("'{}'=>{{$type:wildcard}}", pattern);
        assert_eq!(total(engine, "idx", SearchRequest::new(&query)), expected, "{}", query);
    }
    for pattern in TAG_PATTERNS {
        let expected = corpus.tag_matches(pattern);
        let query = format!("@tag:{{'{}'}}=>{{$type:wildcard}}", pattern);
        assert_eq!(total(engine, "idx", SearchRequest::new(&query)), expected, "{}", query);
    }
}

#[test]
fn test_wildcard_brute_force() {
    let (engine, corpus) = setup(false);
    check(&engine, &corpus);
}

#[test]
fn test_wildcard_with_suffix_trie() {
    let (engine, corpus) = setup(true);
    check(&engine, &corpus);
}

#[test]
fn test_prefix_suffix_contains_terms() {
    let (engine, corpus) = setup(true);
    for (query, pattern) in [("w12*", "w12*"), ("*x7", "*x7"), ("*22*", "*22*")] {
        assert_eq!(total(&engine, "idx", SearchRequest::new(query)), corpus.text_matches(pattern), "{}", query);
    }
    assert_eq!(
        total(&engine, "idx", SearchRequest::new("@tag:{*22*}")),
        corpus.tag_matches("*22*")
    );
}

#[test]
fn test_wildcard_needs_dialect_two() {
    let (engine, _) = setup(false);
    let message = search_error(&engine, "idx", SearchRequest::new("'*22*'=>{$type:wildcard}").dialect(1));
    assert!(message.contains("DIALECT 2"), "{}", message);
}

#[test]
fn test_min_prefix() {
    let (engine, corpus) = setup(false);
    engine.config_set("MINPREFIX", "3").unwrap();
    let message = search_error(&engine, "idx", SearchRequest::new("w1*"));
    assert!(message.contains("minimum prefix length 3"), "{}", message);
    assert_eq!(total(&engine, "idx", SearchRequest::new("w12*")), corpus.text_matches("w12*"));
}

#[test]
fn test_max_expansions() {
    let (engine, corpus) = setup(true);
    engine.config_set("MAXEXPANSIONS", "3").unwrap();

    let response = engine.search("idx", &SearchRequest::new("w*").limit(0, 0)).unwrap();
    assert!(response.truncated);
    assert!(response.total <= corpus.text_matches("w*"));

    engine.config_set("ON_TIMEOUT", "fail").unwrap();
    let message = search_error(&engine, "idx", SearchRequest::new("w*"));
    assert!(message.contains("Max prefix expansions"), "{}", message);
}

#[test]
fn test_contains_exact_count() {
    let engine = engine_with(&[("TIMEOUT", "0"), ("MAXEXPANSIONS", "100000")]);
    engine
        .create_index(IndexDefinition::new("idx", StorageModel::Hash).field(FieldSpec::text("t").with_suffix_trie()))
        .unwrap();
    let mut terms = Vec::new();
    for i in 0..10_000 {
        for stem in ["foo", "fooo"] {
            let term = format!("{}{}", stem, i);
            engine.hset(&format!("{}:{}", stem, i), [("t", term.clone())]).unwrap();
            terms.push(term);
        }
    }

    for pattern in ["*555*", "foo55*", "*o555", "*99*"] {
        let expected = terms.iter().filter(|t| glob(pattern, t)).count();
        assert_eq!(total(&engine, "idx", SearchRequest::new(pattern)), expected, "{}", pattern);
    }
    assert_eq!(total(&engine, "idx", SearchRequest::new("*")), 20_000);
}

#[test]
fn test_glob_helper() {
    assert!(glob("*22*", "w122x3"));
    assert!(glob("w4*x2", "w41x2"));
    assert!(!glob("w4*x2", "w4x"));
    assert!(glob("*0x0*", "w10x0"));
    assert!(!glob("1*9", "19x"));
}

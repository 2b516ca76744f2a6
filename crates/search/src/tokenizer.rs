//! Text tokenizer shared by indexing and query parsing
//!
//! Pipeline: UAX#29 word boundaries → strip possessives → remove non-alphanumerics
//!           → lowercase → remove stopwords
//!
//! Indexing and query terms go through the same pipeline, so a query word
//! always lands on the term the document produced.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Standard English stopwords (Lucene's default set).
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static DEFAULT_SET: Lazy<FxHashSet<String>> =
    Lazy::new(|| DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect());

/// Strip English possessive suffix (`'s` / `\u{2019}s`).
#[inline]
fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .unwrap_or(word)
}

/// Lowercase a word and drop everything but alphanumerics
pub fn normalize(word: &str) -> String {
    strip_possessive(word)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Tokenizer with an index-specific stopword list
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stopwords: FxHashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            stopwords: DEFAULT_SET.clone(),
        }
    }
}

impl Tokenizer {
    /// Tokenizer with a custom stopword list; an empty list disables stopwords
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Tokenizer {
            stopwords: words.into_iter().map(|w| normalize(w.as_ref())).collect(),
        }
    }

    /// Tokenizer for an index definition's optional stopword override
    pub fn for_index(stopwords: Option<&[String]>) -> Self {
        match stopwords {
            Some(words) => Self::with_stopwords(words),
            None => Self::default(),
        }
    }

    /// Check if a normalized token is a stopword
    #[inline]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Number of stopwords
    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    /// Tokenize text into searchable terms.
    ///
    /// # Example
    ///
    /// ```
    /// use sieve_search::Tokenizer;
    ///
    /// let tokens = Tokenizer::default().tokenize("The Quick Brown Fox's den");
    /// assert_eq!(tokens, vec!["quick", "brown", "fox", "den"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(normalize)
            .filter(|s| !s.is_empty())
            .filter(|s| !self.is_stopword(s))
            .collect()
    }
}

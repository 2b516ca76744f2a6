//! Multi-value text encoding
//!
//! Turns the values of one TEXT field into per-term position lists. Positions
//! are 1-based and shared across the values of the field: the first token of
//! each following value is placed `max(delta, 1)` after the last token of the
//! previous value, so tokens from different elements never look adjacent.
//! Stopwords are dropped and do not consume a position.

use crate::tokenizer::Tokenizer;
use sieve_core::Position;
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Positions of every term of one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedField {
    /// Term → ascending positions
    pub terms: BTreeMap<String, SmallVec<[Position; 4]>>,
    /// Retained tokens
    pub token_count: u32,
}

/// Encoder for multi-value TEXT fields
#[derive(Debug, Clone, Copy)]
pub struct MultiValueEncoder<'a> {
    tokenizer: &'a Tokenizer,
    offset_delta: u32,
}

impl<'a> MultiValueEncoder<'a> {
    /// Create an encoder with the MULTI_TEXT_SLOP gap
    pub fn new(tokenizer: &'a Tokenizer, offset_delta: u32) -> Self {
        MultiValueEncoder {
            tokenizer,
            offset_delta,
        }
    }

    /// Encode the values in order
    pub fn encode<S: AsRef<str>>(&self, values: &[S]) -> EncodedField {
        let gap = self.offset_delta.max(1);
        let mut out = EncodedField::default();
        let mut last: Position = 0;

        for value in values {
            let tokens = self.tokenizer.tokenize(value.as_ref());
            if tokens.is_empty() {
                continue;
            }
            let mut next = if last == 0 { 1 } else { last.saturating_add(gap) };
            for token in tokens {
                out.terms.entry(token).or_default().push(next);
                last = next;
                next = next.saturating_add(1);
                out.token_count += 1;
            }
        }
        out
    }
}

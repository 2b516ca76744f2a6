//! Glob-style term patterns with a three-state matcher
//!
//! `?` matches exactly one character, `*` matches any run (including the
//! empty one), and `\` makes the next character literal. Matching a partial
//! key returns [`MatchState::Partial`] when some extension of the key could
//! still match, which lets a trie walk prune dead subtrees early.

use smallvec::SmallVec;
use std::fmt;

/// One element of a compiled pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A literal character
    Literal(char),
    /// `?`
    AnyOne,
    /// `*`
    AnyRun,
}

/// Result of matching a (possibly partial) key against a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// The key matches the whole pattern
    Full,
    /// The key is a prefix of some matching string
    Partial,
    /// No extension of the key can match
    NoMatch,
}

/// A compiled wildcard pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    tokens: Vec<Token>,
}

impl WildcardPattern {
    /// Compile a pattern, collapsing consecutive `*`
    pub fn parse(pattern: &str) -> Self {
        let mut tokens = Vec::with_capacity(pattern.len());
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let token = match c {
                '\\' => match chars.next() {
                    Some(escaped) => Token::Literal(escaped),
                    None => Token::Literal('\\'),
                },
                '?' => Token::AnyOne,
                '*' => Token::AnyRun,
                other => Token::Literal(other),
            };
            if token == Token::AnyRun && tokens.last() == Some(&Token::AnyRun) {
                continue;
            }
            tokens.push(token);
        }
        WildcardPattern { tokens }
    }

    /// Compiled tokens
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of literal characters and `?` placeholders
    pub fn literal_len(&self) -> usize {
        self.tokens.iter().filter(|t| **t != Token::AnyRun).count()
    }

    /// Literal characters before the first wildcard
    pub fn fixed_prefix(&self) -> String {
        self.tokens
            .iter()
            .map_while(|t| match t {
                Token::Literal(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// True if the pattern has no wildcard at all
    pub fn is_literal(&self) -> bool {
        self.tokens.iter().all(|t| matches!(t, Token::Literal(_)))
    }

    /// Match `text` against the pattern
    pub fn match_state(&self, text: &str) -> MatchState {
        let n = self.tokens.len();
        // states[p] == true: the pattern position p is reachable
        let mut states: SmallVec<[bool; 32]> = SmallVec::from_elem(false, n + 1);
        states[0] = true;
        self.close_over_stars(&mut states);

        for c in text.chars() {
            let mut next: SmallVec<[bool; 32]> = SmallVec::from_elem(false, n + 1);
            let mut any = false;
            for p in 0..n {
                if !states[p] {
                    continue;
                }
                match self.tokens[p] {
                    Token::AnyRun => {
                        next[p] = true;
                        any = true;
                    }
                    Token::AnyOne => {
                        next[p + 1] = true;
                        any = true;
                    }
                    Token::Literal(l) if l == c => {
                        next[p + 1] = true;
                        any = true;
                    }
                    Token::Literal(_) => {}
                }
            }
            if !any {
                return MatchState::NoMatch;
            }
            self.close_over_stars(&mut next);
            states = next;
        }

        if states[n] {
            MatchState::Full
        } else {
            MatchState::Partial
        }
    }

    /// True if `text` matches the whole pattern
    pub fn matches(&self, text: &str) -> bool {
        self.match_state(text) == MatchState::Full
    }

    fn close_over_stars(&self, states: &mut [bool]) {
        for p in 0..self.tokens.len() {
            if states[p] && self.tokens[p] == Token::AnyRun {
                states[p + 1] = true;
            }
        }
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.tokens {
            match t {
                Token::Literal(c @ ('*' | '?' | '\\')) => write!(f, "\\{}", c)?,
                Token::Literal(c) => write!(f, "{}", c)?,
                Token::AnyOne => write!(f, "?")?,
                Token::AnyRun => write!(f, "*")?,
            }
        }
        Ok(())
    }
}

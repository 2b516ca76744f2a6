//! JSON path expressions used by JSON-backed index schemas
//!
//! A schema field on a JSON index names a path that may select zero, one, or
//! many values of a document. Resolution is a pure function of the path and
//! the document tree; storage is not involved.
//!
//! # Path Syntax (Subset)
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `$` | Root | `$` |
//! | `.key` | Object property | `$.user` |
//! | `['key']` | Quoted property | `$['first name']` |
//! | `[n]` | Array index, negative counts from the end | `$.items[-1]` |
//! | `[*]` / `.*` | Every element or member | `$.items[*]` |
//! | `..key` | Recursive descent | `$..name` |
//!
//! Legacy paths without the leading `$` (`user.name`, `.user.name`) are
//! accepted and resolve from the root.
//!
//! A path is *definite* when it has no wildcard and no recursive segment.
//! Definite paths select at most one value; multi-value fields built from a
//! definite path keep their element order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for JSON path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// Unclosed bracket
    #[error("unclosed bracket starting at position {0}")]
    UnclosedBracket(usize),
    /// Invalid array index
    #[error("invalid array index at position {0}: {1}")]
    InvalidIndex(usize, String),
    /// Unexpected character
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// A segment in a JSON path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object key: `.foo`
    Key(String),
    /// Array index: `[0]`, `[-1]`
    Index(i64),
    /// Every array element or object member: `[*]`
    Wildcard,
    /// Recursive descent: `..foo`, or `..*` when `None`
    Descendant(Option<String>),
}

impl PathSegment {
    /// True if this segment may select more than one value
    pub fn is_multi(&self) -> bool {
        matches!(self, PathSegment::Wildcard | PathSegment::Descendant(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, ".{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
            PathSegment::Wildcard => write!(f, "[*]"),
            PathSegment::Descendant(Some(k)) => write!(f, "..{}", k),
            PathSegment::Descendant(None) => write!(f, "..*"),
        }
    }
}

/// A parsed path into a JSON document
///
/// # Examples
///
/// ```
/// use sieve_core::json::JsonPath;
/// use serde_json::json;
///
/// let path: JsonPath = "$.books[*].name".parse().unwrap();
/// assert!(!path.is_definite());
///
/// let doc = json!({"books": [{"name": "a"}, {"name": "b"}]});
/// let names: Vec<_> = path.resolve(&doc).into_iter().cloned().collect();
/// assert_eq!(names, vec![json!("a"), json!("b")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Create the root path `$`
    pub fn root() -> Self {
        JsonPath {
            segments: Vec::new(),
        }
    }

    /// Create a path from segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        JsonPath { segments }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a key segment (builder)
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Key(key.into()));
        self
    }

    /// Append an index segment (builder)
    pub fn index(mut self, idx: i64) -> Self {
        self.segments.push(PathSegment::Index(idx));
        self
    }

    /// Append a wildcard segment (builder)
    pub fn wildcard(mut self) -> Self {
        self.segments.push(PathSegment::Wildcard);
        self
    }

    /// True if the path selects at most one value
    pub fn is_definite(&self) -> bool {
        !self.segments.iter().any(PathSegment::is_multi)
    }

    /// Resolve the path against a document, in document order
    pub fn resolve<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match segment {
                    PathSegment::Key(k) => {
                        if let Some(child) = value.as_object().and_then(|m| m.get(k)) {
                            next.push(child);
                        }
                    }
                    PathSegment::Index(i) => {
                        if let Some(arr) = value.as_array() {
                            let len = arr.len() as i64;
                            let idx = if *i < 0 { len + i } else { *i };
                            if (0..len).contains(&idx) {
                                next.push(&arr[idx as usize]);
                            }
                        }
                    }
                    PathSegment::Wildcard => match value {
                        Value::Array(arr) => next.extend(arr.iter()),
                        Value::Object(map) => next.extend(map.values()),
                        _ => {}
                    },
                    PathSegment::Descendant(name) => collect_descendants(value, name.as_deref(), &mut next),
                }
            }
            current = next;
        }
        current
    }

    /// Render the path in `$` notation
    pub fn to_path_string(&self) -> String {
        let mut out = String::from("$");
        for seg in &self.segments {
            out.push_str(&seg.to_string());
        }
        out
    }
}

fn collect_descendants<'a>(value: &'a Value, name: Option<&str>, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, child) in map {
                if name.map_or(true, |n| n == k) {
                    out.push(child);
                }
                collect_descendants(child, name, out);
            }
        }
        Value::Array(arr) => {
            for child in arr {
                if name.is_none() {
                    out.push(child);
                }
                collect_descendants(child, name, out);
            }
        }
        _ => {}
    }
}

fn is_key_char(c: char) -> bool {
    !(c == '.' || c == '[' || c == ']' || c.is_whitespace())
}

impl FromStr for JsonPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        if chars.first() == Some(&'$') {
            i += 1;
        }

        while i < chars.len() {
            match chars[i] {
                '.' if chars.get(i + 1) == Some(&'.') => {
                    i += 2;
                    if chars.get(i) == Some(&'*') {
                        segments.push(PathSegment::Descendant(None));
                        i += 1;
                        continue;
                    }
                    let start = i;
                    while i < chars.len() && is_key_char(chars[i]) {
                        i += 1;
                    }
                    if start == i {
                        return Err(PathParseError::EmptyKey(start));
                    }
                    segments.push(PathSegment::Descendant(Some(chars[start..i].iter().collect())));
                }
                '.' => {
                    i += 1;
                    match chars.get(i) {
                        None => return Err(PathParseError::EmptyKey(i)),
                        // `$.[*]` is the same as `$[*]`
                        Some('[') => continue,
                        Some('*') => {
                            segments.push(PathSegment::Wildcard);
                            i += 1;
                        }
                        Some(_) => {
                            let start = i;
                            while i < chars.len() && is_key_char(chars[i]) {
                                i += 1;
                            }
                            if start == i {
                                return Err(PathParseError::EmptyKey(start));
                            }
                            segments.push(PathSegment::Key(chars[start..i].iter().collect()));
                        }
                    }
                }
                '[' => {
                    let start = i;
                    i += 1;
                    let inner_start = i;
                    let mut quote: Option<char> = None;
                    while i < chars.len() {
                        match (quote, chars[i]) {
                            (None, ']') => break,
                            (None, q @ ('\'' | '"')) => quote = Some(q),
                            (Some(q), c) if c == q => quote = None,
                            _ => {}
                        }
                        i += 1;
                    }
                    if i >= chars.len() {
                        return Err(PathParseError::UnclosedBracket(start));
                    }
                    let inner: String = chars[inner_start..i].iter().collect();
                    let inner = inner.trim();
                    i += 1;

                    if inner == "*" {
                        segments.push(PathSegment::Wildcard);
                    } else if let Some(key) = inner
                        .strip_prefix('\'')
                        .and_then(|s| s.strip_suffix('\''))
                        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                    {
                        segments.push(PathSegment::Key(key.to_string()));
                    } else {
                        let idx = inner
                            .parse::<i64>()
                            .map_err(|_| PathParseError::InvalidIndex(inner_start, inner.to_string()))?;
                        segments.push(PathSegment::Index(idx));
                    }
                }
                c if is_key_char(c) && segments.is_empty() && c != '$' => {
                    // Legacy path without `$`/leading dot
                    let start = i;
                    while i < chars.len() && is_key_char(chars[i]) {
                        i += 1;
                    }
                    segments.push(PathSegment::Key(chars[start..i].iter().collect()));
                }
                c => return Err(PathParseError::UnexpectedChar(c, i)),
            }
        }

        Ok(JsonPath { segments })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

/// Name of a JSON value's type, as reported in indexing failures
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a resolved value for output: strings verbatim, everything else as compact JSON
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

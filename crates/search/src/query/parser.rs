//! Recursive-descent query parser
//!
//! ```text
//! query     := union
//! union     := intersect ('|' intersect)*
//! intersect := unary+
//! unary     := '-' unary | atom attrs?
//! atom      := '(' union ')' | '@' field ('|' field)* ':' fieldexpr
//!            | '"' words '"' | term | '*'
//! fieldexpr := '(' union ')' | '{' tag ('|' tag)* '}' | '[' num num ']'
//!            | term | '"' words '"'
//! term      := word | word '*' | '*' word | '*' word '*' | '\'' pattern '\''
//! attrs     := '=>' '{' '$' name ':' value (';' '$' name ':' value)* ';'? '}'
//! ```
//!
//! A `-` inside a word (`foo-bar`) belongs to the word; only a `-` that
//! starts a term negates it.
//!
//! Punctuation that is not part of the grammar separates words. Words go
//! through the index tokenizer, so stopwords vanish and a word that splits
//! into several tokens becomes an exact phrase.

use super::ast::{Attributes, NodeKind, QueryNode, TagMatch, TagValue};
use crate::error::{QueryError, QueryResult};
use crate::tokenizer::{normalize, Tokenizer};
use sieve_storage::{NumBound, TermPattern, WildcardPattern};

const STRUCTURAL: &[char] = &['(', ')', '|', '-', '@', '{', '}', '[', ']', ':', '"', '\'', '*', '\\'];

/// Minimum dialect accepting `$type:wildcard`
pub const WILDCARD_DIALECT: u32 = 2;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A quoted pattern waiting for its attributes
struct Pending {
    raw: String,
    fields: Option<Vec<String>>,
}

/// Query parser bound to an index tokenizer and a dialect
#[derive(Debug, Clone, Copy)]
pub struct QueryParser<'t> {
    tokenizer: &'t Tokenizer,
    dialect: u32,
}

impl<'t> QueryParser<'t> {
    /// Create a parser
    pub fn new(tokenizer: &'t Tokenizer, dialect: u32) -> Self {
        QueryParser { tokenizer, dialect }
    }

    /// Parse a query string
    pub fn parse(&self, query: &str) -> QueryResult<QueryNode> {
        let mut cursor = Cursor {
            src: query,
            chars: query.char_indices().collect(),
            pos: 0,
            tokenizer: self.tokenizer,
            dialect: self.dialect,
        };
        let node = cursor.union(None)?;
        cursor.skip_separators();
        if let Some(c) = cursor.peek() {
            return Err(QueryError::syntax(cursor.offset(), format!("unexpected '{}'", c)));
        }
        Ok(node)
    }
}

struct Cursor<'q, 't> {
    src: &'q str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tokenizer: &'t Tokenizer,
    dialect: u32,
}

impl Cursor<'_, '_> {
    // ========================================================================
    // Character access
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.src.len(), |(o, _)| *o)
    }

    fn at_attrs(&self) -> bool {
        self.peek() == Some('=') && self.peek_at(1) == Some('>')
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if is_word_char(c) || STRUCTURAL.contains(&c) || self.at_attrs() {
                break;
            }
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> QueryResult<()> {
        match self.peek() {
            Some(c) if c == want => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(QueryError::syntax(
                self.offset(),
                format!("expected '{}', found '{}'", want, c),
            )),
            None => Err(QueryError::syntax(self.offset(), format!("expected '{}'", want))),
        }
    }

    /// Word characters with backslash escapes
    fn word(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
            } else if is_word_char(c) {
                out.push(c);
                self.pos += 1;
            } else if c == '-' && !out.is_empty() && self.peek_at(1).map_or(false, is_word_char) {
                // Hyphenated word; only a leading '-' negates
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    /// Text up to an unescaped `close`, consuming the delimiter
    fn quoted(&mut self, close: char) -> QueryResult<String> {
        let start = self.offset();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => {
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                }
                Some(c) if c == close => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(QueryError::syntax(start, format!("unterminated '{}'", close))),
            }
        }
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    fn union(&mut self, scope: Option<&[String]>) -> QueryResult<QueryNode> {
        let mut alternatives = vec![self.intersect(scope)?];
        loop {
            self.skip_separators();
            if self.peek() != Some('|') {
                break;
            }
            self.pos += 1;
            alternatives.push(self.intersect(scope)?);
        }
        Ok(QueryNode::union(alternatives))
    }

    fn intersect(&mut self, scope: Option<&[String]>) -> QueryResult<QueryNode> {
        let mut children = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None | Some(')') | Some('|') => break,
                _ => children.push(self.unary(scope)?),
            }
        }
        if children.is_empty() {
            return Err(QueryError::syntax(self.offset(), "empty expression"));
        }
        Ok(QueryNode::intersect(children, scope.map(<[String]>::to_vec)))
    }

    fn unary(&mut self, scope: Option<&[String]>) -> QueryResult<QueryNode> {
        self.skip_separators();
        if self.peek() == Some('-') {
            self.pos += 1;
            let inner = self.unary(scope)?;
            return Ok(QueryNode::new(NodeKind::Not(Box::new(inner))));
        }
        let start = self.offset();
        let (node, pending) = self.atom(scope)?;
        let attrs = self.attributes()?;
        self.finish(node, pending, attrs, start)
    }

    fn atom(&mut self, scope: Option<&[String]>) -> QueryResult<(QueryNode, Option<Pending>)> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.union(scope)?;
                self.skip_separators();
                self.expect(')')?;
                Ok((inner, None))
            }
            Some('@') => {
                self.pos += 1;
                let fields = self.field_list()?;
                self.field_expr(fields)
            }
            Some('"') => {
                self.pos += 1;
                let text = self.quoted('"')?;
                Ok((self.words(&text, scope, true), None))
            }
            Some('\'') => {
                self.pos += 1;
                let raw = self.quoted('\'')?;
                Ok((
                    QueryNode::new(NodeKind::Null),
                    Some(Pending {
                        raw,
                        fields: scope.map(<[String]>::to_vec),
                    }),
                ))
            }
            Some(_) => Ok((self.term(scope)?, None)),
            None => Err(QueryError::syntax(self.offset(), "unexpected end of query")),
        }
    }

    fn term(&mut self, scope: Option<&[String]>) -> QueryResult<QueryNode> {
        let start = self.offset();
        let leading = self.peek() == Some('*');
        if leading {
            self.pos += 1;
        }
        let raw = self.word();
        let trailing = !raw.is_empty() && self.peek() == Some('*');
        if trailing {
            self.pos += 1;
        }

        if raw.is_empty() {
            return match (leading, self.peek()) {
                (true, _) => Ok(QueryNode::new(NodeKind::Universe)),
                (false, Some(c)) => Err(QueryError::syntax(start, format!("unexpected '{}'", c))),
                (false, None) => Err(QueryError::syntax(start, "unexpected end of query")),
            };
        }

        let fields = scope.map(<[String]>::to_vec);
        if !leading && !trailing {
            return Ok(self.words(&raw, scope, true));
        }
        let literal = normalize(&raw);
        if literal.is_empty() {
            return Err(QueryError::syntax(start, "pattern has no literal characters"));
        }
        let pattern = match (leading, trailing) {
            (false, _) => TermPattern::Prefix(literal),
            (true, false) => TermPattern::Suffix(literal),
            (true, true) => TermPattern::Contains(literal),
        };
        Ok(QueryNode::new(NodeKind::Term { pattern, fields }))
    }

    /// Tokenized text as a term, an exact phrase, or nothing
    fn words(&self, text: &str, scope: Option<&[String]>, exact: bool) -> QueryNode {
        let fields = scope.map(<[String]>::to_vec);
        let mut tokens = self.tokenizer.tokenize(text);
        match tokens.len() {
            0 => QueryNode::new(NodeKind::Null),
            1 => QueryNode::term(tokens.remove(0), fields),
            _ => QueryNode::new(NodeKind::Phrase {
                children: tokens
                    .into_iter()
                    .map(|t| QueryNode::term(t, fields.clone()))
                    .collect(),
                exact,
                fields,
            }),
        }
    }

    fn field_list(&mut self) -> QueryResult<Vec<String>> {
        let mut fields = Vec::new();
        loop {
            let start = self.offset();
            let name = self.field_name();
            if name.is_empty() {
                return Err(QueryError::syntax(start, "expected a field name after '@'"));
            }
            fields.push(name);
            self.skip_whitespace();
            match self.peek() {
                Some('|') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some('@') {
                        self.pos += 1;
                    }
                }
                Some(':') => {
                    self.pos += 1;
                    return Ok(fields);
                }
                _ => return Err(QueryError::syntax(self.offset(), "expected ':' after field name")),
            }
        }
    }

    fn field_name(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
            } else if is_word_char(c) || c == '.' || c == '$' {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        out
    }

    fn single_field(&self, fields: &[String], start: usize) -> QueryResult<String> {
        match fields {
            [one] => Ok(one.clone()),
            _ => Err(QueryError::syntax(start, "tag and numeric filters take exactly one field")),
        }
    }

    fn field_expr(&mut self, fields: Vec<String>) -> QueryResult<(QueryNode, Option<Pending>)> {
        self.skip_whitespace();
        let start = self.offset();
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                let field = self.single_field(&fields, start)?;
                let values = self.tag_list()?;
                Ok((QueryNode::new(NodeKind::Tag { field, values }), None))
            }
            Some('[') => {
                self.pos += 1;
                let field = self.single_field(&fields, start)?;
                let (min, max) = self.numeric_range()?;
                Ok((QueryNode::new(NodeKind::Numeric { field, min, max }), None))
            }
            Some('-') => {
                self.pos += 1;
                let inner = self.unary(Some(fields.as_slice()))?;
                Ok((QueryNode::new(NodeKind::Not(Box::new(inner))), None))
            }
            _ => self.atom(Some(fields.as_slice())),
        }
    }

    fn tag_list(&mut self) -> QueryResult<Vec<TagValue>> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.offset();
            let value = match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some('\'') => {
                    self.pos += 1;
                    let raw = self.quoted('\'')?;
                    Some(TagValue {
                        raw,
                        kind: TagMatch::Exact,
                        quoted: true,
                    })
                }
                Some(_) => self.tag_value(),
                None => return Err(QueryError::syntax(start, "unterminated tag list")),
            };
            values.extend(value);
            self.skip_whitespace();
            match self.peek() {
                Some('|') => self.pos += 1,
                Some('}') => {}
                Some(c) => {
                    return Err(QueryError::syntax(self.offset(), format!("unexpected '{}' in tag list", c)))
                }
                None => return Err(QueryError::syntax(start, "unterminated tag list")),
            }
        }
        if values.is_empty() {
            return Err(QueryError::syntax(self.offset(), "empty tag list"));
        }
        Ok(values)
    }

    /// One unquoted tag; `*` markers are only recognised unescaped at the ends
    fn tag_value(&mut self) -> Option<TagValue> {
        let mut chars: Vec<(char, bool)> = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '|' | '}' => break,
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.bump() {
                        chars.push((escaped, true));
                    }
                }
                _ => {
                    chars.push((c, false));
                    self.pos += 1;
                }
            }
        }
        let blank = |&(c, escaped): &(char, bool)| !escaped && c.is_whitespace();
        while chars.last().map_or(false, blank) {
            chars.pop();
        }
        let skip = chars.iter().take_while(|c| blank(c)).count();
        let mut chars = &chars[skip..];

        let star = |c: Option<&(char, bool)>| matches!(c, Some(('*', false)));
        let leading = star(chars.first());
        if leading {
            chars = &chars[1..];
        }
        let trailing = star(chars.last());
        if trailing {
            chars = &chars[..chars.len() - 1];
        }
        let raw: String = chars.iter().map(|(c, _)| *c).collect();
        let raw = raw.trim().to_string();
        if raw.is_empty() {
            return None;
        }
        let kind = match (leading, trailing) {
            (false, false) => TagMatch::Exact,
            (false, true) => TagMatch::Prefix,
            (true, false) => TagMatch::Suffix,
            (true, true) => TagMatch::Contains,
        };
        Some(TagValue {
            raw,
            kind,
            quoted: false,
        })
    }

    fn numeric_range(&mut self) -> QueryResult<(NumBound, NumBound)> {
        let start = self.offset();
        let body = self.quoted(']')?;
        let bounds: Vec<&str> = body
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();
        match bounds.as_slice() {
            [min, max] => Ok((parse_bound(min, start)?, parse_bound(max, start)?)),
            _ => Err(QueryError::syntax(start, "numeric range needs exactly two bounds")),
        }
    }

    fn attributes(&mut self) -> QueryResult<Attributes> {
        let mut attrs = Attributes::default();
        let save = self.pos;
        self.skip_whitespace();
        if !self.at_attrs() {
            self.pos = save;
            return Ok(attrs);
        }
        self.pos += 2;
        self.skip_whitespace();
        self.expect('{')?;
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(attrs);
            }
            self.expect('$')?;
            let name_at = self.offset();
            let name = self.word().to_ascii_lowercase();
            self.skip_whitespace();
            self.expect(':')?;
            let mut value = String::new();
            while let Some(c) = self.peek() {
                if c == ';' || c == '}' {
                    break;
                }
                value.push(c);
                self.pos += 1;
            }
            let value = value.trim();
            let bad = |what: &str| QueryError::syntax(name_at, format!("invalid value '{}' for ${}", value, what));
            match name.as_str() {
                "slop" => attrs.slop = Some(value.parse().map_err(|_| bad("slop"))?),
                "inorder" => {
                    attrs.inorder = Some(match value.to_ascii_lowercase().as_str() {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        _ => return Err(bad("inorder")),
                    })
                }
                "weight" => {
                    let w: f64 = value.parse().map_err(|_| bad("weight"))?;
                    if !(w.is_finite() && w >= 0.0) {
                        return Err(bad("weight"));
                    }
                    attrs.weight = Some(w);
                }
                "type" => {
                    if !value.eq_ignore_ascii_case("wildcard") {
                        return Err(bad("type"));
                    }
                    attrs.wildcard = true;
                }
                other => {
                    return Err(QueryError::syntax(name_at, format!("Unknown attribute '{}'", other)));
                }
            }
            if self.peek() == Some(';') {
                self.pos += 1;
            }
        }
    }

    /// Apply attributes, resolving a pending quoted pattern
    fn finish(
        &self,
        node: QueryNode,
        pending: Option<Pending>,
        attrs: Attributes,
        start: usize,
    ) -> QueryResult<QueryNode> {
        if attrs.wildcard && self.dialect < WILDCARD_DIALECT {
            return Err(QueryError::syntax(start, "$type:wildcard requires DIALECT 2 or greater"));
        }
        let mut node = match pending {
            Some(Pending { raw, fields }) if attrs.wildcard => QueryNode::new(NodeKind::Term {
                pattern: TermPattern::Wildcard(WildcardPattern::parse(&raw.to_lowercase())),
                fields,
            }),
            Some(Pending { raw, fields }) => self.words(&raw, fields.as_deref(), true),
            None => node,
        };
        if attrs.wildcard && !matches!(node.kind, NodeKind::Term { pattern: TermPattern::Wildcard(_), .. }) {
            match &mut node.kind {
                NodeKind::Tag { values, .. } if values.iter().any(|v| v.quoted) => {
                    for value in values.iter_mut().filter(|v| v.quoted) {
                        value.kind = TagMatch::Wildcard;
                    }
                }
                _ => return Err(QueryError::syntax(start, "$type:wildcard needs a quoted pattern")),
            }
        }
        let mut attrs = attrs;
        attrs.wildcard = false;
        node.attrs.merge(attrs);
        Ok(node)
    }
}

fn parse_bound(token: &str, offset: usize) -> QueryResult<NumBound> {
    let (exclusive, text) = match token.strip_prefix('(') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let value = match text.to_ascii_lowercase().as_str() {
        "inf" | "+inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        other => other
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| QueryError::syntax(offset, format!("invalid numeric bound '{}'", token)))?,
    };
    Ok(NumBound { value, exclusive })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(q: &str) -> QueryResult<QueryNode> {
        let tok = Tokenizer::default();
        QueryParser::new(&tok, 2).parse(q)
    }

    fn fields(names: &[&str]) -> Option<Vec<String>> {
        Some(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_plain_words_intersect() {
        let node = parse("hello world").unwrap();
        match node.kind {
            NodeKind::Phrase { children, exact, fields } => {
                assert_eq!(children, vec![QueryNode::term("hello", None), QueryNode::term("world", None)]);
                assert!(!exact);
                assert!(fields.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_stopwords_dropped() {
        let node = parse("does not matter").unwrap();
        match node.kind {
            NodeKind::Phrase { children, .. } => assert_eq!(children.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse("the").unwrap().is_null());
    }

    #[test]
    fn test_patterns() {
        let kind = |q: &str| parse(q).unwrap().kind;
        assert_eq!(
            kind("worl*"),
            NodeKind::Term {
                pattern: TermPattern::Prefix("worl".into()),
                fields: None
            }
        );
        assert_eq!(
            kind("*orld"),
            NodeKind::Term {
                pattern: TermPattern::Suffix("orld".into()),
                fields: None
            }
        );
        assert_eq!(
            kind("*ORL*"),
            NodeKind::Term {
                pattern: TermPattern::Contains("orl".into()),
                fields: None
            }
        );
        assert_eq!(kind("*"), NodeKind::Universe);
    }

    #[test]
    fn test_quoted_wildcard() {
        let node = parse("'*foo*'=>{$type:wildcard}").unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Term {
                pattern: TermPattern::Wildcard(WildcardPattern::parse("*foo*")),
                fields: None
            }
        );
        assert!(!node.attrs.wildcard);
    }

    #[test]
    fn test_wildcard_needs_dialect_two() {
        let tok = Tokenizer::default();
        let err = QueryParser::new(&tok, 1).parse("'*foo*'=>{$type:wildcard}").unwrap_err();
        assert!(matches!(err, QueryError::Syntax { .. }));
    }

    #[test]
    fn test_quoted_phrase_is_exact() {
        let node = parse("@title:\"hello big world\"").unwrap();
        match node.kind {
            NodeKind::Phrase { children, exact, fields: f } => {
                assert_eq!(children.len(), 3);
                assert!(exact);
                assert_eq!(f, fields(&["title"]));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_field_group_with_attributes() {
        let node = parse("@category|author:(Redis Ltd.)=>{$slop:200; $inorder:false}").unwrap();
        assert_eq!(node.attrs.slop, Some(200));
        assert_eq!(node.attrs.inorder, Some(false));
        match node.kind {
            NodeKind::Phrase { fields: f, children, .. } => {
                assert_eq!(f, fields(&["category", "author"]));
                assert_eq!(children[1], QueryNode::term("ltd", fields(&["category", "author"])));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tags() {
        let node = parse("@gag:{fire* | Water Park}").unwrap();
        match node.kind {
            NodeKind::Tag { field, values } => {
                assert_eq!(field, "gag");
                assert_eq!(values[0].kind, TagMatch::Prefix);
                assert_eq!(values[0].raw, "fire");
                assert_eq!(values[1].kind, TagMatch::Exact);
                assert_eq!(values[1].raw, "Water Park");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tag_wildcard() {
        let node = parse("@t:{'*22*'}=>{$type:wildcard}").unwrap();
        match node.kind {
            NodeKind::Tag { values, .. } => {
                assert_eq!(values[0].kind, TagMatch::Wildcard);
                assert_eq!(values[0].raw, "*22*");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_numeric_range() {
        let node = parse("@price:[(10 +inf]").unwrap();
        assert_eq!(
            node.kind,
            NodeKind::Numeric {
                field: "price".into(),
                min: NumBound::exclusive(10.0),
                max: NumBound::inclusive(f64::INFINITY),
            }
        );
        assert!(parse("@price:[1]").is_err());
        assert!(parse("@price:[a 2]").is_err());
    }

    #[test]
    fn test_union_and_not() {
        let node = parse("foo | -bar").unwrap();
        match node.kind {
            NodeKind::Union(alts) => {
                assert_eq!(alts[0], QueryNode::term("foo", None));
                assert_eq!(alts[1].kind, NodeKind::Not(Box::new(QueryNode::term("bar", None))));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse("(foo").is_err());
        assert!(parse("foo)").is_err());
        assert!(parse("@:foo").is_err());
        assert!(parse("foo=>{$bogus:1}").is_err());
        assert!(parse("foo=>{$slop:-1}").is_err());
        assert!(parse("@a|b:{x}").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_punctuation_separates() {
        let node = parse("hello, world!").unwrap();
        assert!(matches!(node.kind, NodeKind::Phrase { ref children, .. } if children.len() == 2));
    }

    #[test]
    fn test_hyphen_inside_word_is_not_negation() {
        let node = parse("foo-bar").unwrap();
        match node.kind {
            NodeKind::Phrase { children, exact, .. } => {
                assert_eq!(children, vec![QueryNode::term("foo", None), QueryNode::term("bar", None)]);
                assert!(exact);
            }
            other => panic!("unexpected {:?}", other),
        }

        let node = parse("foo -bar").unwrap();
        match node.kind {
            NodeKind::Phrase { children, .. } => {
                assert_eq!(children[0], QueryNode::term("foo", None));
                assert_eq!(children[1].kind, NodeKind::Not(Box::new(QueryNode::term("bar", None))));
            }
            other => panic!("unexpected {:?}", other),
        }

        // Stopwords inside the word still vanish
        let node = parse("@title:state-of-the-art").unwrap();
        match node.kind {
            NodeKind::Phrase { children, fields: f, .. } => {
                assert_eq!(children.len(), 2);
                assert_eq!(f, fields(&["title"]));
            }
            other => panic!("unexpected {:?}", other),
        }

        // A hyphen followed by a space starts the next term
        match parse("foo- bar").unwrap().kind {
            NodeKind::Phrase { children, exact, .. } => {
                assert!(!exact);
                assert!(matches!(children[1].kind, NodeKind::Not(_)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

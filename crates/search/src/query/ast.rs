//! Query expression tree

use sieve_storage::{NumBound, TermPattern};

/// Per-node `=>{...}` attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    /// `$slop`
    pub slop: Option<u32>,
    /// `$inorder`
    pub inorder: Option<bool>,
    /// `$weight`
    pub weight: Option<f64>,
    /// `$type:wildcard`
    pub wildcard: bool,
}

impl Attributes {
    /// True if slop or inorder was set explicitly
    pub fn sets_proximity(&self) -> bool {
        self.slop.is_some() || self.inorder.is_some()
    }

    /// Overlay `other` on top of these attributes
    pub fn merge(&mut self, other: Attributes) {
        if other.slop.is_some() {
            self.slop = other.slop;
        }
        if other.inorder.is_some() {
            self.inorder = other.inorder;
        }
        if other.weight.is_some() {
            self.weight = other.weight;
        }
        self.wildcard |= other.wildcard;
    }
}

/// How a tag value is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    /// Whole value
    Exact,
    /// `value*`
    Prefix,
    /// `*value`
    Suffix,
    /// `*value*`
    Contains,
    /// Quoted glob with `$type:wildcard`
    Wildcard,
}

/// One alternative inside `{...}`, before tag normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagValue {
    /// Literal text without `*` markers
    pub raw: String,
    /// Match mode
    pub kind: TagMatch,
    /// Written as `'...'`
    pub quoted: bool,
}

impl TagValue {
    /// Build the term pattern after the value was normalized
    pub fn pattern(&self, normalized: String) -> TermPattern {
        match self.kind {
            TagMatch::Exact => TermPattern::Exact(normalized),
            TagMatch::Prefix => TermPattern::Prefix(normalized),
            TagMatch::Suffix => TermPattern::Suffix(normalized),
            TagMatch::Contains => TermPattern::Contains(normalized),
            TagMatch::Wildcard => {
                TermPattern::Wildcard(sieve_storage::WildcardPattern::parse(&normalized))
            }
        }
    }
}

/// Node variants
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `*`
    Universe,
    /// Matches nothing (stopwords only)
    Null,
    /// A text term or term pattern
    Term {
        /// What to expand
        pattern: TermPattern,
        /// `@f|g` scope; None searches every TEXT field
        fields: Option<Vec<String>>,
    },
    /// Intersection; positional when slop or inorder applies
    Phrase {
        /// Operands
        children: Vec<QueryNode>,
        /// Written as `"..."`
        exact: bool,
        /// `@f|g` scope; None searches every TEXT field
        fields: Option<Vec<String>>,
    },
    /// `a | b`
    Union(Vec<QueryNode>),
    /// `-a`
    Not(Box<QueryNode>),
    /// `@field:{a | b}`
    Tag {
        /// Tag field name
        field: String,
        /// Alternatives
        values: Vec<TagValue>,
    },
    /// `@field:[min max]`
    Numeric {
        /// Numeric field name
        field: String,
        /// Lower bound
        min: NumBound,
        /// Upper bound
        max: NumBound,
    },
}

/// A node with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct QueryNode {
    /// Variant
    pub kind: NodeKind,
    /// `=>{...}` attributes
    pub attrs: Attributes,
}

impl QueryNode {
    /// Node without attributes
    pub fn new(kind: NodeKind) -> Self {
        QueryNode {
            kind,
            attrs: Attributes::default(),
        }
    }

    /// Exact text term
    pub fn term(term: impl Into<String>, fields: Option<Vec<String>>) -> Self {
        Self::new(NodeKind::Term {
            pattern: TermPattern::Exact(term.into()),
            fields,
        })
    }

    /// True for [`NodeKind::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    /// Intersection of `children`, collapsing trivial cases
    pub fn intersect(children: Vec<QueryNode>, fields: Option<Vec<String>>) -> Self {
        let mut children: Vec<QueryNode> = children.into_iter().filter(|c| !c.is_null()).collect();
        match children.len() {
            0 => Self::new(NodeKind::Null),
            1 => children.remove(0),
            _ => Self::new(NodeKind::Phrase {
                children,
                exact: false,
                fields,
            }),
        }
    }

    /// Union of `children`, collapsing trivial cases
    pub fn union(children: Vec<QueryNode>) -> Self {
        let mut children: Vec<QueryNode> = children.into_iter().filter(|c| !c.is_null()).collect();
        match children.len() {
            0 => Self::new(NodeKind::Null),
            1 => children.remove(0),
            _ => Self::new(NodeKind::Union(children)),
        }
    }
}

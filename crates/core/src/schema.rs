//! Index definitions and compiled schemas
//!
//! An [`IndexDefinition`] is what a caller hands to index creation. It is
//! compiled once into an [`IndexSchema`], which resolves every field's source
//! (hash attribute or parsed [`JsonPath`]) and decides whether the field has a
//! defined element ordering.
//!
//! ## Field capabilities
//!
//! | Type | exact | prefix-expand | phrase | sort key |
//! |------|-------|---------------|--------|----------|
//! | TEXT | yes | yes | yes | first value, lowercased |
//! | TAG | yes | yes | no | first value, lowercased |
//! | NUMERIC | range | no | no | first number |

use crate::error::SchemaError;
use crate::json::JsonPath;
use crate::types::FieldIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default TAG separator for hash documents
pub const DEFAULT_TAG_SEPARATOR: char = ',';

// ============================================================================
// Storage model and field types
// ============================================================================

/// Backing record type of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageModel {
    /// Flat field/value records
    Hash,
    /// JSON documents addressed by path
    Json,
}

impl fmt::Display for StorageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageModel::Hash => write!(f, "HASH"),
            StorageModel::Json => write!(f, "JSON"),
        }
    }
}

/// Field type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Tokenized full text
    Text,
    /// Exact-match tag set
    Tag,
    /// Numeric range field
    Numeric,
}

/// What a field type supports at query time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Exact term or value match
    pub exact_match: bool,
    /// Prefix/suffix/contains expansion through the term store
    pub prefix_expand: bool,
    /// Positional phrase and proximity matching
    pub phrase_match: bool,
    /// Can serve as a SORTBY key
    pub sort_key: bool,
}

impl FieldType {
    /// Capability set of this type
    pub fn capabilities(self) -> Capabilities {
        match self {
            FieldType::Text => Capabilities {
                exact_match: true,
                prefix_expand: true,
                phrase_match: true,
                sort_key: true,
            },
            FieldType::Tag => Capabilities {
                exact_match: true,
                prefix_expand: true,
                phrase_match: false,
                sort_key: true,
            },
            FieldType::Numeric => Capabilities {
                exact_match: false,
                prefix_expand: false,
                phrase_match: false,
                sort_key: true,
            },
        }
    }

    /// JSON type name expected by this field, for failure messages
    pub fn expected_json_type(self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Tag => "string",
            FieldType::Numeric => "number",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "TEXT"),
            FieldType::Tag => write!(f, "TAG"),
            FieldType::Numeric => write!(f, "NUMERIC"),
        }
    }
}

// ============================================================================
// FieldSpec
// ============================================================================

/// One field declaration as written by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Hash attribute name or JSON path
    pub path: String,
    /// `AS` alias; the field is addressed by this name when present
    pub alias: Option<String>,
    /// Field type
    pub field_type: FieldType,
    /// Keep a precomputed sort key
    pub sortable: bool,
    /// Disable stemming (accepted; no stemming is performed)
    pub nostem: bool,
    /// Maintain a suffix trie for `*suffix` / `*contains*` lookups
    pub with_suffix_trie: bool,
    /// Store but do not index
    pub noindex: bool,
    /// Relevance weight of TEXT matches
    pub weight: f64,
    /// TAG separator for hash documents
    pub separator: char,
    /// Keep TAG values as written instead of lowercasing
    pub case_sensitive: bool,
}

impl FieldSpec {
    /// Declare a field of the given type
    pub fn new(path: impl Into<String>, field_type: FieldType) -> Self {
        FieldSpec {
            path: path.into(),
            alias: None,
            field_type,
            sortable: false,
            nostem: false,
            with_suffix_trie: false,
            noindex: false,
            weight: 1.0,
            separator: DEFAULT_TAG_SEPARATOR,
            case_sensitive: false,
        }
    }

    /// Declare a TEXT field
    pub fn text(path: impl Into<String>) -> Self {
        Self::new(path, FieldType::Text)
    }

    /// Declare a TAG field
    pub fn tag(path: impl Into<String>) -> Self {
        Self::new(path, FieldType::Tag)
    }

    /// Declare a NUMERIC field
    pub fn numeric(path: impl Into<String>) -> Self {
        Self::new(path, FieldType::Numeric)
    }

    /// Set the `AS` alias (builder)
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Mark SORTABLE (builder)
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark WITHSUFFIXTRIE (builder)
    pub fn with_suffix_trie(mut self) -> Self {
        self.with_suffix_trie = true;
        self
    }

    /// Mark NOSTEM (builder)
    pub fn nostem(mut self) -> Self {
        self.nostem = true;
        self
    }

    /// Mark NOINDEX (builder)
    pub fn noindex(mut self) -> Self {
        self.noindex = true;
        self
    }

    /// Set WEIGHT (builder)
    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set SEPARATOR (builder)
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Mark CASESENSITIVE (builder)
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Name the field is addressed by in queries
    pub fn name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }
}

// ============================================================================
// IndexDefinition
// ============================================================================

/// Everything index creation needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name
    pub name: String,
    /// Backing record type
    pub storage: StorageModel,
    /// Key prefixes the index follows (empty = every key)
    pub prefixes: Vec<String>,
    /// Idle TTL in seconds for TEMPORARY indexes
    pub temporary_secs: Option<u64>,
    /// Stopword list; `None` uses the default English list
    pub stopwords: Option<Vec<String>>,
    /// Document score used by DOCSCORE and as a TF-IDF multiplier
    pub default_score: f64,
    /// Field declarations in schema order
    pub fields: Vec<FieldSpec>,
}

impl IndexDefinition {
    /// Start a definition with no fields
    pub fn new(name: impl Into<String>, storage: StorageModel) -> Self {
        IndexDefinition {
            name: name.into(),
            storage,
            prefixes: Vec::new(),
            temporary_secs: None,
            stopwords: None,
            default_score: 1.0,
            fields: Vec::new(),
        }
    }

    /// Add a key prefix (builder)
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Make the index TEMPORARY (builder)
    pub fn temporary(mut self, secs: u64) -> Self {
        self.temporary_secs = Some(secs);
        self
    }

    /// Replace the stopword list (builder)
    pub fn stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(words.into_iter().map(Into::into).collect());
        self
    }

    /// Add a field (builder)
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// True if `key` falls under one of the prefixes
    pub fn matches_key(&self, key: &str) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| key.starts_with(p.as_str()))
    }
}

// ============================================================================
// Compiled schema
// ============================================================================

/// Where a field's values come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// Hash attribute
    Hash(String),
    /// JSON path
    Json(JsonPath),
}

/// A field after compilation
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    /// Position in the schema
    pub index: FieldIndex,
    /// Declaration as written
    pub spec: FieldSpec,
    /// Resolved source
    pub source: FieldSource,
    /// False when the source may select values in an unstable order
    pub ordering_defined: bool,
}

impl SchemaField {
    /// Query-facing name
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// Field type
    pub fn field_type(&self) -> FieldType {
        self.spec.field_type
    }
}

/// Compiled, immutable schema of one index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSchema {
    storage: StorageModel,
    fields: Vec<SchemaField>,
}

impl IndexSchema {
    /// Compile a definition, parsing JSON paths and checking names
    pub fn compile(def: &IndexDefinition) -> Result<Self, SchemaError> {
        if def.fields.is_empty() {
            return Err(SchemaError::NoFields);
        }
        if def.fields.len() > FieldIndex::MAX as usize {
            return Err(SchemaError::InvalidOption {
                field: def.name.clone(),
                option: "SCHEMA",
            });
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(def.fields.len());
        for (i, spec) in def.fields.iter().enumerate() {
            if !seen.insert(spec.name().to_string()) {
                return Err(SchemaError::DuplicateField(spec.name().to_string()));
            }
            if spec.with_suffix_trie && spec.field_type == FieldType::Numeric {
                return Err(SchemaError::InvalidOption {
                    field: spec.name().to_string(),
                    option: "WITHSUFFIXTRIE",
                });
            }
            if !(spec.weight.is_finite() && spec.weight >= 0.0) {
                return Err(SchemaError::InvalidOption {
                    field: spec.name().to_string(),
                    option: "WEIGHT",
                });
            }

            let (source, ordering_defined) = match def.storage {
                StorageModel::Hash => (FieldSource::Hash(spec.path.clone()), true),
                StorageModel::Json => {
                    let path: JsonPath = spec.path.parse().map_err(|e: crate::json::PathParseError| {
                        SchemaError::InvalidPath {
                            path: spec.path.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    let definite = path.is_definite();
                    (FieldSource::Json(path), definite)
                }
            };

            fields.push(SchemaField {
                index: i as FieldIndex,
                spec: spec.clone(),
                source,
                ordering_defined,
            });
        }

        Ok(IndexSchema {
            storage: def.storage,
            fields,
        })
    }

    /// Backing record type
    pub fn storage(&self) -> StorageModel {
        self.storage
    }

    /// All fields in schema order
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Look up a field by its query-facing name
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Look up a field by name or by its source path
    pub fn field_by_name_or_path(&self, name: &str) -> Option<&SchemaField> {
        self.field(name)
            .or_else(|| self.fields.iter().find(|f| f.spec.path == name))
    }

    /// Field at a schema position
    pub fn get(&self, index: FieldIndex) -> Option<&SchemaField> {
        self.fields.get(index as usize)
    }

    /// Fields of the given type
    pub fn fields_of(&self, field_type: FieldType) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter().filter(move |f| f.field_type() == field_type)
    }
}

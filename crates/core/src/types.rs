//! Identifier types shared by the storage, search, and engine layers

/// Internal document identifier
///
/// Doc ids are assigned monotonically per index. Overwriting a key allocates
/// a fresh id, so an id never refers to two different document versions.
pub type DocId = u64;

/// Position of a field within its index schema
pub type FieldIndex = u16;

/// Token position within one field of one document (1-based)
pub type Position = u32;

/// Sentinel meaning "no document has been published yet"
pub const NO_DOC: DocId = 0;

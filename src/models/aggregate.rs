//! Aggregation groups built by the indexer.

use super::JournalEntry;

/// Member count at which a group earns its own page.
pub const POPULARITY_THRESHOLD: usize = 2;

/// Sessions sharing a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicGroup {
    /// Topic name.
    pub name: String,
    /// Member entries, date-descending.
    pub entries: Vec<JournalEntry>,
    /// Member count reached [`POPULARITY_THRESHOLD`].
    pub popular: bool,
}

/// Sessions that touched the same file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFileGroup {
    /// File path as recorded in frontmatter.
    pub path: String,
    /// Member entries, date-descending.
    pub entries: Vec<JournalEntry>,
    /// Member count reached [`POPULARITY_THRESHOLD`].
    pub popular: bool,
}

/// Sessions of the same type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeGroup {
    /// Type name.
    pub name: String,
    /// Member entries, date-descending.
    pub entries: Vec<JournalEntry>,
    /// Member count reached [`POPULARITY_THRESHOLD`].
    pub popular: bool,
}

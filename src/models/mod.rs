//! Data models for the journal pipeline.
//!
//! Everything here is derived data: entries and aggregation groups are
//! rebuilt from the journal directory on every run.

mod aggregate;
mod entry;
mod frontmatter;

pub use aggregate::{KeyFileGroup, POPULARITY_THRESHOLD, TopicGroup, TypeGroup};
pub use entry::{
    DATE_PREFIX_LEN, EXT_MARKDOWN, JournalEntry, MONTH_PREFIX_LEN, TIME_PREFIX_LEN,
    continues_multipart,
};
pub use frontmatter::{Frontmatter, VaultFrontmatter};

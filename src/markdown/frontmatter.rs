//! YAML frontmatter parsing.
//!
//! Journal files may open with a frontmatter block:
//! ```text
//! ---
//! title: Fix cache invalidation
//! topics: [caching, redis]
//! ---
//! # Fix cache invalidation
//! ```
//!
//! The opening delimiter must be the very first line and the block ends at the
//! first line that is exactly `---`. Anything else means "no frontmatter", and
//! callers fall back to scanning the body.

use serde::Serialize;

use crate::models::Frontmatter;
use crate::{Error, Result};

/// Location of a frontmatter block inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    /// YAML between the delimiters.
    pub raw: &'a str,
    /// Everything after the closing delimiter line.
    pub body: &'a str,
    /// Byte offset where `body` starts.
    pub end: usize,
}

/// Parser for the YAML frontmatter of journal files.
pub struct FrontmatterParser;

impl FrontmatterParser {
    /// The frontmatter delimiter.
    const OPEN: &'static str = "---\n";
    const CLOSE: &'static str = "\n---\n";

    /// Locates the frontmatter block without parsing it.
    #[must_use]
    pub fn split(content: &str) -> Option<FrontmatterBlock<'_>> {
        let after_open = content.strip_prefix(Self::OPEN)?;
        let close = after_open.find(Self::CLOSE)?;
        let end = Self::OPEN.len() + close + Self::CLOSE.len();

        Some(FrontmatterBlock {
            raw: &after_open[..close],
            body: &content[end..],
            end,
        })
    }

    /// Parses the frontmatter block into typed fields.
    ///
    /// Returns `None` when there is no block or the YAML does not parse.
    #[must_use]
    pub fn parse(content: &str) -> Option<Frontmatter> {
        let block = Self::split(content)?;
        match serde_yaml_ng::from_str::<Frontmatter>(block.raw) {
            Ok(fm) => Some(fm),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed frontmatter");
                None
            },
        }
    }

    /// Serializes metadata as a frontmatter block followed by `body`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize<T: Serialize>(metadata: &T, body: &str) -> Result<String> {
        let yaml = serde_yaml_ng::to_string(metadata)
            .map_err(|e| Error::operation("serialize_frontmatter", e))?;

        Ok(format!("{}{yaml}{}{body}", Self::OPEN, Self::OPEN))
    }

    /// Returns the document without its frontmatter block.
    #[must_use]
    pub fn extract_body(content: &str) -> &str {
        Self::split(content).map_or(content, |block| block.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let content = "---\ntitle: A\n---\nbody\n";
        let block = FrontmatterParser::split(content).unwrap();
        assert_eq!(block.raw, "title: A");
        assert_eq!(block.body, "body\n");
        assert_eq!(&content[block.end..], "body\n");
    }

    #[test]
    fn test_split_requires_first_line() {
        assert!(FrontmatterParser::split("\n---\ntitle: A\n---\n").is_none());
    }

    #[test]
    fn test_split_missing_close() {
        assert!(FrontmatterParser::split("---\ntitle: A\nbody").is_none());
    }

    #[test]
    fn test_parse_typed_fields() {
        let content = "---\ntitle: \"Fix cache\"\ndate: 2026-01-21\ntime: \"14:30:00\"\n\
            type: bugfix\ntopics:\n  - caching\n  - redis\nkey_files: [src/cache.rs]\n\
            session_id: 12345678\n---\nbody";
        let fm = FrontmatterParser::parse(content).unwrap();

        assert_eq!(fm.title.as_deref(), Some("Fix cache"));
        assert_eq!(fm.date.as_deref(), Some("2026-01-21"));
        assert_eq!(fm.time.as_deref(), Some("14:30:00"));
        assert_eq!(fm.entry_type.as_deref(), Some("bugfix"));
        assert_eq!(fm.topics, vec!["caching", "redis"]);
        assert_eq!(fm.key_files, vec!["src/cache.rs"]);
        assert_eq!(fm.session_id.as_deref(), Some("12345678"));
    }

    #[test]
    fn test_parse_null_lists() {
        let fm = FrontmatterParser::parse("---\ntitle: A\ntopics:\n---\n").unwrap();
        assert!(fm.topics.is_empty());
    }

    #[test]
    fn test_parse_malformed_yaml_is_none() {
        assert!(FrontmatterParser::parse("---\ntitle: [unclosed\n---\nbody").is_none());
    }

    #[test]
    fn test_serialize() {
        let fm = Frontmatter {
            title: Some("A".to_string()),
            ..Frontmatter::default()
        };
        let out = FrontmatterParser::serialize(&fm, "body").unwrap();
        assert_eq!(out, "---\ntitle: A\n---\nbody");
    }

    #[test]
    fn test_extract_body() {
        assert_eq!(FrontmatterParser::extract_body("---\na: b\n---\nThe body"), "The body");
        assert_eq!(FrontmatterParser::extract_body("No frontmatter"), "No frontmatter");
    }
}

//! # ctx-journal
//!
//! Journal content pipeline for exported AI coding sessions.
//!
//! Session transcripts land in `.context/journal/` as one Markdown file per
//! session. This crate scans them, normalizes the transcript text, indexes the
//! sessions by topic, touched file and session type, and republishes them as:
//!
//! - a zensical-compatible static site ([`services::SiteGenerator`])
//! - an Obsidian vault with wikilinks and hub pages ([`services::VaultGenerator`])
//!
//! Per-file processing state (exported, enriched, normalized, fences verified)
//! lives in a `.state.json` sidecar managed by [`storage::JournalState`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use ctx_journal::services::{SiteGenerator, scan_entries};
//! use ctx_journal::storage::{FilesystemStore, JournalState};
//!
//! let store = FilesystemStore::new();
//! let state = JournalState::load(&store, journal_dir)?;
//! let report = SiteGenerator::new(&store, &state)
//!     .generate(journal_dir, site_dir)?;
//! println!("{} entries", report.entries);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error as ThisError;

pub mod config;
pub mod markdown;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod rendering;
pub mod services;
pub mod storage;

pub use config::JournalConfig;
pub use models::{Frontmatter, JournalEntry};
pub use normalize::Pipeline;
pub use services::{GenerationReport, SiteGenerator, VaultGenerator};
pub use storage::{ContentStore, FilesystemStore, JournalState, Stage};

/// Error type for journal pipeline operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown stage names, malformed config values |
/// | `OperationFailed` | Filesystem I/O, JSON/TOML (de)serialization |
/// | `JournalNotFound` | The journal directory does not exist |
/// | `NoEntries` | The journal directory holds no `.md` files |
/// | `ToolNotFound` | An external binary (zensical) is missing from `PATH` |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The journal directory is missing.
    #[error(
        "no journal directory found at {}\nRun 'ctx recall export --all' first",
        .0.display()
    )]
    JournalNotFound(PathBuf),

    /// The journal directory contains no entries.
    #[error(
        "no journal entries found in {}\nRun 'ctx recall export --all' first",
        .0.display()
    )]
    NoEntries(PathBuf),

    /// A required external tool is not installed.
    #[error("{name} not found. Install with: {hint}")]
    ToolNotFound {
        /// Binary name.
        name: String,
        /// Install hint shown to the user.
        hint: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for journal operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::operation("write_page", "disk full");
        assert_eq!(err.to_string(), "operation 'write_page' failed: disk full");
    }

    #[test]
    fn test_journal_not_found_mentions_export() {
        let err = Error::JournalNotFound(PathBuf::from(".context/journal"));
        let msg = err.to_string();
        assert!(msg.starts_with("no journal directory found at .context/journal"));
        assert!(msg.contains("ctx recall export --all"));
    }

    #[test]
    fn test_no_entries_display() {
        let err = Error::NoEntries(PathBuf::from("/tmp/j"));
        assert!(err.to_string().starts_with("no journal entries found in /tmp/j"));
    }

    #[test]
    fn test_tool_not_found_display() {
        let err = Error::ToolNotFound {
            name: "zensical".to_string(),
            hint: "pipx install zensical".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "zensical not found. Install with: pipx install zensical"
        );
    }
}

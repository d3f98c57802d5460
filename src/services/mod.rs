//! Pipeline services.
//!
//! The scanner and indexer are shared by both generators; the generators
//! orchestrate normalization, rendering and the content store.

pub mod indexer;
pub mod scanner;
mod site;
mod vault;

use std::fmt;
use std::path::{Path, PathBuf};

pub use indexer::{
    MAX_RELATED, build_key_file_index, build_topic_index, build_topic_lookup, build_type_index,
    collect_related, filter_regular, filter_with_key_files, filter_with_topics, filter_with_type,
};
pub use scanner::{parse_entry, sanitize_title, scan_entries, sort_entries};
pub use site::{SiteGenerator, ZENSICAL_BIN, ZENSICAL_HINT, run_zensical};
pub use vault::VaultGenerator;

use crate::storage::ContentStore;
use crate::{Error, Result};

/// A per-file failure that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWarning {
    /// File that could not be read or written.
    pub path: PathBuf,
    /// Human-readable cause.
    pub cause: String,
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.cause)
    }
}

/// Outcome of a site or vault generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Output directory.
    pub output: PathBuf,
    /// Number of journal entries processed.
    pub entries: usize,
    /// Per-file failures, in the order they happened.
    pub warnings: Vec<FileWarning>,
}

impl GenerationReport {
    pub(crate) fn new(output: &Path) -> Self {
        Self {
            output: output.to_path_buf(),
            ..Self::default()
        }
    }

    /// Records a per-file failure and logs it.
    pub(crate) fn warn(&mut self, path: &Path, err: &Error) {
        tracing::warn!(file = %path.display(), error = %err, "skipping file");
        self.warnings.push(FileWarning {
            path: path.to_path_buf(),
            cause: err.to_string(),
        });
    }

    /// Writes a page, recording a warning instead of failing.
    pub(crate) fn write_page<S: ContentStore + ?Sized>(&mut self, store: &S, path: &Path, content: &str) {
        if let Err(e) = store.write(path, content) {
            self.warn(path, &e);
        }
    }
}

/// Fails unless `journal_dir` exists and holds at least one entry.
pub(crate) fn require_entries<S: ContentStore + ?Sized>(
    store: &S,
    journal_dir: &Path,
) -> Result<Vec<crate::models::JournalEntry>> {
    if !store.is_dir(journal_dir) {
        return Err(Error::JournalNotFound(journal_dir.to_path_buf()));
    }

    let entries = scan_entries(store, journal_dir)?;
    if entries.is_empty() {
        return Err(Error::NoEntries(journal_dir.to_path_buf()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FilesystemStore;
    use tempfile::TempDir;

    #[test]
    fn test_require_entries_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("journal");
        let err = require_entries(&FilesystemStore::new(), &missing).unwrap_err();
        assert!(matches!(err, Error::JournalNotFound(p) if p == missing));
    }

    #[test]
    fn test_require_entries_empty_dir() {
        let dir = TempDir::new().unwrap();
        let err = require_entries(&FilesystemStore::new(), dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoEntries(_)));
    }

    #[test]
    fn test_file_warning_display() {
        let mut report = GenerationReport::new(Path::new("/out"));
        report.warn(Path::new("/j/a.md"), &Error::operation("read", "denied"));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(
            report.warnings[0].to_string(),
            "/j/a.md: operation 'read' failed: denied"
        );
    }
}

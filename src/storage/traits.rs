//! Content store trait.

use std::path::Path;

use crate::Result;

/// Directory-scan primitive used by the scanner and the generators.
///
/// The filesystem implementation is [`super::FilesystemStore`]; tests can
/// supply their own to inject per-file failures.
pub trait ContentStore {
    /// Lists names of regular files in `dir` ending with `extension`, sorted.
    fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<String>>;

    /// Reads a file as text. Invalid UTF-8 is replaced with U+FFFD.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Writes text, replacing any existing file.
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Creates a directory and its parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Returns true if a directory exists at `path`.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns true if anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Renames a file, replacing the target.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Writes text after creating the parent directory.
    fn write_with_parents(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        self.write(path, content)
    }
}

//! Filesystem-backed content store.

use std::fs;
use std::path::Path;

use crate::storage::traits::ContentStore;
use crate::{Error, Result};

/// [`ContentStore`] over `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemStore;

impl FilesystemStore {
    /// Creates a filesystem store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ContentStore for FilesystemStore {
    fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::OperationFailed {
            operation: "read_journal_dir".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::operation("read_dir_entry", e))?;
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string()
                && name.ends_with(extension)
            {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| Error::OperationFailed {
            operation: "read_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), "replacing invalid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            },
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|e| Error::OperationFailed {
            operation: "write_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::OperationFailed {
            operation: "create_dir".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| Error::OperationFailed {
            operation: "rename_file".to_string(),
            cause: format!("{} -> {}: {e}", from.display(), to.display()),
        })
    }
}

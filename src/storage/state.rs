//! Journal processing state sidecar (`.state.json`).
//!
//! Tracks which pipeline stages have run for each journal file. A stage is
//! complete when its date string is non-empty; nothing else is consulted, so
//! content that happens to look like a marker never counts.
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "2026-01-21-fix-cache-abc12345.md": {
//!       "exported": "2026-01-21",
//!       "fences_verified": "2026-01-22"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::EXT_MARKDOWN;
use crate::storage::traits::ContentStore;
use crate::{Error, Result};

/// Sidecar file name inside the journal directory.
pub const STATE_FILE: &str = ".state.json";

/// Schema version written by this crate.
pub const CURRENT_VERSION: u32 = 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A pipeline stage recorded in the sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Exported from the session log.
    Exported,
    /// Metadata enriched.
    Enriched,
    /// Transcript normalized.
    Normalized,
    /// Code fences checked by hand or by a tool.
    FencesVerified,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Self; 4] = [
        Self::Exported,
        Self::Enriched,
        Self::Normalized,
        Self::FencesVerified,
    ];

    /// The stage name used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exported => "exported",
            Self::Enriched => "enriched",
            Self::Normalized => "normalized",
            Self::FencesVerified => "fences_verified",
        }
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| {
                Error::InvalidInput(format!("unknown stage {s:?}; valid: {}", Self::valid_names()))
            })
    }
}

/// Completion dates for one journal file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Date the file was exported.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exported: String,
    /// Date the metadata was enriched.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub enriched: String,
    /// Date the transcript was normalized.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub normalized: String,
    /// Date the fences were verified.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fences_verified: String,
}

impl FileState {
    /// Date recorded for a stage, empty when not completed.
    #[must_use]
    pub fn get(&self, stage: Stage) -> &str {
        match stage {
            Stage::Exported => &self.exported,
            Stage::Enriched => &self.enriched,
            Stage::Normalized => &self.normalized,
            Stage::FencesVerified => &self.fences_verified,
        }
    }

    fn set(&mut self, stage: Stage, date: String) {
        let slot = match stage {
            Stage::Exported => &mut self.exported,
            Stage::Enriched => &mut self.enriched,
            Stage::Normalized => &mut self.normalized,
            Stage::FencesVerified => &mut self.fences_verified,
        };
        *slot = date;
    }
}

/// The whole sidecar document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalState {
    /// Schema version.
    #[serde(default = "current_version")]
    pub version: u32,
    /// Per-file state keyed by filename.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entries: BTreeMap<String, FileState>,
}

const fn current_version() -> u32 {
    CURRENT_VERSION
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, FileState>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for JournalState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl JournalState {
    /// Loads the sidecar from a journal directory.
    ///
    /// A missing file yields an empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(store: &dyn ContentStore, journal_dir: &Path) -> Result<Self> {
        let path = journal_dir.join(STATE_FILE);
        if !store.exists(&path) {
            tracing::debug!(path = %path.display(), "no state file, starting empty");
            return Ok(Self::default());
        }

        let data = store.read_to_string(&path)?;
        serde_json::from_str(&data).map_err(|e| Error::OperationFailed {
            operation: "parse_state".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    /// Writes the sidecar through a temporary file and a rename.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any store step fails.
    pub fn save(&self, store: &dyn ContentStore, journal_dir: &Path) -> Result<()> {
        let path = journal_dir.join(STATE_FILE);
        let tmp = journal_dir.join(format!("{STATE_FILE}.tmp"));

        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| Error::operation("serialize_state", e))?;
        json.push('\n');

        store.write(&tmp, &json)?;
        store.rename(&tmp, &path)?;

        tracing::debug!(path = %path.display(), entries = self.entries.len(), "saved state");
        Ok(())
    }

    /// Records today's date for a stage, creating the file record if needed.
    pub fn mark(&mut self, filename: &str, stage: Stage) {
        self.mark_on(filename, stage, &today());
    }

    /// Records an explicit date for a stage.
    pub fn mark_on(&mut self, filename: &str, stage: Stage, date: &str) {
        self.entries
            .entry(filename.to_string())
            .or_default()
            .set(stage, date.to_string());
    }

    /// Date recorded for a stage, empty when not completed or unknown.
    #[must_use]
    pub fn stage_date(&self, filename: &str, stage: Stage) -> &str {
        self.entries.get(filename).map_or("", |fs| fs.get(stage))
    }

    /// Returns true when the stage has a recorded date.
    #[must_use]
    pub fn is_done(&self, filename: &str, stage: Stage) -> bool {
        !self.stage_date(filename, stage).is_empty()
    }

    /// Returns true when the file was exported.
    #[must_use]
    pub fn is_exported(&self, filename: &str) -> bool {
        self.is_done(filename, Stage::Exported)
    }

    /// Returns true when the file was enriched.
    #[must_use]
    pub fn is_enriched(&self, filename: &str) -> bool {
        self.is_done(filename, Stage::Enriched)
    }

    /// Returns true when the file was normalized.
    #[must_use]
    pub fn is_normalized(&self, filename: &str) -> bool {
        self.is_done(filename, Stage::Normalized)
    }

    /// Returns true when the file's fences were verified.
    #[must_use]
    pub fn is_fences_verified(&self, filename: &str) -> bool {
        self.is_done(filename, Stage::FencesVerified)
    }

    /// Moves a file's record to a new name. Unknown names are ignored.
    pub fn rename(&mut self, old_name: &str, new_name: &str) {
        if let Some(fs) = self.entries.remove(old_name) {
            self.entries.insert(new_name.to_string(), fs);
        }
    }

    /// Counts `.md` files in the directory that have not been enriched.
    ///
    /// An unreadable directory counts as zero.
    #[must_use]
    pub fn count_unenriched(&self, store: &dyn ContentStore, journal_dir: &Path) -> usize {
        store
            .list_files(journal_dir, EXT_MARKDOWN)
            .map_or(0, |names| names.iter().filter(|n| !self.is_enriched(n)).count())
    }
}

fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FilesystemStore;
    use std::fs;
    use tempfile::TempDir;
    use test_case::test_case;

    const STORE: FilesystemStore = FilesystemStore::new();

    #[test]
    fn test_load_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = JournalState::load(&STORE, dir.path()).unwrap();
        assert_eq!(state.version, CURRENT_VERSION);
        assert!(state.entries.is_empty());
    }

    #[test]
    fn test_load_null_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), r#"{"version":1,"entries":null}"#).unwrap();
        let state = JournalState::load(&STORE, dir.path()).unwrap();
        assert!(state.entries.is_empty());

        fs::write(dir.path().join(STATE_FILE), r#"{"version":1}"#).unwrap();
        let state = JournalState::load(&STORE, dir.path()).unwrap();
        assert!(state.entries.is_empty());
    }

    #[test]
    fn test_load_corrupt_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(STATE_FILE), "not json").unwrap();
        assert!(JournalState::load(&STORE, dir.path()).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut state = JournalState::default();
        state.mark_on("a.md", Stage::Exported, "2026-01-21");
        state.mark_on("a.md", Stage::FencesVerified, "2026-01-22");
        state.save(&STORE, dir.path()).unwrap();

        assert!(!dir.path().join(".state.json.tmp").exists());

        let raw = fs::read_to_string(dir.path().join(STATE_FILE)).unwrap();
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\"fences_verified\": \"2026-01-22\""));
        assert!(!raw.contains("enriched"), "empty stages are omitted");

        let loaded = JournalState::load(&STORE, dir.path()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_mark_uses_today() {
        let mut state = JournalState::default();
        state.mark("a.md", Stage::Enriched);
        assert_eq!(state.stage_date("a.md", Stage::Enriched), today());
        assert!(state.is_enriched("a.md"));
        assert!(!state.is_normalized("a.md"));
    }

    #[test]
    fn test_unknown_file_is_not_done() {
        let state = JournalState::default();
        assert!(!state.is_exported("missing.md"));
        assert_eq!(state.stage_date("missing.md", Stage::Exported), "");
    }

    #[test]
    fn test_rename_moves_record() {
        let mut state = JournalState::default();
        state.mark_on("old.md", Stage::Normalized, "2026-01-21");
        state.rename("old.md", "new.md");

        assert!(!state.entries.contains_key("old.md"));
        assert!(state.is_normalized("new.md"));

        state.rename("absent.md", "other.md");
        assert!(!state.entries.contains_key("other.md"));
    }

    #[test]
    fn test_count_unenriched() {
        let dir = TempDir::new().unwrap();
        for name in ["a.md", "b.md", "c.md", "notes.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.md")).unwrap();

        let mut state = JournalState::default();
        state.mark_on("a.md", Stage::Enriched, "2026-01-21");

        assert_eq!(state.count_unenriched(&STORE, dir.path()), 2);
        assert_eq!(state.count_unenriched(&STORE, &dir.path().join("missing")), 0);
    }

    #[test_case("exported", Stage::Exported)]
    #[test_case("enriched", Stage::Enriched)]
    #[test_case("normalized", Stage::Normalized)]
    #[test_case("fences_verified", Stage::FencesVerified)]
    fn test_stage_from_str(name: &str, expected: Stage) {
        let stage: Stage = name.parse().unwrap();
        assert_eq!(stage, expected);
        assert_eq!(stage.to_string(), name);
    }

    #[test]
    fn test_stage_from_str_unknown() {
        let err = "bogus".parse::<Stage>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: unknown stage \"bogus\"; valid: exported, enriched, normalized, fences_verified"
        );
    }
}

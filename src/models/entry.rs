//! Journal entry model.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Length of the `YYYY-MM-DD` filename prefix.
pub const DATE_PREFIX_LEN: usize = 10;

/// Length of the `YYYY-MM` month prefix.
pub const MONTH_PREFIX_LEN: usize = 7;

/// Length of the `HH:MM` time prefix shown in listings.
pub const TIME_PREFIX_LEN: usize = 5;

/// Markdown file extension.
pub const EXT_MARKDOWN: &str = ".md";

/// Matches part 2+ of a multi-part session (`...-p2.md`).
static MULTIPART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-p\d+\.md$").unwrap_or_else(|_| unreachable!()));

/// One exported session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalEntry {
    /// File name, unique within the journal directory.
    pub filename: String,
    /// Display title.
    pub title: String,
    /// `YYYY-MM-DD`, taken from the filename prefix.
    pub date: String,
    /// `HH:MM:SS` from frontmatter or the `**Time**:` line.
    pub time: String,
    /// Project name.
    pub project: String,
    /// Session identifier.
    pub session_id: String,
    /// Full path to the source file.
    pub path: PathBuf,
    /// Size of the source file in bytes.
    pub size: u64,
    /// Suggestion-mode session, excluded from regular listings.
    pub suggestive: bool,
    /// Topics from frontmatter.
    pub topics: Vec<String>,
    /// Session type from frontmatter.
    pub entry_type: String,
    /// Outcome from frontmatter.
    pub outcome: String,
    /// Key files touched, from frontmatter.
    pub key_files: Vec<String>,
    /// One-line summary from frontmatter.
    pub summary: String,
}

impl JournalEntry {
    /// Creates an entry with only the filename-derived fields populated.
    #[must_use]
    pub fn from_filename(path: impl Into<PathBuf>, filename: &str) -> Self {
        let date = filename
            .get(..DATE_PREFIX_LEN)
            .map(str::to_string)
            .unwrap_or_default();

        Self {
            filename: filename.to_string(),
            date,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Filename without the `.md` extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(EXT_MARKDOWN)
            .unwrap_or(&self.filename)
    }

    /// `YYYY-MM` month key, if the date is long enough.
    #[must_use]
    pub fn month(&self) -> Option<&str> {
        self.date.get(..MONTH_PREFIX_LEN)
    }

    /// `HH:MM ` prefix for listings, or an empty string.
    #[must_use]
    pub fn time_prefix(&self) -> String {
        self.time
            .get(..TIME_PREFIX_LEN)
            .map(|t| format!("{t} "))
            .unwrap_or_default()
    }

    /// Sort key used for the date-descending display order.
    #[must_use]
    pub fn sort_key(&self) -> String {
        format!("{} {}", self.date, self.time)
    }

    /// Returns true for part 2+ of a split session.
    #[must_use]
    pub fn is_continuation(&self) -> bool {
        continues_multipart(&self.filename)
    }

    /// Returns true if the entry belongs in regular listings.
    #[must_use]
    pub fn is_regular(&self) -> bool {
        !self.suggestive && !self.is_continuation()
    }
}

/// Reports whether a filename is a continuation part (`-p2.md`, `-p3.md`, ...).
#[must_use]
pub fn continues_multipart(filename: &str) -> bool {
    MULTIPART_PATTERN.is_match(filename)
}

//! Journal entry scanner.
//!
//! Builds a [`JournalEntry`] for every Markdown file in the journal
//! directory. Frontmatter is preferred; the `# Title`, `**Time**:` and
//! `**Project**:` lines fill whatever it leaves empty.

use std::path::Path;

use crate::Result;
use crate::markdown::FrontmatterParser;
use crate::markdown::patterns::{encode_angles, strip_claude_tags};
use crate::models::{EXT_MARKDOWN, Frontmatter, JournalEntry};
use crate::storage::ContentStore;

/// Marker text of suggestion-mode sessions.
pub const SUGGESTION_MODE_LABEL: &str = "SUGGESTION MODE:";

const LABEL_TIME: &str = "**Time**:";
const LABEL_PROJECT: &str = "**Project**:";
const H1_PREFIX: &str = "# ";

/// Scans a journal directory, newest entries first.
///
/// Files that cannot be read still produce an entry named after the file.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn scan_entries<S: ContentStore + ?Sized>(store: &S, dir: &Path) -> Result<Vec<JournalEntry>> {
    let names = store.list_files(dir, EXT_MARKDOWN)?;

    let mut entries: Vec<JournalEntry> = names
        .iter()
        .map(|name| parse_entry(store, &dir.join(name), name))
        .collect();

    sort_entries(&mut entries);
    tracing::debug!(dir = %dir.display(), count = entries.len(), "scanned journal");
    Ok(entries)
}

/// Sorts by `date time` descending, compared as plain strings.
pub fn sort_entries(entries: &mut [JournalEntry]) {
    entries.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
}

/// Parses one journal file.
pub fn parse_entry<S: ContentStore + ?Sized>(store: &S, path: &Path, filename: &str) -> JournalEntry {
    let mut entry = JournalEntry::from_filename(path, filename);

    let content = match store.read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(file = filename, error = %e, "unreadable journal entry");
            entry.title = entry.stem().to_string();
            return entry;
        },
    };

    entry.size = content.len() as u64;
    if let Some(fm) = FrontmatterParser::parse(&content) {
        apply_frontmatter(&mut entry, fm);
    }
    entry.suggestive = content.contains(SUGGESTION_MODE_LABEL);
    scan_labels(&mut entry, FrontmatterParser::extract_body(&content));

    if entry.title.is_empty() {
        entry.title = entry.stem().to_string();
    }
    entry.title = sanitize_title(&entry.title);
    entry
}

fn apply_frontmatter(entry: &mut JournalEntry, fm: Frontmatter) {
    let set = |slot: &mut String, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            *slot = v;
        }
    };

    set(&mut entry.title, fm.title);
    set(&mut entry.time, fm.time);
    set(&mut entry.project, fm.project);
    set(&mut entry.session_id, fm.session_id);
    set(&mut entry.entry_type, fm.entry_type);
    set(&mut entry.outcome, fm.outcome);
    set(&mut entry.summary, fm.summary);
    if entry.date.is_empty() {
        set(&mut entry.date, fm.date);
    }
    entry.topics = fm.topics;
    entry.key_files = fm.key_files;
}

/// Fills empty title, time and project from labelled lines.
fn scan_labels(entry: &mut JournalEntry, content: &str) {
    for line in content.split('\n').map(str::trim) {
        if entry.title.is_empty()
            && let Some(title) = line.strip_prefix(H1_PREFIX)
        {
            entry.title = title.to_string();
        }
        if entry.time.is_empty()
            && let Some(time) = line.strip_prefix(LABEL_TIME)
        {
            entry.time = time.trim().to_string();
        }
        if entry.project.is_empty()
            && let Some(project) = line.strip_prefix(LABEL_PROJECT)
        {
            entry.project = project.trim().to_string();
        }

        if !entry.title.is_empty() && !entry.time.is_empty() && !entry.project.is_empty() {
            break;
        }
    }
}

/// Makes a title safe for Markdown link text.
///
/// Runtime tags are removed, angle brackets become entities, backticks and
/// `#` are dropped.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let stripped = strip_claude_tags(title);
    encode_angles(stripped.trim())
        .replace(['`', '#'], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FilesystemStore;
    use std::fs;
    use tempfile::TempDir;
    use test_case::test_case;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn parse(dir: &TempDir, name: &str) -> JournalEntry {
        parse_entry(&FilesystemStore::new(), &dir.path().join(name), name)
    }

    #[test]
    fn test_parse_frontmatter_entry() {
        let dir = TempDir::new().unwrap();
        let name = "2026-01-21-fix-cache-abc12345.md";
        write(
            &dir,
            name,
            "---\ntitle: \"Fix cache\"\ntime: \"14:30:00\"\nproject: ctx\ntype: bugfix\n\
             outcome: completed\ntopics:\n  - caching\nkey_files:\n  - src/cache.rs\n\
             summary: Fixed stale reads\n---\n\n# Something else\n",
        );

        let entry = parse(&dir, name);
        assert_eq!(entry.date, "2026-01-21");
        assert_eq!(entry.title, "Fix cache");
        assert_eq!(entry.time, "14:30:00");
        assert_eq!(entry.project, "ctx");
        assert_eq!(entry.entry_type, "bugfix");
        assert_eq!(entry.outcome, "completed");
        assert_eq!(entry.topics, vec!["caching"]);
        assert_eq!(entry.key_files, vec!["src/cache.rs"]);
        assert_eq!(entry.summary, "Fixed stale reads");
        assert!(!entry.suggestive);
        assert!(entry.size > 0);
    }

    #[test]
    fn test_parse_label_fallback() {
        let dir = TempDir::new().unwrap();
        let name = "2026-01-22-session.md";
        write(
            &dir,
            name,
            "# Session title\n\n**Time**: 09:15:00\n**Project**: ctx\n",
        );

        let entry = parse(&dir, name);
        assert_eq!(entry.title, "Session title");
        assert_eq!(entry.time, "09:15:00");
        assert_eq!(entry.project, "ctx");
    }

    #[test]
    fn test_labels_never_override_frontmatter() {
        let dir = TempDir::new().unwrap();
        let name = "2026-01-22-session.md";
        write(
            &dir,
            name,
            "---\ntime: \"10:00:00\"\n---\n# Body title\n**Time**: 23:59:59\n**Project**: p\n",
        );

        let entry = parse(&dir, name);
        assert_eq!(entry.time, "10:00:00");
        assert_eq!(entry.title, "Body title");
        assert_eq!(entry.project, "p");
    }

    #[test]
    fn test_malformed_frontmatter_falls_back() {
        let dir = TempDir::new().unwrap();
        let name = "2026-01-23-x.md";
        write(&dir, name, "---\ntitle: [broken\n---\n# Fallback\n");

        let entry = parse(&dir, name);
        assert_eq!(entry.title, "Fallback");
        assert_eq!(entry.date, "2026-01-23");
    }

    #[test]
    fn test_title_defaults_to_stem() {
        let dir = TempDir::new().unwrap();
        write(&dir, "2026-01-24-untitled.md", "no heading here\n");
        assert_eq!(parse(&dir, "2026-01-24-untitled.md").title, "2026-01-24-untitled");
    }

    #[test]
    fn test_unreadable_entry_degrades() {
        let dir = TempDir::new().unwrap();
        let entry = parse(&dir, "2026-01-25-gone.md");
        assert_eq!(entry.title, "2026-01-25-gone");
        assert_eq!(entry.date, "2026-01-25");
        assert_eq!(entry.size, 0);
    }

    #[test]
    fn test_suggestive_detection() {
        let dir = TempDir::new().unwrap();
        write(&dir, "2026-01-26-s.md", "# S\n\nSUGGESTION MODE: try this\n");
        assert!(parse(&dir, "2026-01-26-s.md").suggestive);
    }

    #[test_case("<command-message>run tests</command-message>", "run tests" ; "runtime tags")]
    #[test_case("Fix `Vec<u8>` parsing", "Fix Vec&lt;u8&gt; parsing" ; "code and angles")]
    #[test_case("  # Issue #42  ", "Issue 42" ; "hashes")]
    fn test_sanitize_title(input: &str, expected: &str) {
        assert_eq!(sanitize_title(input), expected);
    }

    #[test]
    fn test_scan_sorts_newest_first() {
        let dir = TempDir::new().unwrap();
        write(&dir, "2026-01-20-a.md", "# A\n**Time**: 10:00:00\n");
        write(&dir, "2026-01-21-b.md", "# B\n**Time**: 08:00:00\n");
        write(&dir, "2026-01-21-c.md", "# C\n**Time**: 18:00:00\n");
        write(&dir, "notes.txt", "ignored");

        let entries = scan_entries(&FilesystemStore::new(), dir.path()).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_scan_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(scan_entries(&FilesystemStore::new(), &dir.path().join("nope")).is_err());
    }
}

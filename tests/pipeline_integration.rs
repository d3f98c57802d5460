//! End-to-end tests for site and vault generation.
//!
//! Each test builds a journal directory in a temp dir, runs a generator
//! through the public API and inspects the written tree.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use ctx_journal::storage::{ContentStore, FilesystemStore, JournalState, Stage};
use ctx_journal::{Error, Result, SiteGenerator, VaultGenerator};
use tempfile::TempDir;

const REDIS_CACHE: &str = "2026-01-20-redis-cache-aaaa1111.md";
const CACHE_EVICTION: &str = "2026-01-21-cache-eviction-bbbb2222.md";
const AUTH_FLOW: &str = "2026-01-22-auth-flow-cccc3333.md";

fn entry(title: &str, time: &str, topics: &[&str], entry_type: &str, body: &str) -> String {
    let topics: String = topics.iter().map(|t| format!("  - {t}\n")).collect();
    format!(
        "---\ntitle: \"{title}\"\ntime: \"{time}\"\nproject: ctx\ntype: {entry_type}\n\
         outcome: completed\ntopics:\n{topics}---\n\n# {title}\n\n{body}\n"
    )
}

/// Two entries share `caching`, one has the unique topic `oauth`.
fn caching_journal(root: &TempDir) -> PathBuf {
    let journal = root.path().join(".context").join("journal");
    fs::create_dir_all(&journal).unwrap();

    fs::write(
        journal.join(REDIS_CACHE),
        entry(
            "Add Redis cache",
            "09:00:00",
            &["caching", "redis"],
            "feature",
            "### 1. User (09:00:00)\n\nAdd a cache.\n\n### 2. Assistant (09:00:05)\n\nDone.",
        ),
    )
    .unwrap();
    fs::write(
        journal.join(CACHE_EVICTION),
        entry(
            "Fix cache eviction",
            "14:30:00",
            &["caching"],
            "bugfix",
            "### 1. User (14:30:00)\n\nEviction is broken.\n\n\
             ### 2. Tool Output (14:30:10)\n\nNo matches found\n\n\
             ### 3. Assistant (14:30:20)\n\nFixed.",
        ),
    )
    .unwrap();
    fs::write(
        journal.join(AUTH_FLOW),
        entry(
            "Rework auth flow",
            "11:00:00",
            &["oauth"],
            "feature",
            "See [the cache session](2026-01-20-redis-cache-aaaa1111.md) and \
             [docs](https://example.com/auth).",
        ),
    )
    .unwrap();

    journal
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[test]
fn test_site_topic_index_links_popular_and_longtail() {
    let root = TempDir::new().unwrap();
    let journal = caching_journal(&root);
    let out = root.path().join("site");

    let store = FilesystemStore::new();
    let state = JournalState::load(&store, &journal).unwrap();
    let report = SiteGenerator::new(&store, &state)
        .generate(&journal, &out)
        .unwrap();

    assert_eq!(report.entries, 3);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let topics = read(&out.join("docs/topics/index.md"));
    assert!(topics.contains("- [caching](caching.md) (2 sessions)"));
    assert!(topics.contains("- **oauth** — [Rework auth flow](../2026-01-22-auth-flow-cccc3333.md)"));
    assert!(topics.contains("- **redis** — [Add Redis cache](../2026-01-20-redis-cache-aaaa1111.md)"));

    let caching = read(&out.join("docs/topics/caching.md"));
    assert!(caching.contains("[Fix cache eviction](../2026-01-21-cache-eviction-bbbb2222.md)"));
    assert!(caching.contains("[Add Redis cache](../2026-01-20-redis-cache-aaaa1111.md)"));
    assert!(!out.join("docs/topics/oauth.md").exists());

    // Types always get pages; there are no key files.
    assert!(out.join("docs/types/bugfix.md").is_file());
    assert!(out.join("docs/types/feature.md").is_file());
    assert!(!out.join("docs/files").exists());

    let index = read(&out.join("docs/index.md"));
    assert!(index.contains("**Sessions**: 3 | **Suggestions**: 0"));
    let newest = index.find("Rework auth flow").unwrap();
    let oldest = index.find("Add Redis cache").unwrap();
    assert!(newest < oldest);

    let toml = read(&out.join("zensical.toml"));
    assert!(toml.contains("{ \"Topics\" = \"topics/index.md\" },"));
    assert!(toml.contains("{ \"Types\" = \"types/index.md\" },"));
    assert!(!toml.contains("\"Files\""));
}

#[test]
fn test_site_rewrites_source_and_decorates_copy() {
    let root = TempDir::new().unwrap();
    let journal = caching_journal(&root);
    let out = root.path().join("site");
    let reminder = "# Reminder\n\n<system-reminder>\ninternal\n</system-reminder>\n\nkept\n";
    fs::write(journal.join("2026-01-23-reminder.md"), reminder).unwrap();

    let store = FilesystemStore::new();
    let state = JournalState::default();
    SiteGenerator::new(&store, &state)
        .generate(&journal, &out)
        .unwrap();

    let source = read(&journal.join("2026-01-23-reminder.md"));
    assert!(!source.contains("internal"));
    assert!(source.contains("kept"));

    let page = read(&out.join("docs/2026-01-23-reminder.md"));
    assert!(page.starts_with("*Source: [.context/journal/2026-01-23-reminder.md](file://"));

    let eviction = read(&out.join("docs").join(CACHE_EVICTION));
    assert!(!eviction.contains("Tool Output"));
    assert!(!eviction.contains("No matches found"));
    assert!(eviction.contains("### 3. Assistant (14:30:20)"));
}

#[test]
fn test_vault_hub_and_related_footer() {
    let root = TempDir::new().unwrap();
    let journal = caching_journal(&root);
    let out = root.path().join("vault");
    let before = read(&journal.join(AUTH_FLOW));

    let store = FilesystemStore::new();
    let report = VaultGenerator::new(&store).generate(&journal, &out).unwrap();
    assert_eq!(report.entries, 3);

    let hub = read(&out.join("_Topics.md"));
    assert!(hub.contains("- [[caching]] (2 sessions)"));
    assert!(hub.contains("- **oauth** — [[2026-01-22-auth-flow-cccc3333|Rework auth flow]]"));
    assert!(out.join("topics/caching.md").is_file());

    let redis = read(&out.join("entries").join(REDIS_CACHE));
    assert!(redis.contains("## Related Sessions"));
    assert!(redis.contains("- [[2026-01-21-cache-eviction-bbbb2222|Fix cache eviction]]"));
    assert!(redis.contains("tags:"));

    let eviction = read(&out.join("entries").join(CACHE_EVICTION));
    assert!(eviction.contains("- [[2026-01-20-redis-cache-aaaa1111|Add Redis cache]]"));
    assert!(eviction.contains("**Type**: [[bugfix]]"));

    let auth = read(&out.join("entries").join(AUTH_FLOW));
    assert!(auth.contains("[[2026-01-20-redis-cache-aaaa1111|the cache session]]"));
    assert!(auth.contains("[docs](https://example.com/auth)"));
    assert!(!auth.contains("**See also**"));

    let home = read(&out.join("Home.md"));
    assert!(home.contains("[[_Topics|Topics]]"));
    assert!(home.contains("[[_Session Types|Session Types]]"));
    assert!(!home.contains("[[_Key Files|Key Files]]"));

    assert_eq!(read(&journal.join(AUTH_FLOW)), before);
}

#[test]
fn test_missing_and_empty_journal_are_fatal() {
    let root = TempDir::new().unwrap();
    let store = FilesystemStore::new();
    let state = JournalState::default();
    let missing = root.path().join("journal");

    let err = SiteGenerator::new(&store, &state)
        .generate(&missing, &root.path().join("site"))
        .unwrap_err();
    assert!(matches!(err, Error::JournalNotFound(_)));

    fs::create_dir_all(&missing).unwrap();
    fs::write(missing.join("notes.txt"), "not an entry").unwrap();
    let err = VaultGenerator::new(&store)
        .generate(&missing, &root.path().join("vault"))
        .unwrap_err();
    assert!(matches!(err, Error::NoEntries(_)));
}

/// Fails reads of one file to exercise per-file warnings.
struct FlakyStore {
    inner: FilesystemStore,
    broken: &'static str,
}

impl ContentStore for FlakyStore {
    fn list_files(&self, dir: &Path, extension: &str) -> Result<Vec<String>> {
        self.inner.list_files(dir, extension)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        if path.ends_with(self.broken) {
            return Err(Error::operation("read_file", "simulated failure"));
        }
        self.inner.read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.inner.write(path, content)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.inner.create_dir_all(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.inner.rename(from, to)
    }
}

#[test]
fn test_unreadable_entry_is_a_warning() {
    let root = TempDir::new().unwrap();
    let journal = caching_journal(&root);
    let store = FlakyStore {
        inner: FilesystemStore::new(),
        broken: AUTH_FLOW,
    };
    let state = JournalState::default();

    let out = root.path().join("site");
    let report = SiteGenerator::new(&store, &state)
        .generate(&journal, &out)
        .unwrap();

    assert_eq!(report.entries, 3);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].path.ends_with(AUTH_FLOW));
    assert!(report.warnings[0].cause.contains("simulated failure"));
    assert!(!out.join("docs").join(AUTH_FLOW).exists());
    assert!(out.join("docs").join(REDIS_CACHE).is_file());

    // The scanner still lists the entry, titled after its filename.
    let index = read(&out.join("docs/index.md"));
    assert!(index.contains("[2026-01-22-auth-flow-cccc3333](2026-01-22-auth-flow-cccc3333.md)"));
}

#[test]
fn test_invalid_utf8_entry_still_gets_a_page() {
    let root = TempDir::new().unwrap();
    let journal = caching_journal(&root);
    let name = "2026-01-23-binary-dddd4444.md";
    let mut raw = b"# Binary output\n\n### 1. Tool Output (10:00:00)\n\n".to_vec();
    raw.extend_from_slice(b"garbage \xff\xfe here\n");
    fs::write(journal.join(name), &raw).unwrap();

    let store = FilesystemStore::new();
    let state = JournalState::default();
    let out = root.path().join("site");
    let report = SiteGenerator::new(&store, &state)
        .generate(&journal, &out)
        .unwrap();

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let page = read(&out.join("docs").join(name));
    assert!(page.contains("garbage \u{FFFD}\u{FFFD} here"));
    assert!(read(&out.join("docs/index.md")).contains(name));
    assert_eq!(fs::read(journal.join(name)).unwrap(), raw);
}

#[test]
fn test_state_sidecar_drives_fence_stripping() {
    let root = TempDir::new().unwrap();
    let journal = caching_journal(&root);
    let fenced = "# Fenced\n\n### 1. Assistant (10:00:00)\n\n```sh\nls\n```\n";
    fs::write(journal.join("2026-01-24-fenced.md"), fenced).unwrap();

    let store = FilesystemStore::new();
    let mut state = JournalState::load(&store, &journal).unwrap();
    state.mark("2026-01-24-fenced.md", Stage::FencesVerified);
    state.save(&store, &journal).unwrap();
    assert!(journal.join(".state.json").is_file());

    let reloaded = JournalState::load(&store, &journal).unwrap();
    assert!(reloaded.is_fences_verified("2026-01-24-fenced.md"));

    let out = root.path().join("site");
    SiteGenerator::new(&store, &reloaded)
        .generate(&journal, &out)
        .unwrap();

    assert!(read(&out.join("docs/2026-01-24-fenced.md")).contains("```sh"));
}

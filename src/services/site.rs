//! Static site generation.

use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::instrument;

use super::indexer::{
    build_key_file_index, build_topic_index, build_type_index, filter_with_key_files,
    filter_with_topics, filter_with_type,
};
use super::{GenerationReport, require_entries};
use crate::models::{EXT_MARKDOWN, JournalEntry};
use crate::normalize::{Pipeline, normalize_site_content};
use crate::rendering::INDEX_FILE;
use crate::rendering::site::{
    DEFAULT_SITE_NAME, DIR_FILES, DIR_TOPICS, DIR_TYPES, EXTRA_CSS, SiteSections,
    generate_index, generate_key_file_page, generate_key_files_index, generate_site_readme,
    generate_topic_page, generate_topics_index, generate_type_page, generate_types_index,
    generate_zensical_toml, inject_source_link, inject_summary, key_file_slug,
};
use crate::storage::{ContentStore, JournalState};
use crate::{Error, Result};

/// Site builder binary.
pub const ZENSICAL_BIN: &str = "zensical";

/// Install hint shown when [`ZENSICAL_BIN`] is missing.
pub const ZENSICAL_HINT: &str = "pipx install zensical";

const DIR_DOCS: &str = "docs";
const DIR_STYLESHEETS: &str = "stylesheets";
const EXTRA_CSS_FILE: &str = "extra.css";
const README_FILE: &str = "README.md";
const ZENSICAL_TOML: &str = "zensical.toml";

/// Generates a zensical project from a journal directory.
///
/// Source files are normalized in place (written back only when the text
/// changed); the site copy additionally gets a source link, the summary and
/// the read-only site normalization.
pub struct SiteGenerator<'a, S: ContentStore + ?Sized> {
    store: &'a S,
    state: &'a JournalState,
    site_name: String,
}

impl<'a, S: ContentStore + ?Sized> SiteGenerator<'a, S> {
    /// Creates a generator over `store`, reading stage flags from `state`.
    #[must_use]
    pub fn new(store: &'a S, state: &'a JournalState) -> Self {
        Self {
            store,
            state,
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }

    /// Sets the `site_name` written to `zensical.toml`.
    #[must_use]
    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    /// Writes the site tree under `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal directory is missing or empty, or if
    /// an output directory, the index, the README, the stylesheet or
    /// `zensical.toml` cannot be written. Failures on individual entries and
    /// section pages are collected in the report instead.
    #[instrument(skip(self), fields(operation = "journal.site"))]
    pub fn generate(&self, journal_dir: &Path, output: &Path) -> Result<GenerationReport> {
        let start = Instant::now();
        let entries = require_entries(self.store, journal_dir)?;
        let mut report = GenerationReport::new(output);
        report.entries = entries.len();

        let docs = output.join(DIR_DOCS);
        self.store.create_dir_all(&docs)?;
        self.store.write_with_parents(
            &docs.join(DIR_STYLESHEETS).join(EXTRA_CSS_FILE),
            EXTRA_CSS,
        )?;
        self.store
            .write(&output.join(README_FILE), &generate_site_readme(journal_dir))?;

        let mutating = Pipeline::mutating();
        for entry in &entries {
            self.write_entry(&mutating, entry, &docs, &mut report);
        }

        self.store
            .write(&docs.join(INDEX_FILE), &generate_index(&entries))?;

        let sections = self.write_sections(&entries, &docs, &mut report)?;

        self.store.write(
            &output.join(ZENSICAL_TOML),
            &generate_zensical_toml(&self.site_name, &entries, sections),
        )?;

        tracing::info!(
            output = %output.display(),
            entries = report.entries,
            warnings = report.warnings.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "generated site"
        );
        Ok(report)
    }

    fn write_entry(
        &self,
        mutating: &Pipeline,
        entry: &JournalEntry,
        docs: &Path,
        report: &mut GenerationReport,
    ) {
        let content = match self.store.read_to_string(&entry.path) {
            Ok(content) => content,
            Err(e) => {
                report.warn(&entry.path, &e);
                return;
            },
        };

        let normalized = mutating.run(&content);
        if content.contains(char::REPLACEMENT_CHARACTER) {
            tracing::debug!(file = %entry.filename, "source has undecodable bytes, not rewriting");
        } else if normalized != content {
            tracing::debug!(file = %entry.filename, "rewriting normalized source");
            if let Err(e) = self.store.write(&entry.path, &normalized) {
                report.warn(&entry.path, &e);
            }
        }

        let mut page = inject_source_link(&normalized, &entry.path);
        if !entry.summary.is_empty() {
            page = inject_summary(&page, &entry.summary);
        }
        let page = normalize_site_content(&page, self.state.is_fences_verified(&entry.filename));

        report.write_page(self.store, &docs.join(&entry.filename), &page);
    }

    fn write_sections(
        &self,
        entries: &[JournalEntry],
        docs: &Path,
        report: &mut GenerationReport,
    ) -> Result<SiteSections> {
        let mut sections = SiteSections::default();

        let topics = build_topic_index(&filter_with_topics(entries));
        if !topics.is_empty() {
            let dir = self.section_dir(docs, DIR_TOPICS, &generate_topics_index(&topics))?;
            for topic in topics.iter().filter(|t| t.popular) {
                let path = dir.join(format!("{}{EXT_MARKDOWN}", topic.name));
                report.write_page(self.store, &path, &generate_topic_page(topic));
            }
            sections.topics = true;
        }

        let files = build_key_file_index(&filter_with_key_files(entries));
        if !files.is_empty() {
            let dir = self.section_dir(docs, DIR_FILES, &generate_key_files_index(&files))?;
            for file in files.iter().filter(|f| f.popular) {
                let path = dir.join(format!("{}{EXT_MARKDOWN}", key_file_slug(&file.path)));
                report.write_page(self.store, &path, &generate_key_file_page(file));
            }
            sections.files = true;
        }

        let types = build_type_index(&filter_with_type(entries));
        if !types.is_empty() {
            let dir = self.section_dir(docs, DIR_TYPES, &generate_types_index(&types))?;
            for group in &types {
                let path = dir.join(format!("{}{EXT_MARKDOWN}", group.name));
                report.write_page(self.store, &path, &generate_type_page(group));
            }
            sections.types = true;
        }

        Ok(sections)
    }

    /// Creates `docs/<name>/` with its index page.
    fn section_dir(&self, docs: &Path, name: &str, index: &str) -> Result<std::path::PathBuf> {
        let dir = docs.join(name);
        self.store.create_dir_all(&dir)?;
        self.store.write(&dir.join(INDEX_FILE), index)?;
        Ok(dir)
    }
}

/// Runs `zensical <command>` in `dir` with inherited stdio.
///
/// # Errors
///
/// Returns [`Error::ToolNotFound`] when the binary is not installed, or an
/// error if it exits unsuccessfully.
pub fn run_zensical(dir: &Path, command: &str) -> Result<()> {
    tracing::debug!(dir = %dir.display(), command, "running zensical");

    let status = Command::new(ZENSICAL_BIN)
        .arg(command)
        .current_dir(dir)
        .status()
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::ToolNotFound {
                    name: ZENSICAL_BIN.to_string(),
                    hint: ZENSICAL_HINT.to_string(),
                }
            } else {
                Error::operation("run_zensical", e)
            }
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::OperationFailed {
            operation: format!("{ZENSICAL_BIN} {command}"),
            cause: status.to_string(),
        })
    }
}

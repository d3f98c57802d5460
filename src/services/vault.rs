//! Obsidian vault generation.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use tracing::instrument;

use super::indexer::{
    MAX_RELATED, build_key_file_index, build_topic_index, build_topic_lookup, build_type_index,
    filter_regular, filter_with_key_files, filter_with_topics, filter_with_type,
};
use super::{GenerationReport, require_entries};
use crate::markdown::convert_markdown_links;
use crate::models::{EXT_MARKDOWN, JournalEntry};
use crate::normalize::Pipeline;
use crate::rendering::site::{DIR_FILES, DIR_TOPICS, DIR_TYPES, JOURNAL_REL_DIR, key_file_slug};
use crate::rendering::vault::{
    APP_CONFIG_FILE, APP_JSON, DIR_CONFIG, DIR_ENTRIES, FILES_MOC, HOME_MOC, TOPICS_MOC,
    TYPES_MOC, VaultSections, generate_file_page, generate_files_moc, generate_home_moc,
    generate_topic_page, generate_topics_moc, generate_type_page, generate_types_moc,
    generate_vault_readme, related_footer, transform_frontmatter,
};
use crate::storage::ContentStore;
use crate::Result;

const README_FILE: &str = "README.md";

/// Generates an Obsidian vault from a journal directory.
///
/// Source files are never modified: normalization runs on an in-memory copy.
pub struct VaultGenerator<'a, S: ContentStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ContentStore + ?Sized> VaultGenerator<'a, S> {
    /// Creates a generator over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Writes the vault under `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal directory is missing or empty, or if
    /// the vault directories, settings, README, hub notes or `Home.md`
    /// cannot be written. Entry and detail page failures are collected in
    /// the report.
    #[instrument(skip(self), fields(operation = "journal.obsidian"))]
    pub fn generate(&self, journal_dir: &Path, output: &Path) -> Result<GenerationReport> {
        let start = Instant::now();
        let entries = require_entries(self.store, journal_dir)?;
        let mut report = GenerationReport::new(output);
        report.entries = entries.len();

        for dir in [DIR_ENTRIES, DIR_CONFIG, DIR_TOPICS, DIR_FILES, DIR_TYPES] {
            self.store.create_dir_all(&output.join(dir))?;
        }
        self.store
            .write(&output.join(DIR_CONFIG).join(APP_CONFIG_FILE), APP_JSON)?;
        self.store
            .write(&output.join(README_FILE), &generate_vault_readme(journal_dir))?;

        let topic_entries = filter_with_topics(&entries);
        let lookup = build_topic_lookup(&topic_entries);

        let mutating = Pipeline::mutating();
        let entries_dir = output.join(DIR_ENTRIES);
        for entry in &entries {
            self.write_entry(&mutating, entry, &lookup, &entries_dir, &mut report);
        }

        let sections = self.write_mocs(&entries, output, &mut report)?;

        self.store.write(
            &output.join(HOME_MOC),
            &generate_home_moc(&filter_regular(&entries), sections),
        )?;

        tracing::info!(
            output = %output.display(),
            entries = report.entries,
            warnings = report.warnings.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "generated vault"
        );
        Ok(report)
    }

    fn write_entry(
        &self,
        mutating: &Pipeline,
        entry: &JournalEntry,
        lookup: &HashMap<String, Vec<JournalEntry>>,
        entries_dir: &Path,
        report: &mut GenerationReport,
    ) {
        let content = match self.store.read_to_string(&entry.path) {
            Ok(content) => content,
            Err(e) => {
                report.warn(&entry.path, &e);
                return;
            },
        };

        let source_file = format!("{JOURNAL_REL_DIR}/{}", entry.filename);
        let mut note = transform_frontmatter(&mutating.run(&content), &source_file);
        note = convert_markdown_links(&note);
        note.push_str(&related_footer(entry, lookup, MAX_RELATED));

        report.write_page(self.store, &entries_dir.join(&entry.filename), &note);
    }

    fn write_mocs(
        &self,
        entries: &[JournalEntry],
        output: &Path,
        report: &mut GenerationReport,
    ) -> Result<VaultSections> {
        let mut sections = VaultSections::default();

        let topics = build_topic_index(&filter_with_topics(entries));
        if !topics.is_empty() {
            self.store
                .write(&output.join(TOPICS_MOC), &generate_topics_moc(&topics))?;
            for topic in topics.iter().filter(|t| t.popular) {
                let path = output
                    .join(DIR_TOPICS)
                    .join(format!("{}{EXT_MARKDOWN}", topic.name));
                report.write_page(self.store, &path, &generate_topic_page(topic));
            }
            sections.topics = true;
        }

        let files = build_key_file_index(&filter_with_key_files(entries));
        if !files.is_empty() {
            self.store
                .write(&output.join(FILES_MOC), &generate_files_moc(&files))?;
            for file in files.iter().filter(|f| f.popular) {
                let path = output
                    .join(DIR_FILES)
                    .join(format!("{}{EXT_MARKDOWN}", key_file_slug(&file.path)));
                report.write_page(self.store, &path, &generate_file_page(file));
            }
            sections.files = true;
        }

        let types = build_type_index(&filter_with_type(entries));
        if !types.is_empty() {
            self.store
                .write(&output.join(TYPES_MOC), &generate_types_moc(&types))?;
            for group in &types {
                let path = output
                    .join(DIR_TYPES)
                    .join(format!("{}{EXT_MARKDOWN}", group.name));
                report.write_page(self.store, &path, &generate_type_page(group));
            }
            sections.types = true;
        }

        Ok(sections)
    }
}

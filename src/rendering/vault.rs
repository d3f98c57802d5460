//! Obsidian vault pages: hub notes (MOCs), grouped pages and the related
//! sessions footer.

use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

use super::{MAX_RECENT_SESSIONS, distinct_sessions, group_by_month, session_count};
use super::site::key_file_slug;
use crate::markdown::{FrontmatterParser, format_wikilink, format_wikilink_entry};
use crate::models::{JournalEntry, KeyFileGroup, TopicGroup, TypeGroup, VaultFrontmatter};
use crate::services::indexer::collect_related;

/// Root hub note.
pub const HOME_MOC: &str = "Home.md";
/// Topics hub note.
pub const TOPICS_MOC: &str = "_Topics.md";
/// Key files hub note.
pub const FILES_MOC: &str = "_Key Files.md";
/// Session types hub note.
pub const TYPES_MOC: &str = "_Session Types.md";

/// Entry notes directory.
pub const DIR_ENTRIES: &str = "entries";
/// Obsidian settings directory.
pub const DIR_CONFIG: &str = ".obsidian";
/// Obsidian app settings file.
pub const APP_CONFIG_FILE: &str = "app.json";

/// Wikilinks on, and new notes land next to the entries.
pub const APP_JSON: &str = r#"{
  "useMarkdownLinks": false,
  "newLinkFormat": "shortest",
  "showFrontmatter": true,
  "newFileLocation": "folder",
  "newFileFolderPath": "entries"
}
"#;

fn moc_target(file: &str) -> &str {
    file.strip_suffix(".md").unwrap_or(file)
}

/// Which hub notes exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct VaultSections {
    /// `_Topics.md` was written.
    pub topics: bool,
    /// `_Key Files.md` was written.
    pub files: bool,
    /// `_Session Types.md` was written.
    pub types: bool,
}

/// Renders `Home.md` from regular entries.
#[must_use]
pub fn generate_home_moc(entries: &[JournalEntry], sections: VaultSections) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Session Journal\n");
    let _ = writeln!(out, "Navigation hub for all journal entries.\n");

    let _ = writeln!(out, "## Browse by\n");
    for (present, file, label, what) in [
        (sections.topics, TOPICS_MOC, "Topics", "topic"),
        (sections.files, FILES_MOC, "Key Files", "file touched"),
        (sections.types, TYPES_MOC, "Session Types", "type"),
    ] {
        if present {
            let _ = writeln!(
                out,
                "- {} — sessions grouped by {what}",
                format_wikilink(moc_target(file), label)
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "## Recent Sessions\n");
    for entry in entries.iter().take(MAX_RECENT_SESSIONS) {
        let _ = writeln!(out, "{}", format_wikilink_entry(entry));
    }
    out.push('\n');
    out
}

fn write_stats(out: &mut String, title: &str, stats: &str) {
    let _ = writeln!(out, "{title}\n");
    let _ = writeln!(out, "{stats}\n");
}

fn write_list(out: &mut String, heading: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}\n");
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out.push('\n');
}

fn entry_wikilink(entry: &JournalEntry) -> String {
    format_wikilink(entry.stem(), &entry.title)
}

/// Renders `_Topics.md`.
#[must_use]
pub fn generate_topics_moc(topics: &[TopicGroup]) -> String {
    let (popular, longtail): (Vec<&TopicGroup>, Vec<&TopicGroup>) =
        topics.iter().partition(|t| t.popular);

    let mut out = String::new();
    write_stats(
        &mut out,
        "# Topics",
        &format!(
            "**{} topics** across **{}** ({} popular, {} long-tail)",
            topics.len(),
            session_count(distinct_sessions(topics.iter().flat_map(|t| &t.entries))),
            popular.len(),
            longtail.len()
        ),
    );

    let popular: Vec<String> = popular
        .iter()
        .map(|t| {
            format!(
                "- {} ({})",
                format_wikilink(&t.name, &t.name),
                session_count(t.entries.len())
            )
        })
        .collect();
    write_list(&mut out, "## Popular Topics", &popular);

    let longtail: Vec<String> = longtail
        .iter()
        .filter_map(|t| {
            let first = t.entries.first()?;
            Some(format!("- **{}** — {}", t.name, entry_wikilink(first)))
        })
        .collect();
    write_list(&mut out, "## Long-tail Topics", &longtail);

    out
}

/// Renders `_Key Files.md`.
#[must_use]
pub fn generate_files_moc(files: &[KeyFileGroup]) -> String {
    let (popular, longtail): (Vec<&KeyFileGroup>, Vec<&KeyFileGroup>) =
        files.iter().partition(|f| f.popular);

    let mut out = String::new();
    write_stats(
        &mut out,
        "# Key Files",
        &format!(
            "**{} files** across **{}** ({} popular, {} long-tail)",
            files.len(),
            session_count(distinct_sessions(files.iter().flat_map(|f| &f.entries))),
            popular.len(),
            longtail.len()
        ),
    );

    let popular: Vec<String> = popular
        .iter()
        .map(|f| {
            format!(
                "- {} ({})",
                format_wikilink(&key_file_slug(&f.path), &format!("`{}`", f.path)),
                session_count(f.entries.len())
            )
        })
        .collect();
    write_list(&mut out, "## Frequently Touched", &popular);

    let longtail: Vec<String> = longtail
        .iter()
        .filter_map(|f| {
            let first = f.entries.first()?;
            Some(format!("- `{}` — {}", f.path, entry_wikilink(first)))
        })
        .collect();
    write_list(&mut out, "## Single Session", &longtail);

    out
}

/// Renders `_Session Types.md`.
#[must_use]
pub fn generate_types_moc(types: &[TypeGroup]) -> String {
    let total: usize = types.iter().map(|t| t.entries.len()).sum();

    let mut out = String::new();
    write_stats(
        &mut out,
        "# Session Types",
        &format!("**{} types** across **{}**", types.len(), session_count(total)),
    );

    let lines: Vec<String> = types
        .iter()
        .map(|t| {
            format!(
                "- {} ({})",
                format_wikilink(&t.name, &t.name),
                session_count(t.entries.len())
            )
        })
        .collect();
    for line in &lines {
        let _ = writeln!(out, "{line}");
    }
    out.push('\n');
    out
}

fn grouped_page(heading: &str, stats: &str, entries: &[JournalEntry]) -> String {
    let mut out = String::new();
    write_stats(&mut out, heading, stats);

    for (month, members) in group_by_month(entries) {
        let _ = writeln!(out, "## {month}\n");
        for entry in members {
            let _ = writeln!(out, "{}", format_wikilink_entry(entry));
        }
        out.push('\n');
    }
    out
}

/// Renders `topics/<topic>.md`.
#[must_use]
pub fn generate_topic_page(topic: &TopicGroup) -> String {
    grouped_page(
        &format!("# {}", topic.name),
        &format!("**{}** with this topic.", session_count(topic.entries.len())),
        &topic.entries,
    )
}

/// Renders `files/<slug>.md`.
#[must_use]
pub fn generate_file_page(file: &KeyFileGroup) -> String {
    grouped_page(
        &format!("# `{}`", file.path),
        &format!("**{}** touching this file.", session_count(file.entries.len())),
        &file.entries,
    )
}

/// Renders `types/<type>.md`.
#[must_use]
pub fn generate_type_page(group: &TypeGroup) -> String {
    grouped_page(
        &format!("# {}", group.name),
        &format!("**{}** of type *{}*.", session_count(group.entries.len()), group.name),
        &group.entries,
    )
}

/// Footer appended to each vault entry: topic and type links plus
/// sessions sharing topics.
///
/// Empty when the entry has neither topics nor a type.
#[must_use]
pub fn related_footer(
    entry: &JournalEntry,
    lookup: &HashMap<String, Vec<JournalEntry>>,
    max_related: usize,
) -> String {
    if entry.topics.is_empty() && entry.entry_type.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n---\n\n## Related Sessions\n\n");

    if !entry.topics.is_empty() {
        let links: Vec<String> = std::iter::once(format_wikilink(moc_target(TOPICS_MOC), "Topics MOC"))
            .chain(entry.topics.iter().map(|t| format_wikilink(t, t)))
            .collect();
        let _ = writeln!(out, "**Topics**: {}\n", links.join(" · "));
    }

    if !entry.entry_type.is_empty() {
        let _ = writeln!(
            out,
            "**Type**: {}\n",
            format_wikilink(&entry.entry_type, &entry.entry_type)
        );
    }

    let related = collect_related(entry, lookup, max_related);
    if !related.is_empty() {
        let _ = writeln!(out, "**See also**:");
        for other in &related {
            let _ = writeln!(out, "- {}", entry_wikilink(other));
        }
        out.push('\n');
    }

    out
}

/// Rewrites journal frontmatter into the vault shape.
///
/// Topics become tags, the title becomes an alias and `source_file` points
/// back to the journal. Content without parseable frontmatter is returned
/// unchanged.
#[must_use]
pub fn transform_frontmatter(content: &str, source_file: &str) -> String {
    let Some(block) = FrontmatterParser::split(content) else {
        return content.to_string();
    };
    let Some(fm) = FrontmatterParser::parse(content) else {
        return content.to_string();
    };

    let vault = VaultFrontmatter::from_journal(fm, source_file);
    match FrontmatterParser::serialize(&vault, block.body) {
        Ok(out) => out,
        Err(e) => {
            tracing::debug!(error = %e, "keeping original frontmatter");
            content.to_string()
        },
    }
}

/// Renders the vault `README.md`.
#[must_use]
pub fn generate_vault_readme(journal_dir: &Path) -> String {
    format!(
        "# Session Journal Vault\n\n\
         Generated from `{}`. Do not edit by hand: regenerate with\n\
         `ctx-journal obsidian`.\n\n\
         Open this folder in Obsidian (Open folder as vault) and start from\n\
         [[Home]].\n",
        journal_dir.display()
    )
}

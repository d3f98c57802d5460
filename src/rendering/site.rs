//! Static site pages and `zensical.toml`.
//!
//! Links inside `docs/` are relative: the index links `file.md`, section
//! pages one level down link `../file.md`.

use std::fmt::Write;
use std::path::Path;

use super::{INDEX_FILE, MAX_RECENT_SESSIONS, distinct_sessions, group_by_month, session_count};
use crate::markdown::FrontmatterParser;
use crate::models::{JournalEntry, KeyFileGroup, TopicGroup, TypeGroup};

/// Topic pages directory under `docs/`.
pub const DIR_TOPICS: &str = "topics";
/// Key file pages directory under `docs/`.
pub const DIR_FILES: &str = "files";
/// Session type pages directory under `docs/`.
pub const DIR_TYPES: &str = "types";

/// Navigation titles longer than this are cut and suffixed with `...`.
pub const MAX_NAV_TITLE_LEN: usize = 40;

/// Journal location cited by source links.
pub const JOURNAL_REL_DIR: &str = ".context/journal";

/// Default `site_name`.
pub const DEFAULT_SITE_NAME: &str = "Session Journal";

const PARENT: &str = "../";

/// Stylesheet written to `docs/stylesheets/extra.css`.
pub const EXTRA_CSS: &str = "\
/* Keep long tool output inside the content column. */
.md-typeset pre > code {
  white-space: pre-wrap;
  word-break: break-word;
}
";

const THEME: &str = r#"[project.theme]
language = "en"
features = [
    "content.code.copy",
    "navigation.instant",
    "navigation.top",
    "search.highlight",
]

[[project.theme.palette]]
scheme = "default"
toggle.icon = "lucide/sun"
toggle.name = "Switch to dark mode"

[[project.theme.palette]]
scheme = "slate"
toggle.icon = "lucide/moon"
toggle.name = "Switch to light mode"
"#;

/// Human-readable size: `512B`, `1.5KB`, `2.0MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        return format!("{kb:.1}KB");
    }
    format!("{:.1}MB", kb / 1024.0)
}

/// File-name slug for a key file page: `*` becomes `x`, any other
/// non-alphanumeric character becomes `_`.
#[must_use]
pub fn key_file_slug(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            '*' => 'x',
            c if c.is_ascii_alphanumeric() => c,
            _ => '_',
        })
        .collect()
}

/// One line of the journal index.
///
/// ```text
/// - 14:30 [Fix cache](2026-01-21-fix-cache.md) (ctx) `2.1KB`
/// ```
#[must_use]
pub fn format_index_entry(entry: &JournalEntry) -> String {
    let project = if entry.project.is_empty() {
        String::new()
    } else {
        format!(" ({})", entry.project)
    };

    format!(
        "- {}[{}]({}.md){project} `{}`",
        entry.time_prefix(),
        entry.title,
        entry.stem(),
        format_size(entry.size)
    )
}

/// Renders `docs/index.md`.
///
/// Regular entries are grouped by month; suggestion sessions get their own
/// section at the end. Continuation parts are left out of both.
#[must_use]
pub fn generate_index(entries: &[JournalEntry]) -> String {
    let (suggestions, regular): (Vec<JournalEntry>, Vec<JournalEntry>) = entries
        .iter()
        .filter(|e| !e.is_continuation())
        .cloned()
        .partition(|e| e.suggestive);

    let mut out = String::new();
    let _ = writeln!(out, "# Session Journal\n");
    let _ = writeln!(out, "Browse your AI session history.\n");
    let _ = writeln!(
        out,
        "**Sessions**: {} | **Suggestions**: {}\n",
        regular.len(),
        suggestions.len()
    );

    for (month, members) in group_by_month(&regular) {
        let _ = writeln!(out, "## {month}\n");
        for entry in members {
            let _ = writeln!(out, "{}", format_index_entry(entry));
        }
        out.push('\n');
    }

    if !suggestions.is_empty() {
        let _ = writeln!(out, "---\n");
        let _ = writeln!(out, "## Suggestions\n");
        let _ = writeln!(out, "*Auto-generated suggestion prompts.*\n");
        for entry in &suggestions {
            let _ = writeln!(out, "{}", format_index_entry(entry));
        }
        out.push('\n');
    }

    out
}

/// Month-grouped entry links, one directory below `docs/`.
fn write_month_sections(out: &mut String, entries: &[JournalEntry]) {
    for (month, members) in group_by_month(entries) {
        let _ = writeln!(out, "## {month}\n");
        for entry in members {
            let _ = writeln!(
                out,
                "- {}[{}]({PARENT}{}.md)",
                entry.time_prefix(),
                entry.title,
                entry.stem()
            );
            if !entry.summary.is_empty() {
                let _ = writeln!(out, "  *{}*", entry.summary);
            }
        }
        out.push('\n');
    }
}

fn grouped_page(heading: &str, stats: &str, entries: &[JournalEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{heading}\n");
    let _ = writeln!(out, "{stats}\n");
    write_month_sections(&mut out, entries);
    out
}

/// Popular groups link to their page; long-tail groups link straight to
/// their single session.
struct SectionIndex<'a> {
    title: &'a str,
    stats: String,
    popular_heading: &'a str,
    popular: Vec<String>,
    longtail_heading: &'a str,
    longtail: Vec<String>,
}

impl SectionIndex<'_> {
    fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}\n", self.title);
        let _ = writeln!(out, "{}\n", self.stats);

        for (heading, lines) in [
            (self.popular_heading, &self.popular),
            (self.longtail_heading, &self.longtail),
        ] {
            if lines.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{heading}\n");
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
            out.push('\n');
        }

        out
    }
}

fn entry_link(entry: &JournalEntry) -> String {
    format!("[{}]({PARENT}{}.md)", entry.title, entry.stem())
}

/// Renders `docs/topics/index.md`.
#[must_use]
pub fn generate_topics_index(topics: &[TopicGroup]) -> String {
    let (popular, longtail): (Vec<&TopicGroup>, Vec<&TopicGroup>) =
        topics.iter().partition(|t| t.popular);

    SectionIndex {
        title: "# Topics",
        stats: format!(
            "**{} topics** across **{}** ({} popular, {} long-tail)",
            topics.len(),
            session_count(distinct_sessions(topics.iter().flat_map(|t| &t.entries))),
            popular.len(),
            longtail.len()
        ),
        popular_heading: "## Popular Topics",
        popular: popular
            .iter()
            .map(|t| format!("- [{0}]({0}.md) ({1})", t.name, session_count(t.entries.len())))
            .collect(),
        longtail_heading: "## Long-tail Topics",
        longtail: longtail
            .iter()
            .filter_map(|t| {
                let first = t.entries.first()?;
                Some(format!("- **{}** — {}", t.name, entry_link(first)))
            })
            .collect(),
    }
    .render()
}

/// Renders `docs/topics/<topic>.md`.
#[must_use]
pub fn generate_topic_page(topic: &TopicGroup) -> String {
    grouped_page(
        &format!("# {}", topic.name),
        &format!("**{}** with this topic.", session_count(topic.entries.len())),
        &topic.entries,
    )
}

/// Renders `docs/files/index.md`.
#[must_use]
pub fn generate_key_files_index(files: &[KeyFileGroup]) -> String {
    let (popular, longtail): (Vec<&KeyFileGroup>, Vec<&KeyFileGroup>) =
        files.iter().partition(|f| f.popular);

    SectionIndex {
        title: "# Key Files",
        stats: format!(
            "**{} files** across **{}** ({} popular, {} long-tail)",
            files.len(),
            session_count(distinct_sessions(files.iter().flat_map(|f| &f.entries))),
            popular.len(),
            longtail.len()
        ),
        popular_heading: "## Frequently Touched",
        popular: popular
            .iter()
            .map(|f| {
                format!(
                    "- [`{}`]({}.md) ({})",
                    f.path,
                    key_file_slug(&f.path),
                    session_count(f.entries.len())
                )
            })
            .collect(),
        longtail_heading: "## Single Session",
        longtail: longtail
            .iter()
            .filter_map(|f| {
                let first = f.entries.first()?;
                Some(format!("- `{}` — {}", f.path, entry_link(first)))
            })
            .collect(),
    }
    .render()
}

/// Renders `docs/files/<slug>.md`.
#[must_use]
pub fn generate_key_file_page(file: &KeyFileGroup) -> String {
    grouped_page(
        &format!("# `{}`", file.path),
        &format!("**{}** touching this file.", session_count(file.entries.len())),
        &file.entries,
    )
}

/// Renders `docs/types/index.md`. Every type has a page.
#[must_use]
pub fn generate_types_index(types: &[TypeGroup]) -> String {
    let total: usize = types.iter().map(|t| t.entries.len()).sum();

    let mut out = String::new();
    let _ = writeln!(out, "# Session Types\n");
    let _ = writeln!(out, "**{} types** across **{}**\n", types.len(), session_count(total));
    for t in types {
        let _ = writeln!(out, "- [{0}]({0}.md) ({1})", t.name, session_count(t.entries.len()));
    }
    out.push('\n');
    out
}

/// Renders `docs/types/<type>.md`.
#[must_use]
pub fn generate_type_page(group: &TypeGroup) -> String {
    grouped_page(
        &format!("# {}", group.name),
        &format!("**{}** of type *{}*.", session_count(group.entries.len()), group.name),
        &group.entries,
    )
}

fn toml_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn nav_title(title: &str) -> String {
    let title = if title.chars().count() > MAX_NAV_TITLE_LEN {
        let cut: String = title.chars().take(MAX_NAV_TITLE_LEN).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    };
    toml_escape(&title)
}

/// Which section indexes exist, for navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SiteSections {
    /// `topics/index.md` was written.
    pub topics: bool,
    /// `files/index.md` was written.
    pub files: bool,
    /// `types/index.md` was written.
    pub types: bool,
}

/// Renders `zensical.toml`.
///
/// Navigation lists Home, the non-empty sections, and up to
/// [`MAX_RECENT_SESSIONS`] recent regular entries.
#[must_use]
pub fn generate_zensical_toml(
    site_name: &str,
    entries: &[JournalEntry],
    sections: SiteSections,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[project]");
    let _ = writeln!(out, "site_name = \"{}\"", toml_escape(site_name));
    let _ = writeln!(out, "site_description = \"AI session history and notes\"");
    let _ = writeln!(out, "extra_css = [\"stylesheets/extra.css\"]\n");

    let _ = writeln!(out, "nav = [");
    let _ = writeln!(out, "  {{ \"Home\" = \"{INDEX_FILE}\" }},");
    for (present, label, dir) in [
        (sections.topics, "Topics", DIR_TOPICS),
        (sections.files, "Files", DIR_FILES),
        (sections.types, "Types", DIR_TYPES),
    ] {
        if present {
            let _ = writeln!(out, "  {{ \"{label}\" = \"{dir}/{INDEX_FILE}\" }},");
        }
    }

    let _ = writeln!(out, "  {{ \"Recent Sessions\" = [");
    for entry in entries
        .iter()
        .filter(|e| e.is_regular())
        .take(MAX_RECENT_SESSIONS)
    {
        let _ = writeln!(
            out,
            "    {{ \"{}\" = \"{}\" }},",
            nav_title(&entry.title),
            toml_escape(&entry.filename)
        );
    }
    let _ = writeln!(out, "  ]}}");
    let _ = writeln!(out, "]\n");

    out.push_str(THEME);
    out
}

/// Renders the site `README.md`.
#[must_use]
pub fn generate_site_readme(journal_dir: &Path) -> String {
    format!(
        "# Session Journal\n\n\
         Generated from `{}`. Do not edit by hand: regenerate with\n\
         `ctx-journal site`.\n\n\
         ## Usage\n\n\
         ```sh\n\
         zensical serve   # preview locally\n\
         zensical build   # write static HTML to site/\n\
         ```\n",
        journal_dir.display()
    )
}

/// Inserts a link back to the source file after the frontmatter, or at the
/// top when there is none.
///
/// ```text
/// *Source: [.context/journal/<file>](file:///abs/path/<file>)*
/// ```
#[must_use]
pub fn inject_source_link(content: &str, source: &Path) -> String {
    let abs = std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf());
    let base = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let link = format!(
        "*Source: [{JOURNAL_REL_DIR}/{base}](file://{})*\n\n",
        abs.display()
    );

    match FrontmatterParser::split(content) {
        Some(block) => format!("{}\n{link}{}", &content[..block.end], block.body),
        None => format!("{link}{content}"),
    }
}

/// Adds the entry summary as a blockquote below the first H1, or after the
/// frontmatter when the document has no H1.
#[must_use]
pub fn inject_summary(content: &str, summary: &str) -> String {
    let quote = format!("> {summary}");
    let (head, body) = FrontmatterParser::split(content)
        .map_or(("", content), |block| (&content[..block.end], block.body));

    let mut lines: Vec<&str> = body.split('\n').collect();
    match lines.iter().position(|l| l.starts_with("# ")) {
        Some(idx) => {
            lines.insert(idx + 1, "");
            lines.insert(idx + 2, &quote);
            format!("{head}{}", lines.join("\n"))
        },
        None => format!("{head}{quote}\n\n{body}"),
    }
}

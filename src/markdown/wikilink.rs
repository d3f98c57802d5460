//! Markdown link to Obsidian wikilink conversion.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{EXT_MARKDOWN, JournalEntry};

/// `[display](target)`
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap_or_else(|_| unreachable!()));

/// Link targets that point outside the vault.
const EXTERNAL_SCHEMES: [&str; 3] = ["http://", "https://", "file://"];

/// Rewrites internal Markdown links as wikilinks.
///
/// External links keep their Markdown form. Internal targets are reduced to
/// their base name without `.md`.
///
/// # Examples
///
/// ```rust
/// use ctx_journal::markdown::convert_markdown_links;
///
/// assert_eq!(
///     convert_markdown_links("[Session Title](2026-01-23-slug.md)"),
///     "[[2026-01-23-slug|Session Title]]"
/// );
/// assert_eq!(
///     convert_markdown_links("[Docs](https://example.com)"),
///     "[Docs](https://example.com)"
/// );
/// ```
#[must_use]
pub fn convert_markdown_links(content: &str) -> String {
    MARKDOWN_LINK
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let (Some(display), Some(target)) = (caps.get(1), caps.get(2)) else {
                return whole.to_string();
            };
            let target = target.as_str();

            if EXTERNAL_SCHEMES.iter().any(|s| target.starts_with(s)) {
                return whole.to_string();
            }

            format_wikilink(link_basename(target), display.as_str())
        })
        .into_owned()
}

fn link_basename(target: &str) -> &str {
    let base = target
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(target);
    base.strip_suffix(EXT_MARKDOWN).unwrap_or(base)
}

/// Formats `[[target]]`, or `[[target|display]]` when the two differ.
#[must_use]
pub fn format_wikilink(target: &str, display: &str) -> String {
    if target == display {
        format!("[[{target}]]")
    } else {
        format!("[[{target}|{display}]]")
    }
}

/// Formats a list item linking an entry, with its type and outcome.
///
/// ```text
/// - [[2026-01-21-fix|Fix cache]] — `bugfix` · `completed`
/// ```
#[must_use]
pub fn format_wikilink_entry(entry: &JournalEntry) -> String {
    let meta: Vec<String> = [&entry.entry_type, &entry.outcome]
        .into_iter()
        .filter(|v| !v.is_empty())
        .map(|v| format!("`{v}`"))
        .collect();

    let suffix = if meta.is_empty() {
        String::new()
    } else {
        format!(" — {}", meta.join(" · "))
    };

    format!("- {}{suffix}", format_wikilink(entry.stem(), &entry.title))
}

//! Typed frontmatter structures.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml_ng::Value;

/// Frontmatter block written by the session exporter and enrichment step.
///
/// Every field is optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Frontmatter {
    /// Session title.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Session date.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Session start time.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Project name.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Session identifier.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Session type (feature, bugfix, ...).
    #[serde(
        rename = "type",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_type: Option<String>,
    /// Outcome (completed, partial, ...).
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Topics.
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    /// Technologies mentioned.
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    /// Key files touched.
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    pub key_files: Vec<String>,
    /// One-line summary.
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Renders a YAML scalar as text; `null`, mappings and sequences yield `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accepts any scalar (exporters write numeric session ids unquoted).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Accepts a sequence of scalars, a single scalar, or `null`.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Sequence(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

/// Frontmatter shape written into Obsidian vault entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VaultFrontmatter {
    /// Note title.
    pub title: String,
    /// Session date.
    pub date: String,
    /// Session type.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub entry_type: String,
    /// Outcome.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub outcome: String,
    /// Obsidian tags, taken from topics.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Technologies mentioned.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    /// Key files touched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_files: Vec<String>,
    /// Alternative note names (the title).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Path back to the canonical journal file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_file: String,
}

impl VaultFrontmatter {
    /// Builds the vault frontmatter from a parsed journal frontmatter.
    #[must_use]
    pub fn from_journal(fm: Frontmatter, source_file: &str) -> Self {
        let title = fm.title.unwrap_or_default();
        let aliases = if title.is_empty() {
            Vec::new()
        } else {
            vec![title.clone()]
        };

        Self {
            title,
            date: fm.date.unwrap_or_default(),
            entry_type: fm.entry_type.unwrap_or_default(),
            outcome: fm.outcome.unwrap_or_default(),
            tags: fm.topics,
            technologies: fm.technologies,
            key_files: fm.key_files,
            aliases,
            source_file: source_file.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_frontmatter_from_journal() {
        let fm = Frontmatter {
            title: Some("Fix cache".to_string()),
            date: Some("2026-01-21".to_string()),
            topics: vec!["caching".to_string()],
            entry_type: Some("bugfix".to_string()),
            ..Frontmatter::default()
        };

        let vfm = VaultFrontmatter::from_journal(fm, ".context/journal/a.md");
        assert_eq!(vfm.tags, vec!["caching"]);
        assert_eq!(vfm.aliases, vec!["Fix cache"]);
        assert_eq!(vfm.source_file, ".context/journal/a.md");
        assert_eq!(vfm.entry_type, "bugfix");
    }

    #[test]
    fn test_vault_frontmatter_without_title_has_no_alias() {
        let vfm = VaultFrontmatter::from_journal(Frontmatter::default(), "");
        assert!(vfm.aliases.is_empty());
        assert!(vfm.source_file.is_empty());
    }
}

//! Passes that remove noise from transcripts.

use serde::Deserialize;

use crate::markdown::patterns::{FenceLine, SEPARATOR, TurnHeader};

const TAG_REMINDER_OPEN: &str = "<system-reminder>";
const TAG_REMINDER_CLOSE: &str = "</system-reminder>";
const LABEL_BOLD_REMINDER: &str = "**System Reminder**";
const TAG_SUMMARY_OPEN: &str = "<summary>";
const TAG_SUMMARY_CLOSE: &str = "</summary>";
const COMPACTION_BOILERPLATE: &str = "If you need specific details from before compaction";

/// Which kind of injected block the scanner is currently skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skipping {
    /// `<system-reminder>` until `</system-reminder>`.
    TagReminder,
    /// `**System Reminder**` paragraph until a blank line.
    BoldReminder,
    /// Standalone `<summary>` until `</summary>`.
    CompactionSummary,
    /// Compaction continuation prompt until a blank line.
    CompactionPrompt,
}

impl Skipping {
    fn starts_at(trimmed: &str) -> Option<Self> {
        if trimmed == TAG_REMINDER_OPEN {
            Some(Self::TagReminder)
        } else if trimmed.starts_with(LABEL_BOLD_REMINDER) {
            Some(Self::BoldReminder)
        } else if trimmed == TAG_SUMMARY_OPEN {
            Some(Self::CompactionSummary)
        } else if trimmed.starts_with(COMPACTION_BOILERPLATE) {
            Some(Self::CompactionPrompt)
        } else {
            None
        }
    }

    fn ends_at(self, trimmed: &str) -> bool {
        match self {
            Self::TagReminder => trimmed == TAG_REMINDER_CLOSE,
            Self::CompactionSummary => trimmed == TAG_SUMMARY_CLOSE,
            Self::BoldReminder | Self::CompactionPrompt => trimmed.is_empty(),
        }
    }
}

/// Removes system reminders and compaction summaries.
///
/// An unclosed tag block swallows the rest of the document; paragraph-style
/// blocks stop at the next blank line, which is dropped with them.
#[must_use]
pub fn strip_system_reminders(content: &str) -> String {
    let mut out = Vec::new();
    let mut skipping: Option<Skipping> = None;

    for line in content.split('\n') {
        let trimmed = line.trim();

        if let Some(block) = skipping {
            if block.ends_at(trimmed) {
                skipping = None;
            }
            continue;
        }

        if let Some(block) = Skipping::starts_at(trimmed) {
            skipping = Some(block);
            continue;
        }

        out.push(line);
    }

    out.join("\n")
}

#[derive(Debug, Deserialize)]
struct TextItem {
    #[serde(default)]
    text: String,
}

/// Unwraps tool outputs that are raw `[{"type":"text","text":...}]` payloads.
///
/// Bodies that do not parse are left exactly as they were.
#[must_use]
pub fn clean_tool_output_json(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let is_tool_output = TurnHeader::parse(lines[i]).is_some_and(|h| h.is_tool_output());
        out.push(lines[i].to_string());
        i += 1;
        if !is_tool_output {
            continue;
        }

        let body_start = i;
        while i < lines.len() && !TurnHeader::matches(lines[i]) {
            i += 1;
        }
        let body = &lines[body_start..i];

        match parse_text_items(body) {
            Some(items) => {
                out.push(String::new());
                out.extend(items.into_iter().map(|item| item.text));
                out.push(String::new());
            },
            None => out.extend(body.iter().map(|l| (*l).to_string())),
        }
    }

    out.join("\n")
}

fn parse_text_items(body: &[&str]) -> Option<Vec<TextItem>> {
    let joined = body
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .collect::<Vec<_>>()
        .join(" ");

    if !joined.starts_with("[{") {
        return None;
    }

    match serde_json::from_str::<Vec<TextItem>>(&joined) {
        Ok(items) if !items.is_empty() => Some(items),
        Ok(_) => None,
        Err(e) => {
            tracing::trace!(error = %e, "tool output looks like JSON but does not parse");
            None
        },
    }
}

/// Removes fence marker lines outside frontmatter, keeping their content.
///
/// Files whose fences were already verified are returned unchanged.
#[must_use]
pub fn strip_fences(content: &str, fences_verified: bool) -> String {
    if fences_verified {
        return content.to_string();
    }

    let mut out = Vec::new();
    let mut in_frontmatter = false;

    for (i, line) in content.split('\n').enumerate() {
        if i == 0 && line.trim() == SEPARATOR {
            in_frontmatter = true;
            out.push(line);
            continue;
        }
        if in_frontmatter {
            out.push(line);
            if line.trim() == SEPARATOR {
                in_frontmatter = false;
            }
            continue;
        }
        if FenceLine::matches(line) {
            continue;
        }
        out.push(line);
    }

    out.join("\n")
}

/// [`strip_fences`] for files without a verified marker.
#[must_use]
pub fn strip_unverified_fences(content: &str) -> String {
    strip_fences(content, false)
}

//! Turn-level passes: consolidating repeated tool runs and merging
//! consecutive turns of the same role.

use crate::markdown::patterns::{FenceLine, FenceTracker, TurnHeader};

/// Minimum run length that gets collapsed.
pub const MIN_CONSOLIDATION_RUN: usize = 3;

/// One `### N. Role (HH:MM:SS)` header and the lines up to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn<'a> {
    /// The header line as written.
    pub line: &'a str,
    /// Parsed header.
    pub header: TurnHeader,
    /// Lines between this header and the next.
    pub body: Vec<&'a str>,
}

impl Turn<'_> {
    /// Trimmed body text used to compare turns.
    #[must_use]
    pub fn signature(&self) -> String {
        self.body.join("\n").trim().to_string()
    }
}

/// A document split into the lines before the first turn and the turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript<'a> {
    /// Frontmatter, title and anything else before the first header.
    pub preamble: Vec<&'a str>,
    /// Turns in document order.
    pub turns: Vec<Turn<'a>>,
}

impl<'a> Transcript<'a> {
    /// Splits content at turn headers. Header-like lines inside fenced
    /// blocks are body text.
    #[must_use]
    pub fn parse(content: &'a str) -> Self {
        let mut transcript = Self::default();
        let mut fences = FenceTracker::default();

        for line in content.split('\n') {
            if !fences.is_open()
                && let Some(header) = TurnHeader::parse(line)
            {
                transcript.turns.push(Turn {
                    line,
                    header,
                    body: Vec::new(),
                });
                continue;
            }
            fences.observe(line);

            match transcript.turns.last_mut() {
                Some(turn) => turn.body.push(line),
                None => transcript.preamble.push(line),
            }
        }

        transcript
    }
}

/// Collapses runs of identical consecutive turns into one with a `(×N)` marker.
///
/// A run is [`MIN_CONSOLIDATION_RUN`] or more adjacent turns sharing a role
/// and a non-empty trimmed body.
#[must_use]
pub fn consolidate_tool_runs(content: &str) -> String {
    let transcript = Transcript::parse(content);
    let mut out: Vec<String> = transcript
        .preamble
        .iter()
        .map(|l| (*l).to_string())
        .collect();

    let turns = &transcript.turns;
    let mut i = 0;
    while i < turns.len() {
        let first = &turns[i];
        let signature = first.signature();

        let mut run = 1;
        if !signature.is_empty() {
            while i + run < turns.len()
                && turns[i + run].header.role == first.header.role
                && turns[i + run].signature() == signature
            {
                run += 1;
            }
        }

        out.push(first.line.to_string());
        if run >= MIN_CONSOLIDATION_RUN {
            tracing::trace!(role = %first.header.role, run, "consolidating repeated turns");
            out.extend(mark_repeated(&first.body, run));
            i += run;
        } else {
            out.extend(first.body.iter().map(|l| (*l).to_string()));
            i += 1;
        }
    }

    out.join("\n")
}

/// Appends ` (×count)` to the last line that is neither blank nor a fence.
fn mark_repeated(body: &[&str], count: usize) -> Vec<String> {
    let marker = format!("(×{count})");
    let mut lines: Vec<String> = body.iter().map(|l| (*l).to_string()).collect();

    let target = lines
        .iter()
        .rposition(|l| !l.trim().is_empty() && !FenceLine::matches(l));

    match target {
        Some(idx) => {
            let line = &mut lines[idx];
            line.truncate(line.trim_end().len());
            line.push(' ');
            line.push_str(&marker);
        },
        None => {
            let insert_at = lines
                .iter()
                .rposition(|l| !l.trim().is_empty())
                .map_or(0, |idx| idx + 1);
            lines.insert(insert_at, marker);
        },
    }

    lines
}

/// Drops repeated headers when adjacent turns share a role.
///
/// The dropped header takes one directly following blank line with it; the
/// body stays in place under the earlier header.
#[must_use]
pub fn merge_consecutive_turns(content: &str) -> String {
    let transcript = Transcript::parse(content);
    let mut out: Vec<&str> = transcript.preamble.clone();
    let mut previous_role: Option<&str> = None;

    for turn in &transcript.turns {
        let role = turn.header.role.as_str();
        let mut body = turn.body.as_slice();

        if previous_role == Some(role) {
            if body.first().is_some_and(|l| l.trim().is_empty()) {
                body = &body[1..];
            }
        } else {
            out.push(turn.line);
        }

        out.extend_from_slice(body);
        previous_role = Some(role);
    }

    out.join("\n")
}

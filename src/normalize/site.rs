//! Read-only passes that prepare an entry for the static site.
//!
//! These run on the published copy only. The source file is never touched.

use crate::markdown::patterns::{
    self, FenceLine, FenceTracker, LineClassifier, LineKind, PRE_CODE_CLOSE, PRE_CODE_OPEN,
    SEPARATOR, TurnHeader,
};

/// H1 headings longer than this are cut back to a word boundary.
pub const MAX_TITLE_LEN: usize = 75;

const MULTIPART_LABEL: &str = "**Part ";
const H1_PREFIX: &str = "# ";
const MIN_FENCE_LEN: usize = 3;

/// Sorted, de-duplicated turn numbers found in the document.
#[must_use]
pub fn collect_turn_numbers(lines: &[&str]) -> Vec<u32> {
    let mut numbers: Vec<u32> = lines
        .iter()
        .filter_map(|l| TurnHeader::parse(l))
        .map(|h| h.number)
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Smallest number in `sorted` strictly greater than `n`.
#[must_use]
pub fn next_in_sequence(sorted: &[u32], n: u32) -> Option<u32> {
    let idx = sorted.partition_point(|&x| x <= n);
    sorted.get(idx).copied()
}

/// Splits a trailing multi-part navigation footer off a body.
///
/// The footer starts at the last `---` line and must contain a `**Part `
/// line. Blank lines before the separator are dropped.
#[must_use]
pub fn split_trailing_footer<'a, 'b>(body: &'b [&'a str]) -> (&'b [&'a str], &'b [&'a str]) {
    let Some(sep) = body.iter().rposition(|l| l.trim() == SEPARATOR) else {
        return (body, &[]);
    };
    if !body[sep + 1..]
        .iter()
        .any(|l| l.trim().starts_with(MULTIPART_LABEL))
    {
        return (body, &[]);
    }

    let mut cut = sep;
    while cut > 0 && body[cut - 1].trim().is_empty() {
        cut -= 1;
    }
    (&body[..cut], &body[sep..])
}

/// Removes legacy `<details>`, `<summary>` and `<pre>` wrapper lines.
///
/// Content that sat inside `<pre>` was HTML-escaped by the exporter and is
/// unescaped here.
#[must_use]
pub fn strip_pre_wrapper(body: &[&str]) -> Vec<String> {
    let mut had_pre = false;
    let mut inner = Vec::with_capacity(body.len());

    for line in body {
        let trimmed = line.trim();
        if trimmed == "<details>" || trimmed == "</details>" {
            continue;
        }
        if trimmed == "<pre>" || trimmed == "</pre>" {
            had_pre = true;
            continue;
        }
        if trimmed.starts_with("<summary>") && trimmed.ends_with("</summary>") {
            continue;
        }
        inner.push((*line).to_string());
    }

    if had_pre {
        inner.iter_mut().for_each(|l| *l = unescape_html(l));
    }
    inner
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&#34;")
        .replace('\'', "&#39;")
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Drops a fence pair that encloses the whole body, returning the inner
/// lines and the opening fence's info string.
fn unwrap_outer_fence<S: AsRef<str>>(lines: &[S]) -> (&[S], &str) {
    let Some(last) = lines.len().checked_sub(1) else {
        return (lines, "");
    };
    let Some(open) = lines.first().and_then(|l| FenceLine::parse(l.as_ref())) else {
        return (lines, "");
    };
    if last == 0 {
        return (lines, "");
    }

    let mut fences = FenceTracker::default();
    for (i, line) in lines.iter().enumerate() {
        fences.observe(line.as_ref());
        if !fences.is_open() {
            return if i == last {
                (&lines[1..last], open.info.trim())
            } else {
                (lines, "")
            };
        }
    }
    (lines, "")
}

/// Longest backtick fence inside `lines`, plus one, at least three.
fn fence_for<S: AsRef<str>>(lines: &[S]) -> String {
    let longest = lines
        .iter()
        .filter_map(|l| FenceLine::parse(l.as_ref()))
        .filter(|f| f.marker == '`')
        .map(|f| f.len + 1)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(MIN_FENCE_LEN))
}

/// End of the turn whose header sits just before `start`.
///
/// The turn ends at the last header numbered with the next number in the
/// document's sequence whose time is not earlier than the turn's own.
/// Headers quoted from other sessions are skipped that way.
fn turn_boundary(lines: &[&str], sequence: &[u32], start: usize, header: &TurnHeader) -> usize {
    let expected = next_in_sequence(sequence, header.number);
    (start..lines.len())
        .rev()
        .find(|&j| {
            TurnHeader::parse(lines[j])
                .is_some_and(|h| Some(h.number) == expected && h.time >= header.time)
        })
        .unwrap_or(lines.len())
}

fn trim_blank_edges<S: AsRef<str>>(lines: &[S]) -> &[S] {
    let start = lines
        .iter()
        .position(|l| !l.as_ref().trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.as_ref().trim().is_empty())
        .map_or(start, |i| i + 1);
    &lines[start..end.max(start)]
}

/// Re-encloses each Tool Output body in one fresh fence.
///
/// A fully fenced body keeps its language tag. Boilerplate outputs are
/// dropped together with their header.
#[must_use]
pub fn wrap_tool_outputs(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let sequence = collect_turn_numbers(&lines);
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let header = match TurnHeader::parse(lines[i]) {
            Some(h) if h.is_tool_output() => h,
            _ => {
                out.push(lines[i].to_string());
                i += 1;
                continue;
            },
        };

        let header_line = lines[i];
        i += 1;

        let boundary = turn_boundary(&lines, &sequence, i, &header);
        let mut body = &lines[i..boundary];
        let mut footer: &[&str] = &[];
        if boundary == lines.len() {
            (body, footer) = split_trailing_footer(body);
        }
        i = boundary;

        let raw = strip_pre_wrapper(body);
        if patterns::is_boilerplate_tool_output(&raw) {
            tracing::trace!(turn = header.number, "dropping boilerplate tool output");
            continue;
        }

        let (inner, info) = unwrap_outer_fence(trim_blank_edges(&raw));
        let inner = trim_blank_edges(inner);
        let fence = fence_for(inner);

        out.push(header_line.to_string());
        out.push(String::new());
        out.push(format!("{fence}{info}"));
        out.extend(inner.iter().cloned());
        out.push(fence);
        out.push(String::new());
        out.extend(footer.iter().map(|l| (*l).to_string()));
    }

    out.join("\n")
}

/// Encloses each User turn body in `<pre><code>` with HTML-escaped text.
///
/// Pasted headings, rules, lists and stray fences then render as typed.
/// Headers inside fenced blocks are left alone. A body that is already one
/// such block is re-escaped from its plain text, so the pass is stable.
#[must_use]
pub fn wrap_user_turns(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let sequence = collect_turn_numbers(&lines);
    let mut fences = FenceTracker::default();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let header = match TurnHeader::parse(lines[i]) {
            Some(h) if h.is_user() && !fences.is_open() => h,
            _ => {
                fences.observe(lines[i]);
                out.push(lines[i].to_string());
                i += 1;
                continue;
            },
        };

        out.push(lines[i].to_string());
        i += 1;

        let boundary = turn_boundary(&lines, &sequence, i, &header);
        let mut body = &lines[i..boundary];
        let mut footer: &[&str] = &[];
        if boundary == lines.len() {
            (body, footer) = split_trailing_footer(body);
        }
        i = boundary;

        let text = trim_blank_edges(body);
        if text.is_empty() {
            out.extend(body.iter().map(|l| (*l).to_string()));
        } else {
            out.push(String::new());
            out.push(PRE_CODE_OPEN.to_string());
            out.extend(unwrap_pre_code(text).iter().map(|l| escape_html(l)));
            out.push(PRE_CODE_CLOSE.to_string());
            out.push(String::new());
        }
        out.extend(footer.iter().map(|l| (*l).to_string()));
    }

    out.join("\n")
}

/// Plain text of a body, unescaping it when it is a single `<pre><code>` block.
fn unwrap_pre_code(text: &[&str]) -> Vec<String> {
    if let [first, inner @ .., last] = text
        && first.trim() == PRE_CODE_OPEN
        && last.trim() == PRE_CODE_CLOSE
        && !inner.iter().any(|l| l.trim() == PRE_CODE_CLOSE)
    {
        return inner.iter().map(|l| unescape_html(l)).collect();
    }
    text.iter().map(|l| (*l).to_string()).collect()
}

/// Cleans headings, list spacing and characters the site renderer misreads.
///
/// Frontmatter and fenced blocks are left alone.
#[must_use]
pub fn sanitize_lines(content: &str) -> String {
    let mut classifier = LineClassifier::new();
    let mut out: Vec<String> = Vec::new();

    for line in content.split('\n') {
        if classifier.classify(line) != LineKind::Prose {
            out.push(line.to_string());
            continue;
        }

        let mut line = match line.strip_prefix(H1_PREFIX) {
            Some(heading) => format!("{H1_PREFIX}{}", truncate_title(heading)),
            None => line.to_string(),
        };

        if let Some(heading) = patterns::markdown_heading(&line)
            && heading.level > 1
            && !TurnHeader::matches(&line)
        {
            line = format!("**{}**", heading.text);
        }

        if patterns::is_list_start(&line) && out.last().is_some_and(|l| !l.trim().is_empty()) {
            out.push(String::new());
        }

        line = patterns::unbold_tool_calls(&line);
        if !line.starts_with("    ") {
            line = patterns::escape_glob_stars(&line);
        }
        line = patterns::encode_inline_code_angles(&line);

        out.push(line);
    }

    out.join("\n")
}

fn truncate_title(heading: &str) -> String {
    let heading = patterns::strip_claude_tags(heading).trim().to_string();
    if heading.chars().count() <= MAX_TITLE_LEN {
        return heading;
    }

    let truncated: String = heading.chars().take(MAX_TITLE_LEN).collect();
    match truncated.rfind(' ') {
        Some(idx) if idx > 0 => truncated[..idx].to_string(),
        _ => truncated,
    }
}

//! Named pattern matchers for transcript Markdown.
//!
//! Each matcher wraps one detection rule so the line-scanning passes in
//! [`crate::normalize`] can stay readable and the rules can be tested alone.

use regex::Regex;
use std::sync::LazyLock;

/// Creates a compile-time verified regex wrapped in [`LazyLock`].
///
/// The patterns are literals; the `unreachable!()` branch only satisfies the
/// type checker.
macro_rules! lazy_regex {
    ($pattern:expr) => {
        LazyLock::new(|| Regex::new($pattern).unwrap_or_else(|_| unreachable!()))
    };
}

/// Frontmatter and horizontal-rule separator.
pub const SEPARATOR: &str = "---";

/// Role label of tool result turns.
pub const ROLE_TOOL_OUTPUT: &str = "Tool Output";

/// Role label of user turns.
pub const ROLE_USER: &str = "User";

/// Role label of assistant turns.
pub const ROLE_ASSISTANT: &str = "Assistant";

/// Opens an escaped preformatted block.
pub const PRE_CODE_OPEN: &str = "<pre><code>";

/// Closes an escaped preformatted block.
pub const PRE_CODE_CLOSE: &str = "</code></pre>";

const PRE_OPEN: &str = "<pre>";
const PRE_CLOSE: &str = "</pre>";

/// `### 12. Assistant (14:03:22)`
static TURN_HEADER: LazyLock<Regex> =
    lazy_regex!(r"^### (\d+)\. (.+?) \((\d{2}:\d{2}:\d{2})\)$");

/// A line made of 3+ backticks or tildes, optionally followed by an info string.
static FENCE_LINE: LazyLock<Regex> = lazy_regex!(r"^\s*(`{3,}|~{3,})(.*)$");

/// ATX heading; group 1 is the hashes, group 2 the text.
static MARKDOWN_HEADING: LazyLock<Regex> = lazy_regex!(r"^(#{1,6})\s+(.+)$");

/// Bullet or ordered list item.
static LIST_START: LazyLock<Regex> = lazy_regex!(r"^\s*(?:[-*+]|\d+[.)])\s");

/// Hyphenated pseudo-XML tags injected by the assistant runtime
/// (`<command-message>`, `<local-command-stdout>`, ...).
static CLAUDE_TAG: LazyLock<Regex> = lazy_regex!(r"</?[a-zA-Z]+(?:-[a-zA-Z]+)+>");

/// `🔧 **Read**` tool-call markers.
static TOOL_BOLD: LazyLock<Regex> = lazy_regex!(r"🔧\s*\*\*(.+?)\*\*");

/// Glob-like asterisks (`*.go`, `*/`, `*)`). Escaped ones are filtered by
/// [`escape_glob_stars`] since the engine has no lookbehind.
static GLOB_STAR: LazyLock<Regex> = lazy_regex!(r"\*(?:\.\w+|[/)])");

/// Inline code spans containing angle brackets.
static INLINE_CODE_ANGLE: LazyLock<Regex> = lazy_regex!(r"`([^`]*[<>][^`]*)`");

/// A parsed turn header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnHeader {
    /// Sequence number.
    pub number: u32,
    /// Role label (`User`, `Assistant`, `Tool Output`, ...).
    pub role: String,
    /// `HH:MM:SS` timestamp.
    pub time: String,
}

impl TurnHeader {
    /// Parses a turn header; the line is trimmed first.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = TURN_HEADER.captures(line.trim())?;
        let number = caps.get(1)?.as_str().parse().ok()?;
        Some(Self {
            number,
            role: caps.get(2)?.as_str().to_string(),
            time: caps.get(3)?.as_str().to_string(),
        })
    }

    /// Returns true if the line is a turn header.
    #[must_use]
    pub fn matches(line: &str) -> bool {
        TURN_HEADER.is_match(line.trim())
    }

    /// Returns true for `Tool Output` turns.
    #[must_use]
    pub fn is_tool_output(&self) -> bool {
        self.role == ROLE_TOOL_OUTPUT
    }

    /// Returns true for `User` turns.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == ROLE_USER
    }
}

/// A parsed fence marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceLine<'a> {
    /// Fence character, backtick or tilde.
    pub marker: char,
    /// Number of marker characters.
    pub len: usize,
    /// Text after the marker run.
    pub info: &'a str,
}

impl<'a> FenceLine<'a> {
    /// Parses a fence marker line.
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = FENCE_LINE.captures(line)?;
        let run = caps.get(1)?.as_str();
        Some(Self {
            marker: run.chars().next()?,
            len: run.len(),
            info: caps.get(2).map_or("", |m| m.as_str()),
        })
    }

    /// Returns true if the line is a fence marker.
    #[must_use]
    pub fn matches(line: &str) -> bool {
        FENCE_LINE.is_match(line)
    }

    fn closes(&self, marker: char, len: usize) -> bool {
        self.marker == marker && self.len >= len && self.info.trim().is_empty()
    }
}

/// Tracks whether the current line sits inside a fenced code block.
#[derive(Debug, Default, Clone, Copy)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feeds one line. Returns true if the line is a fence marker or fenced content.
    pub fn observe(&mut self, line: &str) -> bool {
        let fence = FenceLine::parse(line);
        match (self.open, fence) {
            (None, Some(f)) => {
                self.open = Some((f.marker, f.len));
                true
            },
            (None, None) => false,
            (Some((marker, len)), Some(f)) if f.closes(marker, len) => {
                self.open = None;
                true
            },
            (Some(_), _) => true,
        }
    }

    /// Returns true while a fence is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// Classification of a line for passes that only touch prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Inside the leading frontmatter block, delimiters included.
    Frontmatter,
    /// A fence marker or a line inside a fenced block.
    Fenced,
    /// A `<pre>` block line, tags included. The content is HTML-escaped.
    Preformatted,
    /// Anything else.
    Prose,
}

/// Classifies lines in document order.
#[derive(Debug, Default)]
pub struct LineClassifier {
    seen_first: bool,
    in_frontmatter: bool,
    in_pre: bool,
    fences: FenceTracker,
}

impl LineClassifier {
    /// Creates a classifier positioned at the first line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies the next line.
    pub fn classify(&mut self, line: &str) -> LineKind {
        let first = !self.seen_first;
        self.seen_first = true;

        if first && line.trim() == SEPARATOR {
            self.in_frontmatter = true;
            return LineKind::Frontmatter;
        }
        if self.in_frontmatter {
            if line.trim() == SEPARATOR {
                self.in_frontmatter = false;
            }
            return LineKind::Frontmatter;
        }
        if !self.fences.is_open() {
            let trimmed = line.trim();
            if self.in_pre {
                self.in_pre = trimmed != PRE_CODE_CLOSE && trimmed != PRE_CLOSE;
                return LineKind::Preformatted;
            }
            if trimmed == PRE_CODE_OPEN || trimmed == PRE_OPEN {
                self.in_pre = true;
                return LineKind::Preformatted;
            }
        }
        if self.fences.observe(line) {
            LineKind::Fenced
        } else {
            LineKind::Prose
        }
    }
}

/// A heading split into level and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Number of `#` characters.
    pub level: usize,
    /// Heading text.
    pub text: &'a str,
}

/// Parses an ATX heading.
#[must_use]
pub fn markdown_heading(line: &str) -> Option<Heading<'_>> {
    let caps = MARKDOWN_HEADING.captures(line)?;
    Some(Heading {
        level: caps.get(1)?.as_str().len(),
        text: caps.get(2)?.as_str(),
    })
}

/// Returns true if the line starts a list item.
#[must_use]
pub fn is_list_start(line: &str) -> bool {
    LIST_START.is_match(line)
}

/// Removes assistant-runtime pseudo tags.
#[must_use]
pub fn strip_claude_tags(text: &str) -> String {
    CLAUDE_TAG.replace_all(text, "").into_owned()
}

/// Rewrites `🔧 **Tool**` as `🔧 Tool`.
#[must_use]
pub fn unbold_tool_calls(line: &str) -> String {
    TOOL_BOLD.replace_all(line, "🔧 $1").into_owned()
}

/// Escapes glob-like asterisks so they are not read as emphasis.
#[must_use]
pub fn escape_glob_stars(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 4);
    let mut last = 0;
    for m in GLOB_STAR.find_iter(line) {
        let star = m.start();
        if star > 0 && line.as_bytes()[star - 1] == b'\\' {
            continue;
        }
        out.push_str(&line[last..star]);
        out.push('\\');
        last = star;
    }
    out.push_str(&line[last..]);
    out
}

/// Replaces inline code spans holding `<`/`>` with quoted, entity-encoded text.
#[must_use]
pub fn encode_inline_code_angles(line: &str) -> String {
    INLINE_CODE_ANGLE
        .replace_all(line, |caps: &regex::Captures<'_>| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            format!("\"{}\"", encode_angles(inner))
        })
        .into_owned()
}

/// HTML-entity encodes `<` and `>`.
#[must_use]
pub fn encode_angles(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Reports whether a tool output body carries no information worth publishing.
///
/// Matches empty bodies, "No matches found", plain "file updated" confirmations
/// and hook denials.
#[must_use]
pub fn is_boilerplate_tool_output<S: AsRef<str>>(body: &[S]) -> bool {
    let joined = body
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    joined.is_empty()
        || joined == "No matches found"
        || (joined.starts_with("The file ")
            && joined.ends_with("has been updated successfully."))
        || joined.contains("denied this tool")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_turn_header_parse() {
        let header = TurnHeader::parse("### 12. Tool Output (14:03:22)").unwrap();
        assert_eq!(header.number, 12);
        assert_eq!(header.role, "Tool Output");
        assert_eq!(header.time, "14:03:22");
        assert!(header.is_tool_output());
    }

    #[test]
    fn test_turn_header_trims() {
        assert!(TurnHeader::matches("  ### 1. User (04:00:00)  "));
    }

    #[test_case("## 12. Assistant (14:03:22)" ; "wrong level")]
    #[test_case("### 12 Assistant (14:03:22)" ; "missing dot")]
    #[test_case("### 12. Assistant (14:03)" ; "short time")]
    #[test_case("### Summary" ; "plain heading")]
    fn test_turn_header_rejects(line: &str) {
        assert!(TurnHeader::parse(line).is_none());
    }

    #[test]
    fn test_fence_line_parse() {
        let fence = FenceLine::parse("````rust").unwrap();
        assert_eq!(fence.marker, '`');
        assert_eq!(fence.len, 4);
        assert_eq!(fence.info, "rust");

        assert!(FenceLine::matches("  ~~~"));
        assert!(!FenceLine::matches("``inline``"));
    }

    #[test]
    fn test_fence_tracker_nested_longer_fence() {
        let mut tracker = FenceTracker::default();
        assert!(tracker.observe("````"));
        assert!(tracker.observe("```"), "shorter fence is content");
        assert!(tracker.is_open());
        assert!(tracker.observe("````"));
        assert!(!tracker.is_open());
        assert!(!tracker.observe("prose"));
    }

    #[test]
    fn test_fence_tracker_info_string_does_not_close() {
        let mut tracker = FenceTracker::default();
        tracker.observe("```");
        tracker.observe("```go");
        assert!(tracker.is_open());
    }

    #[test]
    fn test_line_classifier() {
        let mut c = LineClassifier::new();
        assert_eq!(c.classify("---"), LineKind::Frontmatter);
        assert_eq!(c.classify("title: x"), LineKind::Frontmatter);
        assert_eq!(c.classify("---"), LineKind::Frontmatter);
        assert_eq!(c.classify("text"), LineKind::Prose);
        assert_eq!(c.classify("```"), LineKind::Fenced);
        assert_eq!(c.classify("code"), LineKind::Fenced);
        assert_eq!(c.classify("```"), LineKind::Fenced);
        assert_eq!(c.classify("---"), LineKind::Prose);
        assert_eq!(c.classify("<pre><code>"), LineKind::Preformatted);
        assert_eq!(c.classify("```"), LineKind::Preformatted);
        assert_eq!(c.classify("## pasted"), LineKind::Preformatted);
        assert_eq!(c.classify("</code></pre>"), LineKind::Preformatted);
        assert_eq!(c.classify("## Plan"), LineKind::Prose);
    }

    #[test]
    fn test_markdown_heading() {
        let h = markdown_heading("## Plan").unwrap();
        assert_eq!(h.level, 2);
        assert_eq!(h.text, "Plan");
        assert!(markdown_heading("#hashtag").is_none());
    }

    #[test_case("- item", true ; "dash")]
    #[test_case("  * item", true ; "indented star")]
    #[test_case("3. third", true ; "ordered")]
    #[test_case("-- not a list", false ; "double dash")]
    #[test_case("plain", false ; "prose")]
    fn test_is_list_start(line: &str, expected: bool) {
        assert_eq!(is_list_start(line), expected);
    }

    #[test]
    fn test_strip_claude_tags_keeps_plain_angles() {
        assert_eq!(
            strip_claude_tags("<command-message>run tests</command-message>"),
            "run tests"
        );
        assert_eq!(strip_claude_tags("is <failing>"), "is <failing>");
    }

    #[test]
    fn test_unbold_tool_calls() {
        assert_eq!(unbold_tool_calls("🔧 **Read**"), "🔧 Read");
    }

    #[test_case("edit *.go files", r"edit \*.go files" ; "extension")]
    #[test_case("src/*/mod.rs", r"src/\*/mod.rs" ; "directory")]
    #[test_case(r"already \*.go", r"already \*.go" ; "escaped")]
    #[test_case("*emphasis*", "*emphasis*" ; "emphasis")]
    #[test_case("src/**/*.rs", r"src/*\*/\*.rs" ; "recursive glob")]
    #[test_case("(*)*.go", r"(\*)\*.go" ; "adjacent matches")]
    fn test_escape_glob_stars(input: &str, expected: &str) {
        assert_eq!(escape_glob_stars(input), expected);
    }

    #[test]
    fn test_encode_inline_code_angles() {
        assert_eq!(
            encode_inline_code_angles("use `Vec<u8>` here and `plain`"),
            "use \"Vec&lt;u8&gt;\" here and `plain`"
        );
    }

    #[test_case(&[""], true ; "empty")]
    #[test_case(&["", "No matches found", ""], true ; "no matches")]
    #[test_case(&["The file /a/b.go has been updated successfully."], true ; "updated")]
    #[test_case(&["Hook PreToolUse denied this tool"], true ; "denied")]
    #[test_case(&["No matches found", "but more"], false ; "extra content")]
    #[test_case(&["fn main() {}"], false ; "real output")]
    fn test_is_boilerplate(body: &[&str], expected: bool) {
        assert_eq!(is_boilerplate_tool_output(body), expected);
    }
}

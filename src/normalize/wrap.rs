//! Soft line wrapping for prose.

use crate::markdown::patterns::{LineClassifier, LineKind, TurnHeader, markdown_heading};

/// Target width for wrapped prose lines, in characters.
pub const LINE_WRAP_WIDTH: usize = 80;

/// Wraps one line at word boundaries.
///
/// Continuation lines repeat the original leading indentation. Turn headers,
/// headings, table rows and lines with no usable break point come back as a
/// single unchanged line.
#[must_use]
pub fn soft_wrap(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width || !is_wrappable(line) {
        return vec![line.to_string()];
    }

    let text = line.trim_start();
    let indent = &line[..line.len() - text.len()];
    let indent_width = indent.chars().count();

    let mut wrapped = Vec::new();
    let mut current = String::from(indent);
    let mut current_width = indent_width;

    for word in text.split_whitespace() {
        let word_width = word.chars().count();
        let has_word = current_width > indent_width;

        if has_word && current_width + 1 + word_width > width {
            wrapped.push(std::mem::replace(&mut current, String::from(indent)));
            current_width = indent_width;
        }
        if current_width > indent_width {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }
    wrapped.push(current);

    if wrapped.len() < 2 {
        return vec![line.to_string()];
    }
    wrapped
}

fn is_wrappable(line: &str) -> bool {
    let trimmed = line.trim();
    !(TurnHeader::matches(line) || markdown_heading(trimmed).is_some() || trimmed.starts_with('|'))
}

/// Wraps every prose line longer than [`LINE_WRAP_WIDTH`].
///
/// Frontmatter and fenced blocks pass through untouched.
#[must_use]
pub fn soft_wrap_content(content: &str) -> String {
    let mut classifier = LineClassifier::new();
    let mut out = Vec::new();

    for line in content.split('\n') {
        match classifier.classify(line) {
            LineKind::Prose => out.extend(soft_wrap(line, LINE_WRAP_WIDTH)),
            LineKind::Frontmatter | LineKind::Fenced | LineKind::Preformatted => {
                out.push(line.to_string());
            },
        }
    }

    out.join("\n")
}

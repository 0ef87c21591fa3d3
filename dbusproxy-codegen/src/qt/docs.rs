//! Documentation comment formatting.

use dbusproxy_schema::{Docstring, Documented};

/// Column limit for reflowed comment lines, prefix included.
pub const MAX_WIDTH: usize = 80;

/// Narrowest text column used when the prefix is very deep.
const MIN_TEXT_WIDTH: usize = 20;

/// Formats the documentation of a node as comment lines.
///
/// Every line starts with `indent` and ends with a newline. Paragraphs are
/// separated by a line holding the right-trimmed indent. Nodes without
/// documentation produce an empty string.
#[must_use]
pub fn format_docstring<D: Documented + ?Sized>(node: &D, indent: &str) -> String {
    node.docstring()
        .map(|doc| format_text(doc, indent))
        .unwrap_or_default()
}

/// Formats a docstring as comment lines.
#[must_use]
pub fn format_text(doc: &Docstring, indent: &str) -> String {
    let width = MAX_WIDTH
        .saturating_sub(indent.chars().count())
        .max(MIN_TEXT_WIDTH);
    let mut output = String::new();

    for (i, paragraph) in doc.paragraphs().iter().enumerate() {
        if i > 0 {
            output.push_str(indent.trim_end());
            output.push('\n');
        }
        // Backslash and at-sign start Doxygen commands; a literal "*/"
        // would close the surrounding comment.
        let paragraph = paragraph
            .replace('\\', "\\\\")
            .replace('@', "\\@")
            .replace("*/", "* /");
        for line in wrap(&paragraph, width) {
            output.push_str(indent);
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

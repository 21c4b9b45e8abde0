//! Whitespace normalisation for ProXPL sources.
//!
//! The formatter does not parse. It collapses runs of blank lines, strips
//! trailing spaces and tabs, and expands tabs in leading indentation to four
//! spaces. Line endings (`\n` or `\r\n`) are left alone.

use crate::span::Span;

const INDENT: &str = "    ";

/// Replace the text covered by `span` with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub new_text: String,
}

impl Edit {
    fn delete(start: usize, end: usize) -> Self {
        Self {
            span: Span::new(start, end),
            new_text: String::new(),
        }
    }
}

/// Compute formatting edits for `text`.
///
/// Edits are sorted by position and never overlap.
pub fn format_edits(text: &str) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut previous_blank = false;
    let mut line_start = 0;

    for raw_line in text.split_inclusive('\n') {
        let line_end = line_start + raw_line.len();
        let content = raw_line.strip_suffix('\n').unwrap_or(raw_line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        let content_end = line_start + content.len();

        if content.trim().is_empty() {
            if previous_blank {
                edits.push(Edit::delete(line_start, line_end));
            } else if !content.is_empty() {
                edits.push(Edit::delete(line_start, content_end));
            }
            previous_blank = true;
        } else {
            previous_blank = false;

            let indent_len = content.len() - content.trim_start_matches([' ', '\t']).len();
            let indent = &content[..indent_len];
            if indent.contains('\t') {
                edits.push(Edit {
                    span: Span::new(line_start, line_start + indent_len),
                    new_text: indent.replace('\t', INDENT),
                });
            }

            let kept = content.trim_end_matches([' ', '\t']).len();
            if kept < content.len() {
                edits.push(Edit::delete(line_start + kept, content_end));
            }
        }

        line_start = line_end;
    }

    edits
}

/// Apply sorted, non-overlapping edits to `text`.
pub fn apply_edits(text: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&text[cursor..edit.span.start]);
        out.push_str(&edit.new_text);
        cursor = edit.span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Format `text` in one go.
pub fn format_source(text: &str) -> String {
    apply_edits(text, &format_edits(text))
}

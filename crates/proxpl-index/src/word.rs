//! Word-at-position lookups.

use crate::error::{IndexError, IndexResult};
use crate::span::Span;

/// Whether `byte` can appear in an identifier (`[A-Za-z0-9_]`).
#[inline]
pub(crate) fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Find the span of the identifier containing or touching `offset`.
///
/// A cursor sitting right after the last character of a word still resolves to
/// that word, the same way an editor caret at the end of `foo|` refers to `foo`.
pub fn word_span_at(text: &str, offset: usize) -> IndexResult<Option<Span>> {
    IndexError::check_offset(text, offset)?;

    let bytes = text.as_bytes();
    let mut start = offset;
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = offset;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }

    if start == end {
        Ok(None)
    } else {
        Ok(Some(Span::new(start, end)))
    }
}

/// Extract the identifier containing or touching `offset`.
///
/// Returns `Ok(None)` when the offset is surrounded by whitespace, punctuation
/// or non-ASCII text.
pub fn extract_word_at(text: &str, offset: usize) -> IndexResult<Option<&str>> {
    // Identifier bytes are ASCII, so both ends of a non-empty run are char boundaries.
    Ok(word_span_at(text, offset)?.and_then(|span| span.slice(text)))
}

/// The identifier characters immediately before `offset`, used as a completion prefix.
///
/// An offset inside a multi-byte character has no prefix.
pub fn prefix_before(text: &str, offset: usize) -> IndexResult<&str> {
    IndexError::check_offset(text, offset)?;
    if !text.is_char_boundary(offset) {
        return Ok("");
    }

    let bytes = text.as_bytes();
    let mut start = offset;
    while start > 0 && is_ident_byte(bytes[start - 1]) {
        start -= 1;
    }
    Ok(&text[start..offset])
}

//! Source indexing for the ProXPL language.
//!
//! Everything here is a pure function of a document's text: the same text
//! always yields the same symbols, words and edits, and nothing is retained
//! between calls. Callers that want caching layer it on top (the language
//! server memoises [`SymbolTable`]s per document revision).
//!
//! - [`extract_word_at`]: the identifier under a cursor
//! - [`build_symbol_table`]: `func` and `class` declarations
//! - [`find_definition`]: declarations for the identifier under a cursor
//! - [`suggest_completions`]: keyword and built-in vocabulary
//! - [`format_edits`]: whitespace normalisation

pub mod definition;
pub mod error;
pub mod format;
pub mod line_index;
pub mod span;
pub mod symbol;
pub mod vocabulary;
pub mod word;

pub use definition::{definitions_named, find_definition};
pub use error::{IndexError, IndexResult};
pub use format::{Edit, apply_edits, format_edits, format_source};
pub use line_index::{LineCol, LineIndex};
pub use span::Span;
pub use symbol::{Symbol, SymbolKind, SymbolTable, build_symbol_table};
pub use vocabulary::{
    BUILTINS, CompletionEntry, CompletionKind, KEYWORDS, describe, suggest_completions,
    vocabulary_kind,
};
pub use word::{extract_word_at, prefix_before, word_span_at};

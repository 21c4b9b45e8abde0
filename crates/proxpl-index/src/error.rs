//! Error types for positional queries.

use derive_more::{Display, Error};

pub type IndexResult<T> = Result<T, IndexError>;

/// A contract violation by the caller.
///
/// Finding nothing is never an error; lookups report absence as `None` or an
/// empty result.
#[derive(Display, Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[display("offset {offset} is outside the document (length {len})")]
    InvalidOffset { offset: usize, len: usize },
}

impl IndexError {
    /// Check that `offset` addresses a position inside `text` (end inclusive).
    pub(crate) fn check_offset(text: &str, offset: usize) -> IndexResult<()> {
        if offset > text.len() {
            return Err(IndexError::InvalidOffset {
                offset,
                len: text.len(),
            });
        }
        Ok(())
    }
}

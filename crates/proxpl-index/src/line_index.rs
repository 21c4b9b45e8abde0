//! Line index for reporting byte offsets as editor positions.
//!
//! Editors address text by 0-based (line, character) pairs where characters
//! are counted in UTF-16 code units, while the indexer works on byte offsets.

/// 0-based line and UTF-16 column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineCol {
    pub line: u32,
    pub character: u32,
}

/// Line start positions of a source text.
pub struct LineIndex<'a> {
    /// Byte offset of the start of each line (0-indexed).
    line_starts: Vec<usize>,
    source: &'a str,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            source,
        }
    }

    /// Convert a byte offset to (line, character), clamping to the text.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let character: u32 = self.source[line_start..offset]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();
        LineCol {
            line: line as u32,
            character,
        }
    }
}

//! Source location tracking.

use std::fmt;
use serde::{Deserialize, Serialize};

/// A 1-based line/column position in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Byte offset of this position in `source`, clamped to the text length.
    pub fn offset_in(&self, source: &str) -> usize {
        let mut offset = 0;
        for (index, line) in source.split_inclusive('\n').enumerate() {
            if index + 1 == self.line {
                let column_bytes: usize = line
                    .chars()
                    .take(self.column.saturating_sub(1))
                    .map(char::len_utf8)
                    .sum();
                return offset + column_bytes;
            }
            offset += line.len();
        }
        source.len()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte offsets at which each line of `text` starts.
pub fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::with_capacity(64);
    starts.push(0);
    for (i, b) in text.as_bytes().iter().enumerate() {
        if *b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

/// Converts a byte offset in `text` into a position using precomputed line
/// starts. Columns count characters, like JPE positions.
pub fn position_at(text: &str, offset: usize, starts: &[usize]) -> Position {
    let offset = offset.min(text.len());
    let line = starts.partition_point(|&s| s <= offset).max(1);
    let start = starts[line - 1];
    let column = match text.get(start..offset) {
        Some(prefix) => prefix.chars().count(),
        None => offset - start,
    };
    Position::new(line, column + 1)
}

//! Source positions
//!
//! Tokens carry `(row, col)` positions: rows are 1-indexed, columns are
//! 0-indexed and counted in characters. `SourceMap` converts byte offsets
//! produced by the logos lexer into those positions and hands out the
//! physical line text each token is attached to.

use serde::{Deserialize, Serialize};

/// A position in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    /// Line number (1-indexed)
    pub row: usize,
    /// Column (0-indexed, in characters)
    pub col: usize,
}

impl Pos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The position `n` columns to the right on the same row
    pub fn shifted(self, n: usize) -> Self {
        Self {
            row: self.row,
            col: self.col + n,
        }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// Helper struct to track line and column positions while lexing
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    source: &'a str,
    /// Line start offsets (byte positions where each line starts)
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    /// Create a new source map from source code
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
        Self {
            source,
            line_starts,
        }
    }

    /// Index into `line_starts` of the line containing `offset`
    fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        }
    }

    /// Get the position of a byte offset
    pub fn pos(&self, offset: usize) -> Pos {
        let line = self.line_index(offset);
        let line_start = self.line_starts[line];
        let col = self.source[line_start..offset].chars().count();
        Pos::new(line + 1, col)
    }

    /// Byte offset where the line containing `offset` starts
    pub fn line_start(&self, offset: usize) -> usize {
        self.line_starts[self.line_index(offset)]
    }

    /// Text of the physical lines `first..=last` (1-indexed), newlines included
    pub fn lines(&self, first: usize, last: usize) -> &'a str {
        let Some(&start) = self.line_starts.get(first.saturating_sub(1)) else {
            return "";
        };
        let end = self
            .line_starts
            .get(last)
            .copied()
            .unwrap_or(self.source.len());
        &self.source[start..end.max(start)]
    }

    /// Row that follows the last line of the source, where EOF tokens live
    pub fn eof_row(&self) -> usize {
        if self.source.is_empty() || self.source.ends_with('\n') {
            self.line_starts.len()
        } else {
            self.line_starts.len() + 1
        }
    }
}

//! Lexing and rewriting error types

use crate::span::Pos;
use thiserror::Error;

/// Lexer error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Unterminated triple-quoted string
    #[error("unterminated triple-quoted string starting at {pos}")]
    UnterminatedString { pos: Pos },

    /// Dedent that matches no enclosing indentation level
    #[error("unindent does not match any outer indentation level at {pos}")]
    InconsistentDedent { pos: Pos },

    /// End of input inside brackets
    #[error("EOF in multi-line statement, bracket opened at {pos}")]
    UnclosedBracket { pos: Pos },

    /// Inline quote without its closing `|]`
    #[error("quasiquote '{name}' opened at {pos} is never closed with '|]'")]
    UnterminatedQuote { name: String, pos: Pos },

    /// Input bytes are not UTF-8
    #[error("source is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

impl LexError {
    /// Get the position of the error
    pub fn pos(&self) -> Option<Pos> {
        match self {
            LexError::UnterminatedString { pos } => Some(*pos),
            LexError::InconsistentDedent { pos } => Some(*pos),
            LexError::UnclosedBracket { pos } => Some(*pos),
            LexError::UnterminatedQuote { pos, .. } => Some(*pos),
            LexError::InvalidUtf8 { .. } => None,
        }
    }

    /// Format error with source context
    ///
    /// Returns a string showing the source line with an error marker.
    pub fn format_with_context(&self, source: &str) -> String {
        let Some(pos) = self.pos() else {
            return String::new();
        };

        let Some(line) = source.lines().nth(pos.row.saturating_sub(1)) else {
            return String::new();
        };

        let gutter = " ".repeat(pos.row.to_string().len());
        format!(
            "  {} | {}\n  {} | {}^",
            pos.row,
            line,
            gutter,
            " ".repeat(pos.col)
        )
    }
}

/// Result type for lexing operations
pub type LexResult<T> = Result<T, LexError>;

//! Source regeneration from positioned tokens
//!
//! Tokens are laid out at their recorded positions. Indentation comes from
//! `Indent` tokens, column gaps become spaces, and row gaps become blank
//! lines after a line break or backslash continuations inside a logical
//! line. Rewritten code therefore keeps the row numbers of everything that
//! follows it.

use crate::token::{Token, TokenKind};

const OPERATOR_CHARS: &str = "=<>!*/+-%&|^@:.~";

/// Whether `prev` followed directly by `next` would lex differently
fn needs_space(prev: &Token, next: &Token) -> bool {
    if prev.kind.is_wordlike() && next.kind.is_wordlike() {
        return true;
    }
    let last = prev.text.chars().last();
    let first = next.text.chars().next();
    matches!(
        (last, first),
        (Some(a), Some(b)) if OPERATOR_CHARS.contains(a) && OPERATOR_CHARS.contains(b)
    )
}

/// Regenerate source text from a token sequence
pub fn untokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut row = 1;
    let mut col = 0;
    let mut indents: Vec<&str> = Vec::new();
    let mut prev: Option<&Token> = None;

    for token in tokens {
        match token.kind {
            TokenKind::EndMarker => break,
            TokenKind::Indent => {
                indents.push(&token.text);
                continue;
            }
            TokenKind::Dedent => {
                indents.pop();
                continue;
            }
            _ => {}
        }

        let line_ended = prev.map_or(true, |t| t.kind.is_line_break());
        // A line break closes the current line wherever it was recorded
        if token.start.row > row && !token.kind.is_line_break() {
            let gap = if line_ended { "\n" } else { "\\\n" };
            for _ in row..token.start.row {
                out.push_str(gap);
            }
            row = token.start.row;
            col = 0;
        }

        if col == 0 && line_ended && !token.kind.is_line_break() {
            if let Some(indent) = indents.last() {
                if token.start.col >= indent.chars().count() {
                    out.push_str(indent);
                    col = indent.chars().count();
                }
            }
        }

        if token.start.row == row && token.start.col > col {
            out.extend(std::iter::repeat(' ').take(token.start.col - col));
            col = token.start.col;
        } else if let Some(prev) = prev.filter(|_| token.start.row == row && token.start.col < col) {
            // Rewritten text ran past this token's column: keep the gap it
            // had from its predecessor instead
            let gap = if prev.end.row == token.start.row {
                token.start.col.saturating_sub(prev.end.col)
            } else {
                0
            };
            let gap = if gap == 0 && needs_space(prev, token) { 1 } else { gap };
            out.extend(std::iter::repeat(' ').take(gap));
            col += gap;
        }

        out.push_str(&token.text);
        for c in token.text.chars() {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        prev = Some(token);
    }
    out
}

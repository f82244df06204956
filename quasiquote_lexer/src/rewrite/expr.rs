//! Inline form: `[$name| body |]`

use super::{
    is_sigil, quote_call, unseen_lines, Rewriter, PIPE, QUOTE_EXPR_METHOD, RIGHT_BRACKET,
};
use crate::error::{LexError, LexResult};
use crate::span::Pos;
use crate::token::{Token, TokenKind};

/// Byte offset of the `n`th character of `s` (or its length)
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

impl<I: Iterator<Item = Token>> Rewriter<I> {
    /// Try to rewrite an inline quote opened by `[`.
    pub(super) fn try_inline(&mut self, open: &Token) -> LexResult<Option<Vec<Token>>> {
        let (name, body_start) = match self.stream.peek(3) {
            [sigil, name, pipe]
                if is_sigil(sigil) && name.kind == TokenKind::Name && PIPE.matches(pipe) =>
            {
                (name.clone(), pipe.end)
            }
            _ => return Ok(None),
        };
        self.stream.consume_peeked(3);

        let (body, close_end) = self.collect_inline(&name, body_start)?;
        let mut call = quote_call(&name, QUOTE_EXPR_METHOD, open.start, &body);
        // The call stands in for the source up to the closing bracket, so
        // whatever followed the bracket keeps its spacing
        if let Some(paren) = call.last_mut() {
            paren.end = close_end;
        }
        Ok(Some(call))
    }

    /// Collect the text between the opening `|` (ending at `body_start`)
    /// and the closing `|]`, consuming the closing bracket.
    ///
    /// The first line is left-padded so its text keeps the column it had
    /// relative to the quoter name. Also returns where the closing bracket
    /// ends.
    fn collect_inline(&mut self, name: &Token, body_start: Pos) -> LexResult<(String, Pos)> {
        // (row, physical line)
        let mut lines: Vec<(usize, String)> = Vec::new();
        let mut prev_row = body_start.row - 1;
        let mut last_pipe: Option<Pos> = None;

        let (body_end, close_end) = loop {
            let Some(token) = self.stream.next() else {
                return Err(LexError::UnterminatedQuote {
                    name: name.text.clone(),
                    pos: name.start,
                });
            };
            if let Some(pipe) = last_pipe {
                if RIGHT_BRACKET.matches(&token) {
                    break (pipe, token.end);
                }
            }

            lines.extend(
                unseen_lines(&token, prev_row).map(|(row, line)| (row, line.to_string())),
            );
            prev_row = prev_row.max(token.end.row);
            last_pipe = PIPE.matches(&token).then_some(token.start);
        };

        let mut body = " ".repeat(name.end.col + 1);
        for (row, line) in &lines {
            let mut text = line.as_str();
            if *row == body_end.row {
                text = &text[..char_offset(text, body_end.col)];
            }
            if *row == body_start.row {
                text = &text[char_offset(text, body_start.col)..];
            }
            body.push_str(text);
        }
        Ok((body, close_end))
    }
}

//! Block form: `with $name:` followed by an indented body

use super::{
    is_sigil, is_space_error, quote_call, unseen_lines, Rewriter, COLON, QUOTE_STMT_METHOD,
};
use crate::span::Pos;
use crate::token::{Token, TokenKind};

impl<I: Iterator<Item = Token>> Rewriter<I> {
    /// Try to rewrite a block quote opened by `with`.
    ///
    /// Returns `None`, with the stream untouched, when the tokens after
    /// `with` do not form a block quote header.
    pub(super) fn try_block(&mut self, with: &Token) -> Option<Vec<Token>> {
        let header = |sigil: &Token, name: &Token, colon: &Token, newline: &Token, indent: &Token| {
            is_sigil(sigil)
                && name.kind == TokenKind::Name
                && COLON.matches(colon)
                && newline.kind == TokenKind::Newline
                && indent.kind == TokenKind::Indent
        };

        let (name, window) = match self.stream.peek(6) {
            [space, sigil, name, colon, newline, indent]
                if is_space_error(space) && header(sigil, name, colon, newline, indent) =>
            {
                (name.clone(), 6)
            }
            [sigil, name, colon, newline, indent, ..]
                if header(sigil, name, colon, newline, indent) =>
            {
                (name.clone(), 5)
            }
            _ => return None,
        };
        self.stream.consume_peeked(window);

        let body = self.collect_block(name.start.row);
        let mut call = quote_call(&name, QUOTE_STMT_METHOD, with.start, &body);

        // Terminate the statement, then a blank line so the call keeps
        // its own row
        let close = call.last().map_or(with.start, |t| t.end);
        call.push(Token::synthesized(TokenKind::Newline, "\n", close));
        call.push(Token::synthesized(
            TokenKind::Nl,
            "\n",
            Pos::new(with.start.row + 1, 0),
        ));
        Some(call)
    }

    /// Collect the physical lines of an indented body.
    ///
    /// The `Indent` opening the body has already been consumed; the scan
    /// stops after the `Dedent` that closes it.
    fn collect_block(&mut self, mut prev_row: usize) -> String {
        let mut depth = 1usize;
        let mut lines = String::new();
        for token in self.stream.lookahead_iter() {
            match token.kind {
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                break;
            }
            // A dedent carries the line of the statement that follows it
            if token.kind == TokenKind::Dedent {
                continue;
            }
            for (_, line) in unseen_lines(&token, prev_row) {
                lines.push_str(line);
            }
            prev_row = prev_row.max(token.end.row);
        }
        lines
    }
}

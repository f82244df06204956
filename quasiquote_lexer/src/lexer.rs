//! Lexer for host-language source code
//!
//! Wraps the logos-generated lexer with the layout bookkeeping an
//! indentation-sensitive language needs: logical vs. non-logical newlines,
//! an indentation stack producing `Indent`/`Dedent`, bracket depth, and the
//! end-of-input epilogue.

use std::collections::VecDeque;

use logos::Logos;

use crate::error::{LexError, LexResult};
use crate::span::{Pos, SourceMap};
use crate::token::{opens_triple_quote, RawToken, Token, TokenKind};

/// Width of a run of leading whitespace, with tabs advancing to the next
/// multiple of eight.
fn indent_width(ws: &str) -> usize {
    ws.chars().fold(0, |width, c| match c {
        '\t' => (width / 8 + 1) * 8,
        '\x0c' => 0,
        _ => width + 1,
    })
}

/// Host-language lexer
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, RawToken>,
    source_map: SourceMap<'a>,
    /// Offset from original source (used after restarting lexer)
    offset: usize,
    /// Tokens produced but not yet handed out
    pending: VecDeque<Token>,
    /// Indentation widths of the enclosing blocks, outermost first
    indents: Vec<usize>,
    /// Positions of the currently open brackets
    brackets: Vec<Pos>,
    /// Next significant token starts a logical line
    at_line_start: bool,
    /// Current logical line has produced a significant token
    line_has_content: bool,
    finished: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("offset", &self.offset)
            .field("indents", &self.indents)
            .field("brackets", &self.brackets)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: RawToken::lexer(source),
            source_map: SourceMap::new(source),
            offset: 0,
            pending: VecDeque::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            line_has_content: false,
            finished: false,
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get the source map
    pub fn source_map(&self) -> &SourceMap<'a> {
        &self.source_map
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<LexResult<Token>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }

            let step = match self.inner.next() {
                None => self.finish(),
                Some(result) => {
                    let span = self.inner.span();
                    let start = self.offset + span.start;
                    let end = self.offset + span.end;
                    match result {
                        Ok(raw) => self.push_raw(raw, start, end),
                        Err(()) => self.push_error(start, end),
                    }
                }
            };

            if let Err(e) = step {
                self.finished = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        let start_pos = self.source_map.pos(start);
        let end_pos = self.source_map.pos(end);
        Token::new(
            kind,
            &self.source[start..end],
            start_pos,
            end_pos,
            self.source_map.lines(start_pos.row, end_pos.row),
        )
    }

    fn push_raw(&mut self, raw: RawToken, start: usize, end: usize) -> LexResult<()> {
        match raw {
            RawToken::Newline => {
                let logical = self.brackets.is_empty() && self.line_has_content;
                let kind = if logical {
                    TokenKind::Newline
                } else {
                    TokenKind::Nl
                };
                // Line breaks end on the row they terminate
                let text = &self.source[start..end];
                let pos = self.source_map.pos(start);
                self.pending.push_back(Token::new(
                    kind,
                    text,
                    pos,
                    pos.shifted(text.chars().count()),
                    self.source_map.lines(pos.row, pos.row),
                ));
                if self.brackets.is_empty() {
                    self.at_line_start = true;
                    self.line_has_content = false;
                }
            }
            // Joins physical lines; produces no token
            RawToken::LineContinuation => {}
            RawToken::Comment => {
                self.pending
                    .push_back(self.make_token(TokenKind::Comment, start, end));
            }
            _ => {
                self.begin_significant(start)?;
                let token = self.make_token(raw.kind(), start, end);
                match raw.bracket_delta() {
                    1 => self.brackets.push(token.start),
                    -1 => {
                        self.brackets.pop();
                    }
                    _ => {}
                }
                self.pending.push_back(token);
            }
        }
        Ok(())
    }

    /// Handle input logos could not match.
    ///
    /// An unterminated triple-quoted string is fatal; anything else becomes
    /// a one-character `ErrorToken` and lexing resumes right after it.
    fn push_error(&mut self, start: usize, end: usize) -> LexResult<()> {
        let rest = &self.source[start..];
        if opens_triple_quote(rest) {
            return Err(LexError::UnterminatedString {
                pos: self.source_map.pos(start),
            });
        }

        let Some(c) = rest.chars().next() else {
            return Ok(());
        };
        let char_end = start + c.len_utf8();
        self.begin_significant(start)?;
        let token = self.make_token(TokenKind::ErrorToken, start, char_end);
        self.pending.push_back(token);
        if char_end != end {
            self.restart_from(char_end);
        }
        Ok(())
    }

    /// Bookkeeping before a significant token at `start`: indentation
    /// processing when it opens a logical line.
    fn begin_significant(&mut self, start: usize) -> LexResult<()> {
        if self.at_line_start && self.brackets.is_empty() {
            self.at_line_start = false;
            self.track_indentation(start)?;
        }
        self.line_has_content = true;
        Ok(())
    }

    fn track_indentation(&mut self, start: usize) -> LexResult<()> {
        let line_start = self.source_map.line_start(start);
        let ws = &self.source[line_start..start];
        let width = indent_width(ws);
        let pos = self.source_map.pos(start);
        let line = self.source_map.lines(pos.row, pos.row);
        let top = self.indents.last().copied().unwrap_or(0);

        if width > top {
            self.indents.push(width);
            self.pending.push_back(Token::new(
                TokenKind::Indent,
                ws,
                Pos::new(pos.row, 0),
                pos,
                line,
            ));
            return Ok(());
        }

        while self.indents.last().copied().unwrap_or(0) > width {
            self.indents.pop();
            self.pending
                .push_back(Token::new(TokenKind::Dedent, "", pos, pos, line));
        }
        if self.indents.last().copied().unwrap_or(0) != width {
            return Err(LexError::InconsistentDedent { pos });
        }
        Ok(())
    }

    /// End of input: close the last logical line, unwind the indentation
    /// stack and emit the end marker.
    fn finish(&mut self) -> LexResult<()> {
        self.finished = true;
        if let Some(&pos) = self.brackets.last() {
            return Err(LexError::UnclosedBracket { pos });
        }

        let eof = self.source.len();
        if self.line_has_content {
            let pos = self.source_map.pos(eof);
            let line = self.source_map.lines(pos.row, pos.row);
            self.pending
                .push_back(Token::new(TokenKind::Newline, "", pos, pos, line));
        }

        let end = Pos::new(self.source_map.eof_row(), 0);
        while self.indents.len() > 1 {
            self.indents.pop();
            self.pending
                .push_back(Token::new(TokenKind::Dedent, "", end, end, ""));
        }
        self.pending
            .push_back(Token::new(TokenKind::EndMarker, "", end, end, ""));
        Ok(())
    }

    /// Restart the lexer from a new position.
    /// Uses bump() to advance within the current logos lexer when possible.
    fn restart_from(&mut self, pos: usize) {
        let logos_abs_pos = self.offset + self.inner.span().end;
        if pos > logos_abs_pos && pos <= self.source.len() {
            self.inner.bump(pos - logos_abs_pos);
        } else if pos < self.source.len() {
            self.inner = RawToken::lexer(&self.source[pos..]);
            self.offset = pos;
        } else {
            self.inner = RawToken::lexer("");
            self.offset = pos;
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize source code, stopping at the first error
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).collect()
}

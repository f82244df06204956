//! Token definitions for the host-language lexer
//!
//! `RawToken` is the logos-generated lexical class of a slice of source.
//! The lexer turns those classes into positioned `Token`s, adding the
//! layout tokens (`Newline`, `Nl`, `Indent`, `Dedent`, `EndMarker`) that an
//! indentation-sensitive host needs.


use logos::Logos;
use serde::{Deserialize, Serialize};

use crate::span::Pos;

/// Raw lexical classes
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f]+")] // Skip whitespace (but not newlines)
pub enum RawToken {
    // ==================== Delimiters ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // ==================== Operators ====================
    #[token(",")]
    #[token(":")]
    #[token(";")]
    #[token(".")]
    #[token("...")]
    #[token("->")]
    #[token(":=")]
    #[token("=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("//")]
    #[token("%")]
    #[token("**")]
    #[token("@")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token("<<")]
    #[token(">>")]
    #[token("<")]
    #[token(">")]
    #[token("<=")]
    #[token(">=")]
    #[token("==")]
    #[token("!=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("//=")]
    #[token("%=")]
    #[token("**=")]
    #[token("@=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    Operator,

    // ==================== Layout ====================
    #[regex(r"\r?\n")]
    Newline,
    /// Backslash at the end of a physical line joins it with the next one
    #[regex(r"\\\r?\n")]
    LineContinuation,

    // ==================== Comments ====================
    #[regex(r"#[^\r\n]*")]
    Comment,

    // ==================== Literals ====================
    #[regex(r"0[bB](_?[01])+")]
    #[regex(r"0[oO](_?[0-7])+")]
    #[regex(r"0[xX](_?[0-9a-fA-F])+")]
    #[regex(r"[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?[jJ]?")]
    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?[jJ]?")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?[jJ]?")]
    Number,

    #[regex(r#"[rRbBuUfF]{0,2}'([^'\\\r\n]|\\(.|\n))*'"#)]
    #[regex(r#"[rRbBuUfF]{0,2}"([^"\\\r\n]|\\(.|\n))*""#)]
    String,

    /// Triple-quoted strings may span lines; the callback scans to the close
    #[regex(r#"[rRbBuUfF]{0,2}'''"#, triple_quoted)]
    #[regex(r#"[rRbBuUfF]{0,2}""""#, triple_quoted)]
    TripleString,

    // ==================== Identifiers ====================
    #[regex(r"[_\p{XID_Start}][_\p{XID_Continue}]*")]
    Name,
}

/// Extend a triple-quoted string token through its closing delimiter.
fn triple_quoted(lex: &mut logos::Lexer<RawToken>) -> bool {
    let quote = lex.slice().as_bytes()[lex.slice().len() - 1];
    match scan_triple_quoted(lex.remainder().as_bytes(), quote) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Find the end of a triple-quoted string body.
/// Uses memchr to jump between escapes and quote characters.
///
/// Returns the number of bytes up to and including the closing delimiter.
pub(crate) fn scan_triple_quoted(bytes: &[u8], quote: u8) -> Option<usize> {
    let closing = [quote; 3];
    let mut pos = 0;
    while pos < bytes.len() {
        pos += memchr::memchr2(b'\\', quote, &bytes[pos..])?;
        if bytes[pos] == b'\\' {
            pos += 2;
            continue;
        }
        if bytes[pos..].starts_with(&closing) {
            return Some(pos + 3);
        }
        pos += 1;
    }
    None
}

/// Check whether `text` opens a triple-quoted string (prefix included)
pub(crate) fn opens_triple_quote(text: &str) -> bool {
    let body = text.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    text.len() - body.len() <= 2 && (body.starts_with("'''") || body.starts_with("\"\"\""))
}

impl RawToken {
    /// The token kind this raw class is reported as
    pub fn kind(self) -> TokenKind {
        match self {
            RawToken::LParen
            | RawToken::RParen
            | RawToken::LBracket
            | RawToken::RBracket
            | RawToken::LBrace
            | RawToken::RBrace
            | RawToken::Operator => TokenKind::Op,
            RawToken::Newline | RawToken::LineContinuation => TokenKind::Newline,
            RawToken::Comment => TokenKind::Comment,
            RawToken::Number => TokenKind::Number,
            RawToken::String | RawToken::TripleString => TokenKind::String,
            RawToken::Name => TokenKind::Name,
        }
    }

    /// Change in bracket depth caused by this token
    pub fn bracket_delta(self) -> isize {
        match self {
            RawToken::LParen | RawToken::LBracket | RawToken::LBrace => 1,
            RawToken::RParen | RawToken::RBracket | RawToken::RBrace => -1,
            _ => 0,
        }
    }
}

/// Kind of a positioned token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Op,
    Comment,
    /// End of a logical line
    Newline,
    /// Non-logical line break: blank line, comment-only line, or inside brackets
    Nl,
    Indent,
    Dedent,
    /// A character the host grammar does not recognize
    ErrorToken,
    EndMarker,
}

impl TokenKind {
    /// Whether the token ends a physical line
    pub fn is_line_break(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Nl)
    }

    /// Whether adjacent tokens of these kinds need a separating space
    pub fn is_wordlike(self) -> bool {
        matches!(self, TokenKind::Name | TokenKind::Number | TokenKind::String)
    }
}

/// A token with its position and the physical line(s) it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Pos,
    pub end: Pos,
    /// Physical source line(s) spanned by the token, newlines included
    pub line: String,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        start: Pos,
        end: Pos,
        line: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
            line: line.into(),
        }
    }

    /// A token that did not come from the source. Its end position is
    /// derived from the text, assuming the text is a single line.
    pub fn synthesized(kind: TokenKind, text: impl Into<String>, start: Pos) -> Self {
        let text = text.into();
        let end = start.shifted(text.chars().count());
        Self {
            kind,
            text,
            start,
            end,
            line: String::new(),
        }
    }

    /// The position-free view of this token
    pub fn fuzzy(&self) -> FuzzyToken<'_> {
        FuzzyToken::new(self.kind, &self.text)
    }
}

/// A token template that compares only kind and text, never position.
///
/// Used to match the live stream against fixed patterns such as the `with`
/// keyword or the `|` separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuzzyToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> FuzzyToken<'a> {
    pub const fn new(kind: TokenKind, text: &'a str) -> Self {
        Self { kind, text }
    }

    pub fn matches(&self, token: &Token) -> bool {
        self.kind == token.kind && self.text == token.text
    }
}

impl PartialEq<Token> for FuzzyToken<'_> {
    fn eq(&self, other: &Token) -> bool {
        self.matches(other)
    }
}

impl PartialEq<FuzzyToken<'_>> for Token {
    fn eq(&self, other: &FuzzyToken<'_>) -> bool {
        other.matches(self)
    }
}

//! Rewriting of quasiquote syntax into ordinary call syntax
//!
//! Two surface forms are recognised in the token stream:
//!
//! ```text
//! with $name:              [$name| body |]
//!     body
//! ```
//!
//! The block form becomes `name._quote_stmt(col, 'body')` followed by a
//! blank line, the inline form becomes `name._quote_expr(col, 'body')`.
//! `col` is the column of the `with` or `[` token. Every synthesized token
//! is positioned at the quote site, and anything that does not match a
//! form exactly is passed through untouched.

mod expr;
mod literal;
mod stmt;

#[cfg(test)]
mod tests;

pub use literal::{parse_string_literal, string_literal};

use crate::error::LexResult;
use crate::lookahead::Lookahead;
use crate::span::Pos;
use crate::token::{FuzzyToken, Token, TokenKind};

/// Method invoked by rewritten block quotes
pub const QUOTE_STMT_METHOD: &str = "_quote_stmt";
/// Method invoked by rewritten inline quotes
pub const QUOTE_EXPR_METHOD: &str = "_quote_expr";
/// Character introducing a quoter name
pub const SIGIL: &str = "$";

const WITH: FuzzyToken<'static> = FuzzyToken::new(TokenKind::Name, "with");
const COLON: FuzzyToken<'static> = FuzzyToken::new(TokenKind::Op, ":");
const LEFT_BRACKET: FuzzyToken<'static> = FuzzyToken::new(TokenKind::Op, "[");
const PIPE: FuzzyToken<'static> = FuzzyToken::new(TokenKind::Op, "|");
const RIGHT_BRACKET: FuzzyToken<'static> = FuzzyToken::new(TokenKind::Op, "]");

/// The sigil, whether the lexer reported it as an operator or as an
/// unrecognised character
fn is_sigil(token: &Token) -> bool {
    matches!(token.kind, TokenKind::ErrorToken | TokenKind::Op) && token.text == SIGIL
}

/// Stray whitespace some lexers report ahead of an unrecognised character
fn is_space_error(token: &Token) -> bool {
    token.kind == TokenKind::ErrorToken && !token.text.is_empty() && token.text.trim().is_empty()
}

/// Physical lines of `token` on rows after `prev_row`, with their rows.
///
/// A token may span several rows (a string continued with a backslash),
/// and its `line` then holds every one of them.
fn unseen_lines<'a>(
    token: &'a Token,
    prev_row: usize,
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    (token.start.row..)
        .zip(token.line.split_inclusive('\n'))
        .filter(move |(row, _)| *row > prev_row)
}

/// Rewrites quote forms in a token stream
#[derive(Debug)]
pub struct Rewriter<I: Iterator<Item = Token>> {
    stream: Lookahead<I>,
}

impl<I: Iterator<Item = Token>> Rewriter<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            stream: Lookahead::new(tokens),
        }
    }

    /// Consume the stream and return the rewritten tokens
    pub fn rewrite(mut self) -> LexResult<Vec<Token>> {
        let mut output = Vec::new();
        while let Some(token) = self.stream.next() {
            if WITH.matches(&token) {
                if let Some(call) = self.try_block(&token) {
                    output.extend(call);
                    continue;
                }
            } else if LEFT_BRACKET.matches(&token) {
                if let Some(call) = self.try_inline(&token)? {
                    output.extend(call);
                    continue;
                }
            }
            output.push(token);
        }
        Ok(output)
    }
}

/// Rewrite every quote form in `tokens`
pub fn rewrite_tokens<T>(tokens: T) -> LexResult<Vec<Token>>
where
    T: IntoIterator<Item = Token>,
{
    Rewriter::new(tokens.into_iter()).rewrite()
}

/// Tokens for `name.method(anchor.col, 'body')`, laid out left to right
/// from `anchor`
fn quote_call(name: &Token, method: &str, anchor: Pos, body: &str) -> Vec<Token> {
    // (kind, text, columns of space before the token)
    let parts = [
        (TokenKind::Name, name.text.clone(), 0),
        (TokenKind::Op, ".".to_string(), 0),
        (TokenKind::Name, method.to_string(), 0),
        (TokenKind::Op, "(".to_string(), 0),
        (TokenKind::Number, anchor.col.to_string(), 0),
        (TokenKind::Op, ",".to_string(), 0),
        (TokenKind::String, string_literal(body), 1),
        (TokenKind::Op, ")".to_string(), 0),
    ];

    let mut at = anchor;
    parts
        .into_iter()
        .map(|(kind, text, gap)| {
            let token = Token::synthesized(kind, text, at.shifted(gap));
            at = token.end;
            token
        })
        .collect()
}

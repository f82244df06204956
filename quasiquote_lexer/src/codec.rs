//! Source-decoding hook
//!
//! A host opts a file into quasiquote syntax by declaring the `quasiquotes`
//! source encoding in a coding pragma on one of its first two lines:
//!
//! ```text
//! # coding: quasiquotes
//! ```
//!
//! The functions here are pure: raw source in, rewritten source out. How
//! the host registers them with its decoding machinery is up to the host.

use crate::error::{LexError, LexResult};
use crate::lexer::tokenize;
use crate::rewrite::rewrite_tokens;
use crate::untokenize::untokenize;

/// Encoding name that opts a source file into rewriting
pub const ENCODING_NAME: &str = "quasiquotes";

/// Rewrite every quote form in `source`
pub fn transform_source(source: &str) -> LexResult<String> {
    let tokens = tokenize(source)?;
    let rewritten = rewrite_tokens(tokens)?;
    Ok(untokenize(&rewritten))
}

/// Rewrite UTF-8 encoded source bytes
pub fn transform_bytes(bytes: &[u8]) -> LexResult<Vec<u8>> {
    let source = decode_utf8(bytes)?;
    Ok(transform_source(source)?.into_bytes())
}

fn decode_utf8(bytes: &[u8]) -> LexResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| LexError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })
}

/// Encoding declared by a coding pragma, if any.
///
/// Only the first two lines are examined, and the second only when the
/// first is blank or a comment.
pub fn declared_encoding(source: &str) -> Option<&str> {
    for line in source.lines().take(2) {
        let trimmed = line.trim_start_matches([' ', '\t', '\x0c']);
        if trimmed.is_empty() {
            continue;
        }
        let comment = trimmed.strip_prefix('#')?;
        if let Some(name) = pragma_name(comment) {
            return Some(name);
        }
    }
    None
}

/// The `name` in a comment containing `coding: name` or `coding=name`
fn pragma_name(comment: &str) -> Option<&str> {
    let mut rest = comment;
    while let Some(at) = rest.find("coding") {
        rest = &rest[at + "coding".len()..];
        let Some(value) = rest.strip_prefix([':', '=']) else {
            continue;
        };
        let value = value.trim_start_matches([' ', '\t']);
        let end = value
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(value.len());
        if end > 0 {
            return Some(&value[..end]);
        }
    }
    None
}

/// Decode source bytes, rewriting them only when they declare the
/// `quasiquotes` encoding.
pub fn decode_if_declared(bytes: &[u8]) -> LexResult<String> {
    let source = decode_utf8(bytes)?;
    match declared_encoding(source) {
        Some(name) if name.eq_ignore_ascii_case(ENCODING_NAME) => transform_source(source),
        _ => Ok(source.to_string()),
    }
}

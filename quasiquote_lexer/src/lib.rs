//! quasiquote_lexer
//!
//! Tokenizer and source rewriter for quasiquote syntax embedded in an
//! indentation-sensitive host language.
//!
//! Block quotes and inline quotes are rewritten into ordinary method calls
//! on the named quoter, keeping the row of every surrounding token so host
//! tracebacks still point at the right line.
//!
//! # Example
//!
//! ```
//! use quasiquote_lexer::transform_source;
//!
//! let out = transform_source("[$qq|body|]").unwrap();
//! assert_eq!(out, "qq._quote_expr(0, '     body')");
//! ```

pub mod codec;
pub mod error;
pub mod lexer;
pub mod lookahead;
pub mod rewrite;
pub mod span;
pub mod token;
pub mod untokenize;

// Re-exports
pub use codec::{
    declared_encoding, decode_if_declared, transform_bytes, transform_source, ENCODING_NAME,
};
pub use error::{LexError, LexResult};
pub use lexer::{tokenize, Lexer};
pub use lookahead::{Exhausted, Lookahead, LookaheadIter};
pub use rewrite::{
    parse_string_literal, rewrite_tokens, string_literal, Rewriter, QUOTE_EXPR_METHOD,
    QUOTE_STMT_METHOD, SIGIL,
};
pub use span::{Pos, SourceMap};
pub use token::{FuzzyToken, RawToken, Token, TokenKind};
pub use untokenize::untokenize;

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Quote sites and the fragments found at them

use std::fmt;
use std::path::{Path, PathBuf};

use quasiquote_lexer::{
    parse_string_literal, tokenize, Lookahead, Token, TokenKind, QUOTE_EXPR_METHOD,
    QUOTE_STMT_METHOD,
};

use crate::error::QuoteResult;

/// The two quote forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuoteKind {
    /// `with $name:` block
    Stmt,
    /// `[$name|...|]` inline expression
    Expr,
}

impl QuoteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteKind::Stmt => "stmt",
            QuoteKind::Expr => "expr",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            QuoteKind::Stmt => "statements",
            QuoteKind::Expr => "expressions",
        }
    }

    /// Surface syntax of the form, for error messages
    pub fn syntax(self) -> &'static str {
        match self {
            QuoteKind::Stmt => "with $qq: ...",
            QuoteKind::Expr => "[$qq|...|]",
        }
    }

    /// Method a rewritten site calls
    pub fn method(self) -> &'static str {
        match self {
            QuoteKind::Stmt => QUOTE_STMT_METHOD,
            QuoteKind::Expr => QUOTE_EXPR_METHOD,
        }
    }

    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            QUOTE_STMT_METHOD => Some(QuoteKind::Stmt),
            QUOTE_EXPR_METHOD => Some(QuoteKind::Expr),
            _ => None,
        }
    }
}

impl fmt::Display for QuoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lexical occurrence of a quote.
///
/// Stays the same across repeated executions of the site, whatever the
/// fragment text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallSite {
    /// Source unit containing the site
    pub unit: PathBuf,
    /// Line of the rewritten call (1-indexed)
    pub line: usize,
    /// Column offset of the quote
    pub column: usize,
}

impl CallSite {
    pub fn new(unit: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            unit: unit.into(),
            line,
            column,
        }
    }

    /// File name of the unit up to its first `.`
    pub fn file_stem(&self) -> &str {
        self.unit
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.split('.').next())
            .unwrap_or("")
    }

    /// Directory containing the unit
    pub fn dir(&self) -> &Path {
        match self.unit.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.unit.display(), self.line, self.column)
    }
}

/// Fragment text together with where it was quoted and by whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub site: CallSite,
    /// Name the quoter was invoked under
    pub quoter: String,
    pub kind: QuoteKind,
}

/// Tokens in `name._quote_xxx(col, 'text')`
const CALL_WINDOW: usize = 8;

/// Find the quote calls in rewritten source.
///
/// Recognises `name._quote_stmt(col, 'text')` and
/// `name._quote_expr(col, 'text')` and reports one fragment per call, with
/// the call's line and column offset as its site.
pub fn collect_fragments(unit: &Path, rewritten: &str) -> QuoteResult<Vec<Fragment>> {
    let mut stream = Lookahead::new(tokenize(rewritten)?.into_iter());
    let mut fragments = Vec::new();

    loop {
        let window = stream.peek(CALL_WINDOW);
        if window.is_empty() {
            break;
        }
        match match_call(unit, window) {
            Some(fragment) => {
                fragments.push(fragment);
                stream.consume_peeked(CALL_WINDOW);
            }
            None => {
                if stream.advance().is_err() {
                    break;
                }
            }
        }
    }
    Ok(fragments)
}

fn match_call(unit: &Path, window: &[Token]) -> Option<Fragment> {
    let [name, dot, method, open, column, comma, literal, close] = window else {
        return None;
    };
    let op = |token: &Token, text: &str| token.kind == TokenKind::Op && token.text == text;
    if name.kind != TokenKind::Name
        || !op(dot, ".")
        || method.kind != TokenKind::Name
        || !op(open, "(")
        || column.kind != TokenKind::Number
        || !op(comma, ",")
        || literal.kind != TokenKind::String
        || !op(close, ")")
    {
        return None;
    }

    let kind = QuoteKind::from_method(&method.text)?;
    let column = column.text.parse().ok()?;
    let text = parse_string_literal(&literal.text)?;
    Some(Fragment {
        text,
        site: CallSite::new(unit, name.start.row, column),
        quoter: name.text.clone(),
        kind,
    })
}

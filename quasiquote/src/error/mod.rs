//! Error types for quoting and native code generation
//!
//! Every error that can be traced back to a quote site carries a
//! [`SourceLocation`]. Quoters that fail before they know the site build
//! the error with [`SourceLocation::unknown`] and the caller attaches the
//! site with [`QuoteError::relocated`].

mod location;

pub use location::{CompilationWarning, SourceLocation};

use std::io;
use std::path::PathBuf;

use quasiquote_lexer::LexError;
use quasiquote_runtime::RuntimeError;
use thiserror::Error;

use crate::site::{CallSite, QuoteKind};

/// Quote error type
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The quoter does not implement the requested form
    #[error("{location}: quasiquoter does not support quoted {} ({} syntax)", .kind.plural(), .kind.syntax())]
    UnsupportedQuoteKind {
        kind: QuoteKind,
        location: SourceLocation,
    },

    /// `fromfile` statement body is not a single file name
    #[error("{location}: fromfile only accepts a single filename on the first line: {line_text:?}")]
    MalformedDelegateSyntax {
        location: SourceLocation,
        /// Offending line, trimmed
        line_text: String,
    },

    /// The compiler rejected the fragment
    #[error("{location}: compilation failed\n{diagnostics}")]
    CompilationError {
        location: SourceLocation,
        /// Raw compiler output
        diagnostics: String,
    },

    /// A captured name is bound neither locally nor globally
    #[error("{location}: NameError: name '{name}' is not defined")]
    NameNotDefined {
        name: String,
        location: SourceLocation,
    },

    /// The fragment aborted through `qq_fail`
    #[error("{location}: quoted fragment failed: {message}")]
    FragmentFailed {
        message: String,
        location: SourceLocation,
    },

    /// No quoter is registered under the name used at the site
    #[error("{location}: no quasiquoter registered as '{name}'")]
    UnknownQuoter {
        name: String,
        location: SourceLocation,
    },

    /// The compiler executable could not be started
    #[error("cannot run compiler '{compiler}': {source}")]
    ToolchainUnavailable {
        compiler: String,
        #[source]
        source: io::Error,
    },

    /// A compiled artifact could not be loaded
    #[error("cannot load '{}': {message}", .path.display())]
    Load { path: PathBuf, message: String },

    /// Filesystem error
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid codegen configuration
    #[error("invalid codegen configuration: {0}")]
    Config(String),

    /// Host source could not be tokenized
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Value conversion failure at the native boundary
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl QuoteError {
    /// Create an unsupported-form error, not yet tied to a site
    pub fn unsupported(kind: QuoteKind) -> Self {
        QuoteError::UnsupportedQuoteKind {
            kind,
            location: SourceLocation::unknown(),
        }
    }

    /// Create a compilation error at a call site
    pub fn compilation(site: &CallSite, diagnostics: impl Into<String>) -> Self {
        QuoteError::CompilationError {
            location: site.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Create a name error at a call site
    pub fn name_not_defined(name: impl Into<String>, site: &CallSite) -> Self {
        QuoteError::NameNotDefined {
            name: name.into(),
            location: site.into(),
        }
    }

    /// Create an I/O error
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        QuoteError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a load error
    pub fn load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        QuoteError::Load {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Get the location of the error, if it has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            QuoteError::UnsupportedQuoteKind { location, .. }
            | QuoteError::MalformedDelegateSyntax { location, .. }
            | QuoteError::CompilationError { location, .. }
            | QuoteError::NameNotDefined { location, .. }
            | QuoteError::FragmentFailed { location, .. }
            | QuoteError::UnknownQuoter { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Point the error at `site`.
    ///
    /// Only locations that are still unknown are replaced, so an error
    /// raised deeper with a more precise location keeps it.
    pub fn relocated(mut self, site: &CallSite) -> Self {
        match &mut self {
            QuoteError::UnsupportedQuoteKind { location, .. }
            | QuoteError::MalformedDelegateSyntax { location, .. }
            | QuoteError::CompilationError { location, .. }
            | QuoteError::NameNotDefined { location, .. }
            | QuoteError::FragmentFailed { location, .. }
            | QuoteError::UnknownQuoter { location, .. } => {
                if location.is_unknown() {
                    *location = site.into();
                }
            }
            _ => {}
        }
        self
    }
}

/// Result type alias for quote operations
pub type QuoteResult<T> = Result<T, QuoteError>;

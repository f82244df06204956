//! Quoter that reads fragment text from a file

use std::fs;
use std::path::{Path, PathBuf};

use quasiquote_runtime::Value;

use super::Quoter;
use crate::error::{QuoteError, QuoteResult, SourceLocation};
use crate::scope::ScopeCapture;
use crate::site::CallSite;

/// Wraps a quoter so that the quoted text names a file holding the real
/// fragment.
///
/// ```text
/// with $c_file:            y = [$c_file| expr.c |]
///     block.c
/// ```
#[derive(Debug, Clone)]
pub struct FromFile<Q> {
    inner: Q,
    base_dir: Option<PathBuf>,
}

impl<Q: Quoter> FromFile<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner,
            base_dir: None,
        }
    }

    /// Resolve relative file names against `dir` instead of the working
    /// directory
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }

    fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read(&self, name: &str) -> QuoteResult<String> {
        let path = self.resolve(name.trim());
        fs::read_to_string(&path).map_err(|e| QuoteError::io(path, e))
    }
}

impl<Q: Quoter> Quoter for FromFile<Q> {
    fn quote_stmt(&self, code: &str, site: &CallSite, scope: &mut dyn ScopeCapture) -> QuoteResult<()> {
        let lines: Vec<&str> = code.lines().collect();
        let [name] = lines.as_slice() else {
            // The block starts on the line after the call
            let (line, line_text) = match lines.get(1) {
                Some(text) => (site.line + 2, *text),
                None => (site.line, ""),
            };
            let column = line_text.len() - line_text.trim_start().len();
            return Err(QuoteError::MalformedDelegateSyntax {
                location: SourceLocation::new(site.unit.clone(), line, column),
                line_text: line_text.trim().to_string(),
            });
        };

        let contents = self.read(name)?;
        self.inner.quote_stmt(&contents, site, scope)
    }

    fn quote_expr(&self, code: &str, site: &CallSite, scope: &dyn ScopeCapture) -> QuoteResult<Value> {
        let contents = self.read(code)?;
        let padded = format!("{}{}", " ".repeat(site.column), contents);
        self.inner.quote_expr(&padded, site, scope)
    }
}

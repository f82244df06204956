//! Source locations attached to quote errors and warnings

use std::fmt;
use std::path::PathBuf;

use crate::site::CallSite;

/// A position in a host source unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column (0-indexed)
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Placeholder used until an error is attached to a call site
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl From<&CallSite> for SourceLocation {
    fn from(site: &CallSite) -> Self {
        Self::new(site.unit.clone(), site.line, site.column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return write!(f, "<unknown>");
        }
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Non-fatal diagnostics produced while compiling a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationWarning {
    /// Raw compiler output
    pub diagnostics: String,
    pub location: SourceLocation,
}

impl CompilationWarning {
    pub fn new(diagnostics: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            diagnostics: diagnostics.into(),
            location,
        }
    }
}

impl fmt::Display for CompilationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: compiler warning\n{}", self.location, self.diagnostics)
    }
}

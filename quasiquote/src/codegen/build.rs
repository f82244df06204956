//! Generating and compiling a fragment, with one capture-discovery retry
//!
//! The first attempt captures nothing. If the compiler reports undeclared
//! identifiers, the wrapper is regenerated capturing exactly those names and
//! compiled once more. Any other failure, or a failed retry, is final.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use super::cache::{record, CodegenStats};
use super::config::CodegenConfig;
use super::naming::ArtifactPaths;
use super::template;
use super::toolchain::{self, CompilerOutput};
use crate::error::{QuoteError, QuoteResult};
use crate::site::{CallSite, QuoteKind};

/// Where a build stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    /// Compiled without captures
    First,
    /// Compiled again capturing the names the first attempt was missing
    Retried { names: Vec<String> },
}

impl BuildState {
    pub fn names(&self) -> &[String] {
        match self {
            BuildState::First => &[],
            BuildState::Retried { names } => names,
        }
    }
}

/// A successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub state: BuildState,
    /// Compiler output of the successful attempt, if it printed anything
    pub warnings: Option<String>,
}

/// One fragment to generate and compile
#[derive(Debug)]
pub struct FragmentBuild<'a> {
    pub config: &'a CodegenConfig,
    pub kind: QuoteKind,
    pub code: &'a str,
    pub site: &'a CallSite,
    pub paths: &'a ArtifactPaths,
}

impl FragmentBuild<'_> {
    /// Generate, compile and, if needed, retry once. Leaves the artifact at
    /// `paths.artifact` on success.
    pub fn run(&self, stats: &Cell<CodegenStats>) -> QuoteResult<Built> {
        let mut state = BuildState::First;
        loop {
            let output = self.attempt(state.names(), stats)?;
            if !output.has_errors() {
                let warnings = output.has_diagnostics().then(|| output.diagnostics());
                return Ok(Built { state, warnings });
            }

            let missing = output.missing_names();
            match state {
                BuildState::First if !missing.is_empty() => {
                    debug!("{}: retrying {} fragment capturing {:?}", self.site, self.kind, missing);
                    record(stats, |s| s.retries += 1);
                    state = BuildState::Retried { names: missing };
                }
                _ => return Err(QuoteError::compilation(self.site, output.diagnostics())),
            }
        }
    }

    fn attempt(&self, names: &[String], stats: &Cell<CodegenStats>) -> QuoteResult<CompilerOutput> {
        let source = &self.paths.source;
        if let Some(dir) = source.parent() {
            fs::create_dir_all(dir).map_err(|e| QuoteError::io(dir, e))?;
        }
        let wrapper = template::render(self.kind, self.code, self.site, names);
        fs::write(source, wrapper).map_err(|e| QuoteError::io(source, e))?;

        record(stats, |s| s.compiler_invocations += 1);
        let output = toolchain::compile(self.config, source, &self.paths.artifact);
        if !self.config.keep_source {
            remove_if_exists(source)?;
        }
        output
    }
}

/// Delete `path`; a file that is already gone is fine
pub(crate) fn remove_if_exists(path: &Path) -> QuoteResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(QuoteError::io(path, e)),
    }
}

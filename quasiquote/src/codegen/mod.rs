//! Native C quoter
//!
//! Resolving a fragment at a site tries, in order:
//!
//! 1. the in-memory cache, keyed by kind and site
//! 2. a compiled artifact already on disk, named by content hash
//! 3. a generated source already on disk, which is compiled
//! 4. generating the wrapper from scratch (see [`build`])
//!
//! Each step is only tried when the previous one misses. Unless
//! `keep_artifact` is set, the artifact is deleted once loaded and the
//! in-memory cache is the only record for the rest of the process.

pub mod build;
pub mod cache;
pub mod config;
pub mod loader;
pub mod naming;
pub mod template;
pub mod toolchain;

pub use build::{BuildState, Built, FragmentBuild};
pub use cache::CodegenStats;
pub use config::CodegenConfig;
pub use loader::{CompiledFragment, Invocation};
pub use naming::ArtifactPaths;

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};
use quasiquote_runtime::Value;

use self::build::remove_if_exists;
use self::cache::{record, FragmentCache};
use crate::error::{CompilationWarning, QuoteError, QuoteResult};
use crate::quoter::Quoter;
use crate::scope::{ScopeCapture, ScopeMapping};
use crate::site::{CallSite, QuoteKind};

/// Quoter compiling fragments to shared objects with a C compiler
///
/// Fragments see captured names as `qq_value` locals:
///
/// ```text
/// x = 21
/// with $c:
///     x = qq_int(qq_as_int(x) * 2);
/// # x == 42
/// ```
#[derive(Debug, Default)]
pub struct CQuoter {
    config: CodegenConfig,
    cache: RefCell<FragmentCache>,
    stats: Cell<CodegenStats>,
    warnings: RefCell<Vec<CompilationWarning>>,
}

impl CQuoter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodegenConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Configured from the environment
    pub fn from_env() -> Self {
        Self::with_config(CodegenConfig::from_env())
    }

    pub fn builder() -> CQuoterBuilder {
        CQuoterBuilder::default()
    }

    /// A new, independent quoter with an adjusted copy of this one's
    /// configuration and an empty cache
    pub fn reconfigured(&self, configure: impl FnOnce(&mut CodegenConfig)) -> Self {
        let mut config = self.config.clone();
        configure(&mut config);
        Self::with_config(config)
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.config
    }

    pub fn stats(&self) -> CodegenStats {
        self.stats.get()
    }

    /// Number of fragments held in memory
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Forget the fragment loaded for `site`, returning whether there was one
    pub fn evict(&self, kind: QuoteKind, site: &CallSite) -> bool {
        self.cache.borrow_mut().remove(kind, site)
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Drain the warnings reported by the compiler so far
    pub fn take_warnings(&self) -> Vec<CompilationWarning> {
        self.warnings.take()
    }

    /// Generated file paths for a fragment
    pub fn paths(&self, kind: QuoteKind, code: &str, site: &CallSite) -> ArtifactPaths {
        ArtifactPaths::new(&self.artifact_dir(site), kind, site, code)
    }

    fn artifact_dir(&self, site: &CallSite) -> PathBuf {
        match &self.config.artifact_dir {
            Some(dir) => dir.clone(),
            None => site.dir().to_path_buf(),
        }
    }

    /// Find or build the fragment for `site`
    pub fn resolve(&self, kind: QuoteKind, code: &str, site: &CallSite) -> QuoteResult<Rc<CompiledFragment>> {
        if let Some(fragment) = self.cache.borrow().get(kind, site) {
            debug!("{}: {} fragment found in memory", site, kind);
            record(&self.stats, |s| s.memory_hits += 1);
            return Ok(fragment);
        }

        let fragment = Rc::new(self.load_or_build(kind, code, site)?);
        self.cache
            .borrow_mut()
            .insert(kind, site.clone(), Rc::clone(&fragment));
        Ok(fragment)
    }

    fn load_or_build(&self, kind: QuoteKind, code: &str, site: &CallSite) -> QuoteResult<CompiledFragment> {
        let paths = self.paths(kind, code, site);

        if paths.artifact.is_file() {
            match CompiledFragment::open(&paths.artifact) {
                Ok(fragment) => {
                    debug!("{}: loaded {}", site, paths.artifact.display());
                    record(&self.stats, |s| s.artifact_hits += 1);
                    return Ok(fragment);
                }
                Err(err) => debug!("{}: cannot reuse artifact: {}", site, err),
            }
        }

        if paths.source.is_file() {
            debug!("{}: compiling existing {}", site, paths.source.display());
            record(&self.stats, |s| {
                s.source_builds += 1;
                s.compiler_invocations += 1;
            });
            let output = toolchain::compile(&self.config, &paths.source, &paths.artifact);
            if !self.config.keep_source {
                remove_if_exists(&paths.source)?;
            }
            let output = output?;
            if output.has_errors() {
                return Err(QuoteError::compilation(site, output.diagnostics()));
            }
            if output.has_diagnostics() {
                self.warn(site, output.diagnostics());
            }
        } else {
            debug!("{}: generating {} fragment", site, kind);
            record(&self.stats, |s| s.generations += 1);
            let built = FragmentBuild {
                config: &self.config,
                kind,
                code,
                site,
                paths: &paths,
            }
            .run(&self.stats)?;
            if let Some(diagnostics) = built.warnings {
                self.warn(site, diagnostics);
            }
        }

        self.load_built(&paths.artifact)
    }

    fn load_built(&self, artifact: &Path) -> QuoteResult<CompiledFragment> {
        let fragment = CompiledFragment::open(artifact)?;
        if !self.config.keep_artifact {
            debug!("removing {}", artifact.display());
            remove_if_exists(artifact)?;
        }
        Ok(fragment)
    }

    fn warn(&self, site: &CallSite, diagnostics: String) {
        let warning = CompilationWarning::new(diagnostics, site.into());
        warn!("{}", warning);
        self.warnings.borrow_mut().push(warning);
    }
}

impl Quoter for CQuoter {
    fn quote_stmt(&self, code: &str, site: &CallSite, scope: &mut dyn ScopeCapture) -> QuoteResult<()> {
        let fragment = self.resolve(QuoteKind::Stmt, code, site)?;
        let mapping = ScopeMapping::capture(&*scope);
        let inputs = mapping.inputs_for(fragment.names(), site)?;
        let invocation = fragment.call(&inputs, site)?;

        let returned = fragment.names().iter().cloned().zip(invocation.outputs);
        let written = mapping.reconcile(returned, scope);
        debug!("{}: wrote back {:?}", site, written);
        Ok(())
    }

    fn quote_expr(&self, code: &str, site: &CallSite, scope: &dyn ScopeCapture) -> QuoteResult<Value> {
        let fragment = self.resolve(QuoteKind::Expr, code, site)?;
        let mapping = ScopeMapping::capture(scope);
        let inputs = mapping.inputs_for(fragment.names(), site)?;
        Ok(fragment.call(&inputs, site)?.value)
    }
}

/// Builder for independently configured [`CQuoter`]s
#[derive(Debug, Clone, Default)]
pub struct CQuoterBuilder {
    config: CodegenConfig,
}

impl CQuoterBuilder {
    /// Start from an existing configuration
    pub fn config(mut self, config: CodegenConfig) -> Self {
        self.config = config;
        self
    }

    pub fn compiler(mut self, compiler: impl Into<String>) -> Self {
        self.config.compiler = compiler.into();
        self
    }

    pub fn opt_level(mut self, level: u8) -> Self {
        self.config.opt_level = level;
        self
    }

    pub fn extra_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.extra_flags.push(flag.into());
        self
    }

    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.include_dirs.push(dir.into());
        self
    }

    pub fn header_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.header_dir = dir.into();
        self
    }

    pub fn artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.artifact_dir = Some(dir.into());
        self
    }

    pub fn keep_source(mut self, keep: bool) -> Self {
        self.config.keep_source = keep;
        self
    }

    pub fn keep_artifact(mut self, keep: bool) -> Self {
        self.config.keep_artifact = keep;
        self
    }

    pub fn build(self) -> CQuoter {
        CQuoter::with_config(self.config)
    }
}

//! External C compiler invocation and diagnostic parsing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use quasiquote_runtime::{HEADER, HEADER_NAME};
use regex::Regex;

use super::config::CodegenConfig;
use crate::error::{QuoteError, QuoteResult};

static ERROR_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^.+:\d+:(?:\d+:)? (?:fatal )?error\b").expect("error line pattern is valid")
});

// gcc: 'x' undeclared (first use in this function)
// clang: use of undeclared identifier 'x'
static MISSING_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)error: (?:[‘'](\w+)[’'] undeclared \(first use in this function\)|use of undeclared identifier [‘'](\w+)[’'])",
    )
    .expect("missing name pattern is valid")
});

static HEADER_WRITES: AtomicUsize = AtomicUsize::new(0);

/// Captured result of one compiler run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilerOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CompilerOutput {
    /// Everything the compiler printed
    pub fn diagnostics(&self) -> String {
        let mut text = self.stdout.clone();
        text.push_str(&self.stderr);
        text
    }

    /// Failed exit status, or any line reporting an error
    pub fn has_errors(&self) -> bool {
        !self.success || ERROR_LINE.is_match(&self.stdout) || ERROR_LINE.is_match(&self.stderr)
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.stdout.trim().is_empty() || !self.stderr.trim().is_empty()
    }

    /// Identifiers reported as undeclared, sorted and deduplicated
    pub fn missing_names(&self) -> Vec<String> {
        let text = self.diagnostics();
        let mut names: Vec<String> = MISSING_NAME
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Make sure `dir` holds the current embedding header
pub fn ensure_header(dir: &Path) -> QuoteResult<PathBuf> {
    let path = dir.join(HEADER_NAME);
    if fs::read_to_string(&path).is_ok_and(|existing| existing == HEADER) {
        return Ok(path);
    }

    fs::create_dir_all(dir).map_err(|e| QuoteError::io(dir, e))?;
    // Write then rename so a concurrent compile never sees a partial header
    let n = HEADER_WRITES.fetch_add(1, Ordering::Relaxed);
    let tmp = dir.join(format!(".{}.{}.{}", HEADER_NAME, std::process::id(), n));
    fs::write(&tmp, HEADER).map_err(|e| QuoteError::io(&tmp, e))?;
    fs::rename(&tmp, &path).map_err(|e| QuoteError::io(&path, e))?;
    Ok(path)
}

/// The compiler command building `source` into the shared object `output`
pub fn compiler_command(config: &CodegenConfig, source: &Path, output: &Path) -> Command {
    let mut cmd = Command::new(&config.compiler);
    cmd.arg(format!("-O{}", config.opt_level))
        .arg("-I")
        .arg(&config.header_dir);
    for dir in &config.include_dirs {
        cmd.arg("-I").arg(dir);
    }
    cmd.arg("-fPIC")
        .arg("-std=gnu11")
        .arg("-shared")
        .arg("-o")
        .arg(output)
        .arg(source)
        .args(&config.extra_flags)
        // Keep diagnostics in plain ASCII so they can be parsed
        .env("LC_ALL", "C");
    cmd
}

/// Run the compiler and capture what it reports
pub fn compile(config: &CodegenConfig, source: &Path, output: &Path) -> QuoteResult<CompilerOutput> {
    ensure_header(&config.header_dir)?;
    let result = compiler_command(config, source, output)
        .output()
        .map_err(|source| unavailable(config, source))?;
    Ok(CompilerOutput {
        success: result.status.success(),
        stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
    })
}

fn unavailable(config: &CodegenConfig, source: io::Error) -> QuoteError {
    QuoteError::ToolchainUnavailable {
        compiler: config.compiler.clone(),
        source,
    }
}

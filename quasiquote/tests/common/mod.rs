//! Shared helpers for integration tests
// Each test target uses a different subset of these helpers.
#![allow(dead_code)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;
use quasiquote::codegen::naming::is_generated_name;
use quasiquote::{CQuoter, CQuoterBuilder, CallSite};
use tempfile::TempDir;

/// Compiler the native tests use
pub fn compiler() -> String {
    ["QUASIQUOTE_CC", "CC"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|val| !val.trim().is_empty())
        .unwrap_or_else(|| "cc".to_string())
}

static CC_AVAILABLE: Lazy<bool> = Lazy::new(|| {
    Command::new(compiler())
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
});

/// Whether a C compiler can be run
pub fn cc_available() -> bool {
    *CC_AVAILABLE
}

/// Return early from a test when there is no C compiler.
/// Needs `#[macro_use] mod common;`.
#[allow(unused_macros)]
macro_rules! require_cc {
    () => {
        if !common::cc_available() {
            eprintln!("skipping: no working C compiler ({})", common::compiler());
            return;
        }
    };
}

/// A scratch directory holding a fake source unit and its generated files
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The quoting source unit
    pub fn unit(&self) -> PathBuf {
        self.dir.path().join("sample.py")
    }

    pub fn site(&self, line: usize, column: usize) -> CallSite {
        CallSite::new(self.unit(), line, column)
    }

    /// Builder writing the header inside the workspace
    pub fn builder(&self) -> CQuoterBuilder {
        CQuoter::builder()
            .compiler(compiler())
            .header_dir(self.dir.path().join("include"))
    }

    pub fn quoter(&self) -> CQuoter {
        self.builder().build()
    }

    /// Generated sources and artifacts next to the unit, sorted
    pub fn generated_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .expect("Failed to read workspace")
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_generated_name(name))
            .collect();
        names.sort();
        names
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }
}

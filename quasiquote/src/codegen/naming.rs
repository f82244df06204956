//! On-disk names for generated sources and compiled artifacts
//!
//! `_qq_<kind>_<stem>_<sha256>.c` and `_qq_<kind>_<stem>_<sha256>.<dll>`,
//! where the hash covers the kind, the site position and the fragment, so
//! the same text quoted at two sites never shares a file.

use std::env::consts::DLL_EXTENSION;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::site::{CallSite, QuoteKind};

/// Prefix of every generated file name
pub const ARTIFACT_TAG: &str = "_qq";

static GENERATED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^_qq_(stmt|expr)_\w*_[0-9a-f]{64}\.(c|so|dylib|dll)$")
        .expect("generated name pattern is valid")
});

/// Hex SHA-256 identifying a fragment at a site
pub fn content_hash(kind: QuoteKind, site: &CallSite, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(format!("\n{}:{}\n--\n", site.line, site.column).as_bytes());
    hasher.update(code.as_bytes());
    let digest = hasher.finalize();
    format!("{:x}", digest)
}

/// Replace everything but ASCII letters and digits with `_`
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Whether `file_name` looks like a generated source or artifact
pub fn is_generated_name(file_name: &str) -> bool {
    GENERATED_NAME.is_match(file_name)
}

/// Generated source and compiled artifact paths for one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub source: PathBuf,
    pub artifact: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, kind: QuoteKind, site: &CallSite, code: &str) -> Self {
        let base = format!(
            "{}_{}_{}_{}",
            ARTIFACT_TAG,
            kind.as_str(),
            sanitize(site.file_stem()),
            content_hash(kind, site, code)
        );
        Self {
            source: dir.join(format!("{base}.c")),
            artifact: dir.join(format!("{base}.{DLL_EXTENSION}")),
        }
    }
}

//! Codegen configuration
//!
//! Defaults, overridable from TOML or from the environment:
//!
//! - `QUASIQUOTE_CC` (falling back to `CC`): compiler executable
//! - `QUASIQUOTE_CFLAGS`: extra flags, whitespace separated
//! - `QUASIQUOTE_KEEP_SOURCE` / `QUASIQUOTE_KEEP_ARTIFACT`: `1`/`0`, `true`/`false`
//! - `QUASIQUOTE_ARTIFACT_DIR`: where generated files go

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{QuoteError, QuoteResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    /// Compiler executable
    pub compiler: String,
    /// Value of `-O`
    pub opt_level: u8,
    /// Flags appended after the source path
    pub extra_flags: Vec<String>,
    /// Extra `-I` directories
    pub include_dirs: Vec<PathBuf>,
    /// Where `quasiquote.h` is written for generated sources to include
    pub header_dir: PathBuf,
    /// Directory for generated files; `None` puts them next to the quoting
    /// source unit
    pub artifact_dir: Option<PathBuf>,
    /// Keep generated C sources after compiling them
    pub keep_source: bool,
    /// Keep compiled artifacts after loading them
    pub keep_artifact: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            compiler: "cc".to_string(),
            opt_level: 3,
            extra_flags: Vec::new(),
            include_dirs: Vec::new(),
            header_dir: env::temp_dir().join("quasiquote-include"),
            artifact_dir: None,
            keep_source: false,
            keep_artifact: true,
        }
    }
}

impl CodegenConfig {
    /// Parse a TOML table; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> QuoteResult<Self> {
        toml::from_str(raw).map_err(|e| QuoteError::Config(e.to_string()))
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(compiler) = compiler_from_env() {
            self.compiler = compiler;
        }
        if let Some(flags) = non_empty_var("QUASIQUOTE_CFLAGS") {
            self.extra_flags = split_flags(&flags);
        }
        if let Some(keep) = non_empty_var("QUASIQUOTE_KEEP_SOURCE").and_then(|v| parse_bool(&v)) {
            self.keep_source = keep;
        }
        if let Some(keep) = non_empty_var("QUASIQUOTE_KEEP_ARTIFACT").and_then(|v| parse_bool(&v)) {
            self.keep_artifact = keep;
        }
        if let Some(dir) = non_empty_var("QUASIQUOTE_ARTIFACT_DIR") {
            self.artifact_dir = Some(PathBuf::from(dir));
        }
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.trim().is_empty())
}

fn compiler_from_env() -> Option<String> {
    non_empty_var("QUASIQUOTE_CC").or_else(|| non_empty_var("CC"))
}

fn split_flags(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodegenConfig::default();
        assert_eq!(config.compiler, "cc");
        assert_eq!(config.opt_level, 3);
        assert!(!config.keep_source);
        assert!(config.keep_artifact);
        assert!(config.header_dir.ends_with("quasiquote-include"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = CodegenConfig::from_toml_str(
            r#"
            compiler = "gcc"
            extra_flags = ["-Wall", "-DNDEBUG"]
            keep_source = true
            "#,
        )
        .unwrap();
        assert_eq!(config.compiler, "gcc");
        assert_eq!(config.extra_flags, vec!["-Wall", "-DNDEBUG"]);
        assert!(config.keep_source);
        assert!(config.keep_artifact);
        assert_eq!(config.opt_level, 3);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = CodegenConfig::from_toml_str("opt_level = \"fast\"").unwrap_err();
        assert!(matches!(err, QuoteError::Config(_)));
    }

    #[test]
    fn test_split_flags() {
        assert_eq!(split_flags("  -Wall\t-O0 \n-g "), vec!["-Wall", "-O0", "-g"]);
        assert!(split_flags("   ").is_empty());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool(" TRUE "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}

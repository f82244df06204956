// Library code reports through `log`; only the CLI binary prints.
#![deny(clippy::print_stderr)]

//! quasiquote
//!
//! Run-time side of quasiquoted C: rewritten call sites reach a [`Quoter`]
//! through a [`QuoterRegistry`], and [`CQuoter`] turns each fragment into a
//! loaded shared object, compiled once per site and cached in memory and
//! on disk.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use quasiquote::{collect_fragments, CQuoter, MapScope, QuoterRegistry, Value};
//! use quasiquote_lexer::transform_source;
//!
//! let source = "x = 21\nwith $c:\n    x = qq_int(qq_as_int(x) * 2);\n";
//! let rewritten = transform_source(source).unwrap();
//!
//! let mut registry = QuoterRegistry::new();
//! registry.register("c", CQuoter::from_env());
//!
//! let mut scope = MapScope::new().with_local("x", 21);
//! for fragment in collect_fragments(Path::new("demo.py"), &rewritten).unwrap() {
//!     registry.dispatch(&fragment, &mut scope).unwrap();
//! }
//! assert_eq!(scope.local("x"), Some(&Value::I64(42)));
//! ```

pub mod codegen;
pub mod error;
pub mod maintenance;
pub mod quoter;
pub mod scope;
pub mod site;

// Re-exports
pub use codegen::{CQuoter, CQuoterBuilder, CodegenConfig, CodegenStats, CompiledFragment};
pub use error::{CompilationWarning, QuoteError, QuoteResult, SourceLocation};
pub use maintenance::cleanup;
pub use quasiquote_runtime::Value;
pub use quoter::{FromFile, Quoter, QuoterRegistry, UnimplementedQuoter};
pub use scope::{MapScope, ScopeCapture, ScopeMapping};
pub use site::{collect_fragments, CallSite, Fragment, QuoteKind};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! The quoter capability
//!
//! Rewritten sites call `_quote_stmt` or `_quote_expr` on a quoter. A
//! backend implements whichever forms it supports; the defaults report
//! [`QuoteError::UnsupportedQuoteKind`] at the call site.

mod fromfile;
mod registry;

pub use fromfile::FromFile;
pub use registry::QuoterRegistry;

use std::fmt;

use quasiquote_runtime::Value;

use crate::error::{QuoteError, QuoteResult};
use crate::scope::ScopeCapture;
use crate::site::{CallSite, QuoteKind};

/// A backend for quoted fragments
pub trait Quoter: fmt::Debug {
    /// Run a block fragment, writing changed locals back into `scope`
    fn quote_stmt(
        &self,
        _code: &str,
        site: &CallSite,
        _scope: &mut dyn ScopeCapture,
    ) -> QuoteResult<()> {
        Err(QuoteError::unsupported(QuoteKind::Stmt).relocated(site))
    }

    /// Evaluate an inline fragment
    fn quote_expr(&self, _code: &str, site: &CallSite, _scope: &dyn ScopeCapture) -> QuoteResult<Value> {
        Err(QuoteError::unsupported(QuoteKind::Expr).relocated(site))
    }
}

impl<Q: Quoter + ?Sized> Quoter for Box<Q> {
    fn quote_stmt(&self, code: &str, site: &CallSite, scope: &mut dyn ScopeCapture) -> QuoteResult<()> {
        (**self).quote_stmt(code, site, scope)
    }

    fn quote_expr(&self, code: &str, site: &CallSite, scope: &dyn ScopeCapture) -> QuoteResult<Value> {
        (**self).quote_expr(code, site, scope)
    }
}

/// A quoter supporting neither form
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedQuoter;

impl Quoter for UnimplementedQuoter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceLocation;
    use crate::scope::MapScope;

    #[derive(Debug)]
    struct ExprOnly;

    impl Quoter for ExprOnly {
        fn quote_expr(&self, code: &str, _site: &CallSite, _scope: &dyn ScopeCapture) -> QuoteResult<Value> {
            Ok(Value::from(code.trim()))
        }
    }

    #[test]
    fn test_unimplemented_reports_call_site() {
        let site = CallSite::new("pkg/m.py", 7, 4);
        let mut scope = MapScope::new();

        let err = UnimplementedQuoter.quote_stmt("x;", &site, &mut scope).unwrap_err();
        assert!(matches!(err, QuoteError::UnsupportedQuoteKind { kind: QuoteKind::Stmt, .. }));
        assert_eq!(err.location(), Some(&SourceLocation::new("pkg/m.py", 7, 4)));

        let err = UnimplementedQuoter.quote_expr("x", &site, &scope).unwrap_err();
        assert!(matches!(err, QuoteError::UnsupportedQuoteKind { kind: QuoteKind::Expr, .. }));
        assert_eq!(err.location(), Some(&SourceLocation::new("pkg/m.py", 7, 4)));
    }

    #[test]
    fn test_partial_quoter_keeps_default() {
        let site = CallSite::new("m.py", 1, 0);
        let mut scope = MapScope::new();
        assert_eq!(ExprOnly.quote_expr(" a ", &site, &scope).unwrap(), Value::from("a"));
        assert!(matches!(
            ExprOnly.quote_stmt("a", &site, &mut scope),
            Err(QuoteError::UnsupportedQuoteKind { kind: QuoteKind::Stmt, .. })
        ));
    }

    #[test]
    fn test_boxed_quoter_forwards() {
        let boxed: Box<dyn Quoter> = Box::new(ExprOnly);
        let site = CallSite::new("m.py", 1, 0);
        assert_eq!(
            boxed.quote_expr("b", &site, &MapScope::new()).unwrap(),
            Value::from("b")
        );
    }
}

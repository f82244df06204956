//! Name to quoter lookup for rewritten call sites

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use quasiquote_runtime::Value;

use super::Quoter;
use crate::error::{QuoteError, QuoteResult, SourceLocation};
use crate::scope::ScopeCapture;
use crate::site::{CallSite, Fragment, QuoteKind};

/// Quoters by the name used after the sigil
#[derive(Default)]
pub struct QuoterRegistry {
    quoters: HashMap<String, Rc<dyn Quoter>>,
}

impl QuoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `quoter` under `name`, returning the quoter it replaces
    pub fn register<Q: Quoter + 'static>(&mut self, name: impl Into<String>, quoter: Q) -> Option<Rc<dyn Quoter>> {
        self.register_shared(name, Rc::new(quoter))
    }

    /// Register an instance that is also held elsewhere
    pub fn register_shared(&mut self, name: impl Into<String>, quoter: Rc<dyn Quoter>) -> Option<Rc<dyn Quoter>> {
        self.quoters.insert(name.into(), quoter)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Rc<dyn Quoter>> {
        self.quoters.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Quoter>> {
        self.quoters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.quoters.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.quoters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, name: &str, site: &CallSite) -> QuoteResult<&Rc<dyn Quoter>> {
        self.quoters.get(name).ok_or_else(|| QuoteError::UnknownQuoter {
            name: name.to_string(),
            location: SourceLocation::from(site),
        })
    }

    pub fn quote_stmt(
        &self,
        name: &str,
        code: &str,
        site: &CallSite,
        scope: &mut dyn ScopeCapture,
    ) -> QuoteResult<()> {
        self.lookup(name, site)?
            .quote_stmt(code, site, scope)
            .map_err(|e| e.relocated(site))
    }

    pub fn quote_expr(
        &self,
        name: &str,
        code: &str,
        site: &CallSite,
        scope: &dyn ScopeCapture,
    ) -> QuoteResult<Value> {
        self.lookup(name, site)?
            .quote_expr(code, site, scope)
            .map_err(|e| e.relocated(site))
    }

    /// Run a fragment with the quoter it names. Statements evaluate to
    /// [`Value::Nothing`].
    pub fn dispatch(&self, fragment: &Fragment, scope: &mut dyn ScopeCapture) -> QuoteResult<Value> {
        match fragment.kind {
            QuoteKind::Stmt => self
                .quote_stmt(&fragment.quoter, &fragment.text, &fragment.site, scope)
                .map(|()| Value::Nothing),
            QuoteKind::Expr => self.quote_expr(&fragment.quoter, &fragment.text, &fragment.site, &*scope),
        }
    }
}

impl fmt::Debug for QuoterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoterRegistry")
            .field("names", &self.names())
            .finish()
    }
}

//! Scope capture and write-back
//!
//! The engine never inspects the caller's stack. The integration layer
//! hands it a [`ScopeCapture`], and [`ScopeMapping`] turns that into the
//! merged view a fragment reads from.

use std::collections::{BTreeMap, BTreeSet};

use quasiquote_runtime::Value;

use crate::error::{QuoteError, QuoteResult};
use crate::site::CallSite;

/// Bindings visible at a quote site
pub trait ScopeCapture {
    /// Local bindings of the calling frame
    fn local_bindings(&self) -> BTreeMap<String, Value>;

    /// Global bindings of the calling frame
    fn global_bindings(&self) -> BTreeMap<String, Value>;

    /// Rebind a local of the calling frame
    fn write_local(&mut self, name: &str, value: Value);
}

/// A scope backed by two maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapScope {
    pub locals: BTreeMap<String, Value>,
    pub globals: BTreeMap<String, Value>,
}

impl MapScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(name.into(), value.into());
        self
    }

    pub fn with_global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals.get(name)
    }
}

impl ScopeCapture for MapScope {
    fn local_bindings(&self) -> BTreeMap<String, Value> {
        self.locals.clone()
    }

    fn global_bindings(&self) -> BTreeMap<String, Value> {
        self.globals.clone()
    }

    fn write_local(&mut self, name: &str, value: Value) {
        self.locals.insert(name.to_string(), value);
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Merged view of a scope at the moment of a call
#[derive(Debug, Clone, Default)]
pub struct ScopeMapping {
    bindings: BTreeMap<String, Value>,
    locals: BTreeSet<String>,
}

impl ScopeMapping {
    /// Snapshot `scope`. Locals shadow globals; dunder globals are left out.
    pub fn capture(scope: &dyn ScopeCapture) -> Self {
        let mut bindings: BTreeMap<String, Value> = scope
            .global_bindings()
            .into_iter()
            .filter(|(name, _)| !is_dunder(name))
            .collect();
        let locals = scope.local_bindings();
        let names = locals.keys().cloned().collect();
        bindings.extend(locals);
        Self {
            bindings,
            locals: names,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Whether `name` was a local of the caller when captured
    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Values for `names`, in order
    pub fn inputs_for(&self, names: &[String], site: &CallSite) -> QuoteResult<Vec<Value>> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| QuoteError::name_not_defined(name.as_str(), site))
            })
            .collect()
    }

    /// Write values returned by a statement fragment back into `scope`.
    ///
    /// Only names that were locals at capture time are written; anything
    /// else the fragment reports is dropped. Returns the names written.
    pub fn reconcile<I>(&self, returned: I, scope: &mut dyn ScopeCapture) -> Vec<String>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut written = Vec::new();
        for (name, value) in returned {
            if self.is_local(&name) {
                scope.write_local(&name, value);
                written.push(name);
            }
        }
        written
    }
}

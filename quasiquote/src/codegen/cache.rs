//! In-memory fragment cache and resolution statistics

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::loader::CompiledFragment;
use crate::site::{CallSite, QuoteKind};

/// Counters for each resolution step
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CodegenStats {
    /// Calls answered from memory
    pub memory_hits: usize,
    /// Fragments loaded from an artifact already on disk
    pub artifact_hits: usize,
    /// Fragments compiled from a generated source already on disk
    pub source_builds: usize,
    /// Fragments generated from scratch
    pub generations: usize,
    /// Regenerations with discovered captures
    pub retries: usize,
    /// Compiler processes started
    pub compiler_invocations: usize,
}

impl CodegenStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Update counters held in a `Cell`
pub(crate) fn record(stats: &Cell<CodegenStats>, update: impl FnOnce(&mut CodegenStats)) {
    let mut current = stats.get();
    update(&mut current);
    stats.set(current);
}

/// Loaded fragments by site; at most one per (kind, site)
#[derive(Debug, Default)]
pub(crate) struct FragmentCache {
    entries: HashMap<(QuoteKind, CallSite), Rc<CompiledFragment>>,
}

impl FragmentCache {
    pub fn get(&self, kind: QuoteKind, site: &CallSite) -> Option<Rc<CompiledFragment>> {
        // Keyed by owned sites; a lookup clones the key once
        self.entries.get(&(kind, site.clone())).cloned()
    }

    pub fn insert(&mut self, kind: QuoteKind, site: CallSite, fragment: Rc<CompiledFragment>) {
        self.entries.insert((kind, site), fragment);
    }

    pub fn remove(&mut self, kind: QuoteKind, site: &CallSite) -> bool {
        self.entries.remove(&(kind, site.clone())).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Loading compiled fragments and calling into them

use std::ffi::{c_char, CStr};
use std::path::{Path, PathBuf};
use std::ptr;

use libloading::{Library, Symbol};
use quasiquote_runtime::abi::{
    read_name_table, ENTRY_SYMBOL, ERROR_SYMBOL, NAMES_SYMBOL, NAME_COUNT_SYMBOL,
};
use quasiquote_runtime::{lift, EntryFn, Marshal, RawValue, Value};

use crate::error::{QuoteError, QuoteResult};
use crate::site::CallSite;

/// Values produced by one call of a fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Final capture values, in [`CompiledFragment::names`] order
    pub outputs: Vec<Value>,
    /// Expression result; nothing for statements
    pub value: Value,
}

/// A loaded fragment module
#[derive(Debug)]
pub struct CompiledFragment {
    entry: EntryFn,
    names: Vec<String>,
    error_slot: *mut *const c_char,
    path: PathBuf,
    // entry and error_slot point into the library
    _library: Library,
}

impl CompiledFragment {
    /// Load the module at `path` and read its capture table
    pub fn open(path: &Path) -> QuoteResult<Self> {
        // SAFETY: generated modules run no initialisers
        let library = unsafe { Library::new(path) }.map_err(|e| QuoteError::load(path, e))?;

        // SAFETY: the generated wrapper defines these symbols with exactly
        // these types
        let (entry, names, error_slot) = unsafe {
            let entry: Symbol<EntryFn> = library
                .get(ENTRY_SYMBOL.as_bytes())
                .map_err(|e| QuoteError::load(path, e))?;
            let table: Symbol<*const *const c_char> = library
                .get(NAMES_SYMBOL.as_bytes())
                .map_err(|e| QuoteError::load(path, e))?;
            let count: Symbol<*const usize> = library
                .get(NAME_COUNT_SYMBOL.as_bytes())
                .map_err(|e| QuoteError::load(path, e))?;
            let error: Symbol<*mut *const c_char> = library
                .get(ERROR_SYMBOL.as_bytes())
                .map_err(|e| QuoteError::load(path, e))?;
            (*entry, read_name_table(*table, **count), *error)
        };

        Ok(Self {
            entry,
            names,
            error_slot,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    /// Names the fragment captures
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// File the module was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Call the fragment with one input per captured name
    pub fn call(&self, inputs: &[Value], site: &CallSite) -> QuoteResult<Invocation> {
        if inputs.len() != self.names.len() {
            return Err(QuoteError::load(
                &self.path,
                format!("expected {} inputs, got {}", self.names.len(), inputs.len()),
            ));
        }

        let mut marshal = Marshal::new();
        let raw_in = marshal.lower_all(inputs)?;
        let mut raw_out = vec![RawValue::nothing(); self.names.len()];
        let mut raw_ret = RawValue::nothing();

        // SAFETY: the arrays hold one slot per name as the module expects,
        // and the library outlives the call
        let status = unsafe {
            *self.error_slot = ptr::null();
            (self.entry)(raw_in.as_ptr(), raw_out.as_mut_ptr(), &mut raw_ret)
        };

        if status != 0 {
            // SAFETY: qq_fail stores a NUL-terminated string or nothing
            let message = unsafe { failure_message(*self.error_slot) }
                .unwrap_or_else(|| format!("fragment returned status {}", status));
            return Err(QuoteError::FragmentFailed {
                message,
                location: site.into(),
            });
        }

        // Lift before `marshal` drops: outputs may alias input strings
        let outputs = raw_out
            .iter()
            // SAFETY: strings in the slots come from the module or from `marshal`
            .map(|raw| unsafe { lift(raw) })
            .collect::<Result<Vec<_>, _>>()?;
        // SAFETY: as above
        let value = unsafe { lift(&raw_ret) }?;
        Ok(Invocation { outputs, value })
    }
}

unsafe fn failure_message(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller
    let message = unsafe { CStr::from_ptr(ptr) };
    Some(message.to_string_lossy().into_owned())
}

//! Binary contract between the host and compiled fragments
//!
//! Every generated module includes [`HEADER`] and exports:
//!
//! - `int __qq_entry(const qq_value *in, qq_value *out, qq_value *ret)`
//! - `const char *const __qq_names[]`, NULL-terminated capture names
//! - `const size_t __qq_name_count`
//! - `const char *__qq_error`, set by `qq_fail` before returning non-zero
//!
//! `in` and `out` hold one slot per capture name, in `__qq_names` order.

use std::ffi::{c_char, c_int, CStr};
use std::fmt;

/// Value tags, mirrored by the `QQ_*` macros in [`HEADER`]
pub mod tag {
    pub const NOTHING: i32 = 0;
    pub const BOOL: i32 = 1;
    pub const INT: i32 = 2;
    pub const FLOAT: i32 = 3;
    pub const STR: i32 = 4;
}

/// Name of the generated entry point
pub const ENTRY_SYMBOL: &str = "__qq_entry";
/// Name of the NULL-terminated capture name table
pub const NAMES_SYMBOL: &str = "__qq_names";
/// Name of the capture count
pub const NAME_COUNT_SYMBOL: &str = "__qq_name_count";
/// Name of the failure message slot
pub const ERROR_SYMBOL: &str = "__qq_error";

/// Signature of `__qq_entry`
pub type EntryFn =
    unsafe extern "C" fn(input: *const RawValue, output: *mut RawValue, ret: *mut RawValue) -> c_int;

/// Payload of a [`RawValue`], selected by its tag
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawPayload {
    pub int: i64,
    pub float: f64,
    pub str: *const c_char,
}

impl fmt::Debug for RawPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPayload").finish_non_exhaustive()
    }
}

/// C layout of `qq_value`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawValue {
    pub tag: i32,
    pub payload: RawPayload,
}

impl RawValue {
    pub fn nothing() -> Self {
        Self {
            tag: tag::NOTHING,
            payload: RawPayload { int: 0 },
        }
    }

    pub fn bool(v: bool) -> Self {
        Self {
            tag: tag::BOOL,
            payload: RawPayload { int: i64::from(v) },
        }
    }

    pub fn int(v: i64) -> Self {
        Self {
            tag: tag::INT,
            payload: RawPayload { int: v },
        }
    }

    pub fn float(v: f64) -> Self {
        Self {
            tag: tag::FLOAT,
            payload: RawPayload { float: v },
        }
    }

    /// A string value borrowing `ptr`; the caller keeps it alive
    pub fn str(ptr: *const c_char) -> Self {
        Self {
            tag: tag::STR,
            payload: RawPayload { str: ptr },
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        Self::nothing()
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RawValue");
        s.field("tag", &self.tag);
        // SAFETY: the tag selects which union field was written; every
        // field is plain old data, so reading it cannot be undefined.
        unsafe {
            match self.tag {
                tag::BOOL | tag::INT => s.field("int", &self.payload.int),
                tag::FLOAT => s.field("float", &self.payload.float),
                tag::STR => s.field("str", &self.payload.str),
                _ => &mut s,
            };
        }
        s.finish()
    }
}

/// File name generated modules include
pub const HEADER_NAME: &str = "quasiquote.h";

/// Embedding header for generated modules
pub const HEADER: &str = r#"#ifndef QUASIQUOTE_H
#define QUASIQUOTE_H

#include <stddef.h>
#include <stdint.h>

#define QQ_NOTHING 0
#define QQ_BOOL 1
#define QQ_INT 2
#define QQ_FLOAT 3
#define QQ_STR 4

typedef struct {
    int32_t tag;
    union {
        int64_t i;
        double f;
        const char *s;
    } as;
} qq_value;

extern const char *__qq_error;

static inline qq_value qq_nothing(void) {
    qq_value v;
    v.tag = QQ_NOTHING;
    v.as.i = 0;
    return v;
}

static inline qq_value qq_bool(int b) {
    qq_value v;
    v.tag = QQ_BOOL;
    v.as.i = b != 0;
    return v;
}

static inline qq_value qq_int(int64_t i) {
    qq_value v;
    v.tag = QQ_INT;
    v.as.i = i;
    return v;
}

static inline qq_value qq_float(double f) {
    qq_value v;
    v.tag = QQ_FLOAT;
    v.as.f = f;
    return v;
}

static inline qq_value qq_str(const char *s) {
    qq_value v;
    v.tag = QQ_STR;
    v.as.s = s;
    return v;
}

static inline int64_t qq_as_int(qq_value v) {
    switch (v.tag) {
    case QQ_BOOL:
    case QQ_INT:
        return v.as.i;
    case QQ_FLOAT:
        return (int64_t)v.as.f;
    default:
        return 0;
    }
}

static inline double qq_as_float(qq_value v) {
    switch (v.tag) {
    case QQ_BOOL:
    case QQ_INT:
        return (double)v.as.i;
    case QQ_FLOAT:
        return v.as.f;
    default:
        return 0.0;
    }
}

static inline const char *qq_as_str(qq_value v) {
    return v.tag == QQ_STR ? v.as.s : NULL;
}

static inline int qq_truthy(qq_value v) {
    switch (v.tag) {
    case QQ_BOOL:
    case QQ_INT:
        return v.as.i != 0;
    case QQ_FLOAT:
        return v.as.f != 0.0;
    case QQ_STR:
        return v.as.s != NULL && v.as.s[0] != '\0';
    default:
        return 0;
    }
}

/* Abort the fragment; the host raises an error carrying msg */
#define qq_fail(msg) do { __qq_error = (msg); return 1; } while (0)

#endif /* QUASIQUOTE_H */
"#;

/// Read a NULL-terminated C string table of at most `count` entries.
///
/// # Safety
///
/// `table` must point to at least `count` readable pointers, each NULL or
/// a valid NUL-terminated string.
pub unsafe fn read_name_table(table: *const *const c_char, count: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(count);
    for i in 0..count {
        // SAFETY: guaranteed by the caller
        let ptr = unsafe { *table.add(i) };
        if ptr.is_null() {
            break;
        }
        // SAFETY: non-null entries are NUL-terminated strings
        let name = unsafe { CStr::from_ptr(ptr) };
        names.push(name.to_string_lossy().into_owned());
    }
    names
}

//! quasiquote runtime library
//!
//! Shared between the host and compiled C fragments:
//!
//! - `Value` for host values crossing the boundary
//! - `RawValue` and the `quasiquote.h` header describing the C ABI
//! - `Marshal` / `lift` for converting between the two
//! - `RuntimeError` for conversion failures

pub mod abi;
pub mod convert;
pub mod error;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use quasiquote_runtime::prelude::*;
///
/// let mut marshal = Marshal::new();
/// let raw = marshal.lower(&Value::I64(1)).unwrap();
/// assert_eq!(raw.tag, quasiquote_runtime::abi::tag::INT);
/// ```
pub mod prelude {
    pub use super::abi::{EntryFn, RawValue, HEADER, HEADER_NAME};
    pub use super::convert::{lift, Marshal};
    pub use super::error::{RuntimeError, RuntimeResult};
    pub use super::value::Value;
}

pub use prelude::*;

//! Conversion between host values and the C ABI
//!
//! Lowering borrows string storage from a [`Marshal`], which must outlive
//! the native call. Lifting always copies, so nothing returned by a
//! fragment is retained past the conversion.

use std::ffi::{CStr, CString};

use crate::abi::{tag, RawValue};
use crate::error::{RuntimeError, RuntimeResult};
use crate::value::Value;

/// Owner of the C strings handed to a native call
#[derive(Debug, Default)]
pub struct Marshal {
    strings: Vec<CString>,
}

impl Marshal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower a value. String payloads stay valid while `self` is alive.
    pub fn lower(&mut self, value: &Value) -> RuntimeResult<RawValue> {
        Ok(match value {
            Value::Nothing => RawValue::nothing(),
            Value::Bool(v) => RawValue::bool(*v),
            Value::I64(v) => RawValue::int(*v),
            Value::F64(v) => RawValue::float(*v),
            Value::Str(s) => {
                let c = CString::new(s.as_str())
                    .map_err(|e| RuntimeError::interior_nul(e.nul_position()))?;
                let ptr = c.as_ptr();
                // The heap buffer does not move when the Vec grows
                self.strings.push(c);
                RawValue::str(ptr)
            }
        })
    }

    /// Lower a slice of values
    pub fn lower_all<'v, I>(&mut self, values: I) -> RuntimeResult<Vec<RawValue>>
    where
        I: IntoIterator<Item = &'v Value>,
    {
        values.into_iter().map(|v| self.lower(v)).collect()
    }

    /// Number of strings currently kept alive
    pub fn retained(&self) -> usize {
        self.strings.len()
    }
}

/// Lift a raw value into an owned host value.
///
/// A NULL string pointer lifts to [`Value::Nothing`].
///
/// # Safety
///
/// If `raw` is tagged as a string, its pointer must be NULL or point to a
/// NUL-terminated string that is valid for the duration of the call.
pub unsafe fn lift(raw: &RawValue) -> RuntimeResult<Value> {
    // SAFETY: each arm reads the union field its tag selects
    unsafe {
        match raw.tag {
            tag::NOTHING => Ok(Value::Nothing),
            tag::BOOL => Ok(Value::Bool(raw.payload.int != 0)),
            tag::INT => Ok(Value::I64(raw.payload.int)),
            tag::FLOAT => Ok(Value::F64(raw.payload.float)),
            tag::STR => {
                let ptr = raw.payload.str;
                if ptr.is_null() {
                    return Ok(Value::Nothing);
                }
                CStr::from_ptr(ptr)
                    .to_str()
                    .map(|s| Value::Str(s.to_string()))
                    .map_err(|_| RuntimeError::InvalidUtf8)
            }
            other => Err(RuntimeError::invalid_tag(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_then_lift() {
        let mut marshal = Marshal::new();
        let values = [
            Value::Nothing,
            Value::Bool(true),
            Value::I64(-42),
            Value::F64(0.25),
            Value::from("héllo"),
        ];
        let raw = marshal.lower_all(&values).unwrap();
        assert_eq!(marshal.retained(), 1);

        let lifted: Vec<_> = raw.iter().map(|r| unsafe { lift(r) }.unwrap()).collect();
        assert_eq!(lifted, values);
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        let mut marshal = Marshal::new();
        let err = marshal.lower(&Value::from("a\0b")).unwrap_err();
        assert_eq!(err, RuntimeError::InteriorNul { position: 1 });
    }

    #[test]
    fn test_unknown_tag() {
        let mut raw = RawValue::int(1);
        raw.tag = 17;
        assert_eq!(unsafe { lift(&raw) }, Err(RuntimeError::InvalidTag(17)));
    }

    #[test]
    fn test_null_string_lifts_to_nothing() {
        let raw = RawValue::str(std::ptr::null());
        assert_eq!(unsafe { lift(&raw) }, Ok(Value::Nothing));
    }

    #[test]
    fn test_invalid_utf8_string() {
        let bytes = CString::new(vec![0xff, 0xfe]).unwrap();
        let raw = RawValue::str(bytes.as_ptr());
        assert_eq!(unsafe { lift(&raw) }, Err(RuntimeError::InvalidUtf8));
    }
}

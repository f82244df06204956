//! Runtime error types for the fragment boundary
//!
//! Errors raised while moving values between the host and the C ABI.

use thiserror::Error;

/// Runtime error type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A string value cannot be handed to C
    #[error("ValueError: string passed to C contains a NUL byte at index {position}")]
    InteriorNul {
        /// Byte index of the first NUL
        position: usize,
    },

    /// A compiled fragment produced a value with an unknown tag
    #[error("TypeError: compiled fragment returned a value with unknown tag {0}")]
    InvalidTag(i32),

    /// A string returned by a compiled fragment is not UTF-8
    #[error("UnicodeDecodeError: compiled fragment returned a string that is not valid UTF-8")]
    InvalidUtf8,
}

impl RuntimeError {
    /// Create an interior NUL error
    pub fn interior_nul(position: usize) -> Self {
        RuntimeError::InteriorNul { position }
    }

    /// Create an invalid tag error
    pub fn invalid_tag(tag: i32) -> Self {
        RuntimeError::InvalidTag(tag)
    }
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

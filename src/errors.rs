//! Error handling for the geometry kernel.
//!
//! Every fallible operation returns a [`GeometryError`] carrying a stable
//! error code plus a human-readable message. API misuse (out-of-range
//! indices, negative rectangle dimensions, and the like) is not an error
//! value; those panic.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed input: bad sizes, out-of-range indices, mismatched formats.
    #[serde(rename = "INVALID_ARGUMENT")]
    InvalidArgument,
    /// Input data violates a numeric precondition (non-finite values,
    /// attribute range too large to represent).
    #[serde(rename = "FAILED_PRECONDITION")]
    FailedPrecondition,
    /// An internal stage failed on input that passed up-front validation.
    #[serde(rename = "INTERNAL")]
    Internal,
    /// A referenced external resource does not exist.
    #[serde(rename = "NOT_FOUND")]
    NotFound,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            ErrorCode::FailedPrecondition => write!(f, "FAILED_PRECONDITION"),
            ErrorCode::Internal => write!(f, "INTERNAL"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
        }
    }
}

/// Error type returned by the kernel's fallible operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct GeometryError {
    pub code: ErrorCode,
    pub message: String,
}

impl GeometryError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        GeometryError {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GeometryError::new(ErrorCode::InvalidArgument, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        GeometryError::new(ErrorCode::FailedPrecondition, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        GeometryError::new(ErrorCode::Internal, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        GeometryError::new(ErrorCode::NotFound, message)
    }
}

/// Result alias used throughout the kernel.
pub type GeometryResult<T> = Result<T, GeometryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_message() {
        let err = GeometryError::invalid_argument("index count not divisible by 3");
        assert_eq!(
            err.to_string(),
            "[INVALID_ARGUMENT] index count not divisible by 3"
        );
    }

    #[test]
    fn test_error_code_serializes_to_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::FailedPrecondition).unwrap();
        assert_eq!(json, "\"FAILED_PRECONDITION\"");
    }

    #[test]
    fn test_constructors_set_code() {
        assert_eq!(
            GeometryError::internal("x").code,
            ErrorCode::Internal
        );
        assert_eq!(GeometryError::not_found("x").code, ErrorCode::NotFound);
    }
}

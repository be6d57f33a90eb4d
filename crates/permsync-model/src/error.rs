//! Model error types.

use thiserror::Error;

/// Errors raised while building model values from configuration input.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Permission value was neither `allow` nor `deny`.
    #[error("invalid permission '{value}' (expected 'allow' or 'deny')")]
    InvalidPermission { value: String },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

//! Error types shared across the FallSense crates.
//!
//! Downstream crates define their own error hierarchies and coerce
//! [`CoreError`] into them via `#[from]`; this module only covers conditions
//! that arise from the core types themselves.

use thiserror::Error;

/// Convenient `Result` alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by core type construction and classifier contracts.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A signal or window does not match the shape the consumer expects.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// A probability value is outside `[0, 1]` (or NaN).
    #[error("Invalid probability value: {value}")]
    InvalidProbability {
        /// The offending value.
        value: f64,
    },

    /// An activity code does not start with a recognised class letter.
    #[error("Invalid activity class code: `{code}` (expected leading `F` or `D`)")]
    InvalidClassCode {
        /// The offending code.
        code: String,
    },
}

impl CoreError {
    /// Construct a [`CoreError::ShapeMismatch`].
    pub fn shape_mismatch(expected: Vec<usize>, actual: Vec<usize>) -> Self {
        CoreError::ShapeMismatch { expected, actual }
    }
}

//! Observation-window embedding policies.
//!
//! The streaming replay presents the classifier with "what the system would
//! have seen by time t", padded back to the canonical trial length. Two
//! distinct placement policies exist and are deliberately kept separate:
//!
//! - [`right_aligned_prefix_embed`] (growth phase): the prefix `[0, elapsed)`
//!   is written at columns `[elapsed − 1, 2·elapsed − 1)` of the zero buffer.
//! - [`trailing_slice_embed`] (sliding phase): the trailing slice of at most
//!   `span − 1` samples is written left-aligned at column 0.
//!
//! The trained classifier's input layout depends on both placements exactly
//! as written; do not unify them.

use ndarray::Array2;
use thiserror::Error;

/// Errors produced by the window embedding functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    /// `elapsed` is zero or exceeds the available signal length.
    #[error("Elapsed sample count {elapsed} out of range (signal has {available} samples)")]
    ElapsedOutOfRange {
        /// Requested elapsed sample count.
        elapsed: usize,
        /// Samples available in the source signal.
        available: usize,
    },

    /// The embedded window would not fit into the canonical buffer.
    #[error("Window of {required} samples does not fit canonical length {canonical}")]
    DoesNotFit {
        /// Samples the placement requires.
        required: usize,
        /// Canonical buffer width.
        canonical: usize,
    },

    /// The sliding span must be at least 2 (a span of n keeps n − 1 samples).
    #[error("Sliding span must be >= 2, got {span}")]
    SpanTooSmall {
        /// The offending span.
        span: usize,
    },
}

/// Growth-phase embedding: place the prefix `[0, elapsed)` of every channel
/// into a `[channels, canonical]` zero buffer starting at column
/// `elapsed − 1`.
///
/// # Errors
///
/// - [`WindowError::ElapsedOutOfRange`] when `elapsed` is 0 or larger than
///   the signal.
/// - [`WindowError::DoesNotFit`] when `2·elapsed − 1 > canonical`.
pub fn right_aligned_prefix_embed(
    signal: &Array2<f32>,
    elapsed: usize,
    canonical: usize,
) -> Result<Array2<f32>, WindowError> {
    let available = signal.ncols();
    if elapsed == 0 || elapsed > available {
        return Err(WindowError::ElapsedOutOfRange { elapsed, available });
    }
    let end = 2 * elapsed - 1;
    if end > canonical {
        return Err(WindowError::DoesNotFit { required: end, canonical });
    }

    let channels = signal.nrows();
    let mut out = Array2::<f32>::zeros((channels, canonical));
    let offset = elapsed - 1;
    for c in 0..channels {
        for i in 0..elapsed {
            out[[c, offset + i]] = signal[[c, i]];
        }
    }
    Ok(out)
}

/// Sliding-phase embedding: place the trailing slice
/// `[max(0, elapsed − (span − 1)), elapsed)` of every channel left-aligned
/// at column 0 of a `[channels, canonical]` zero buffer.
///
/// For `elapsed >= span` the live region is always exactly `span − 1`
/// samples.
///
/// # Errors
///
/// - [`WindowError::SpanTooSmall`] when `span < 2`.
/// - [`WindowError::ElapsedOutOfRange`] when `elapsed` is 0 or larger than
///   the signal.
/// - [`WindowError::DoesNotFit`] when the live slice exceeds `canonical`.
pub fn trailing_slice_embed(
    signal: &Array2<f32>,
    elapsed: usize,
    span: usize,
    canonical: usize,
) -> Result<Array2<f32>, WindowError> {
    if span < 2 {
        return Err(WindowError::SpanTooSmall { span });
    }
    let available = signal.ncols();
    if elapsed == 0 || elapsed > available {
        return Err(WindowError::ElapsedOutOfRange { elapsed, available });
    }

    let start = elapsed.saturating_sub(span - 1);
    let live = elapsed - start;
    if live > canonical {
        return Err(WindowError::DoesNotFit { required: live, canonical });
    }

    let channels = signal.nrows();
    let mut out = Array2::<f32>::zeros((channels, canonical));
    for c in 0..channels {
        for i in 0..live {
            out[[c, i]] = signal[[c, start + i]];
        }
    }
    Ok(out)
}

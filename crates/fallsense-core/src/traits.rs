//! Core abstractions of the FallSense system.
//!
//! The streaming evaluation engine is written against [`FallClassifier`] so
//! that the replay loop can be exercised with lightweight test doubles and is
//! independent of the concrete nearest-neighbor implementation.

use ndarray::Array2;

use crate::error::CoreResult;
use crate::types::{ActivityClass, ClassProbabilities};

/// A trained fall/daily classifier queried once per replay step.
///
/// Implementations accept a single padded observation window shaped exactly
/// like a training trial (`[channels, canonical_samples]`) and must be
/// deterministic: the same window always produces the same output.
pub trait FallClassifier {
    /// Hard class decision for one observation window.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the window shape does not match
    /// the trained shape; the evaluation treats this as fatal.
    fn predict(&self, window: &Array2<f32>) -> CoreResult<ActivityClass>;

    /// Per-class probability vector for one observation window.
    ///
    /// # Errors
    ///
    /// Same contract as [`FallClassifier::predict`].
    fn predict_proba(&self, window: &Array2<f32>) -> CoreResult<ClassProbabilities>;
}

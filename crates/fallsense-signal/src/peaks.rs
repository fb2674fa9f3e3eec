//! Peak localization for ground-truth interval derivation.
//!
//! The fall event midpoint is the mean of the absolute-value peak indices of
//! the two highest-energy channels; the ground-truth interval is placed
//! symmetrically around it by the evaluation engine.

use ndarray::Array2;

use fallsense_core::utils::argmax_abs;

/// Index of the largest-magnitude sample of one channel (first on ties).
pub fn peak_index(signal: &Array2<f32>, channel: usize) -> usize {
    argmax_abs(signal.row(channel))
}

/// Fall-event midpoint: mean of the two designated channels' peak indices.
///
/// Fractional midpoints are meaningful (two peaks one sample apart yield a
/// half-sample midpoint) so the result is `f64`.
pub fn fall_midpoint(signal: &Array2<f32>, peak_channels: (usize, usize)) -> f64 {
    let a = peak_index(signal, peak_channels.0);
    let b = peak_index(signal, peak_channels.1);
    (a + b) as f64 / 2.0
}

//! Common utility functions for the FallSense system.
//!
//! Summary statistics deliberately return `Option` on empty input: the
//! reporting layer must guard empty aggregates instead of dividing by zero.

use ndarray::ArrayView1;

/// Arithmetic mean. Returns `None` on empty input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean absolute deviation from the mean (not the standard deviation).
/// Returns `None` on empty input.
#[must_use]
pub fn mean_abs_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m).abs()).sum::<f64>() / values.len() as f64)
}

/// Index of the element with the largest absolute value, first index on ties.
///
/// Matches argmax-over-|x| semantics; an empty view yields index 0, which the
/// caller must rule out (trial signals are never empty after preprocessing).
#[must_use]
pub fn argmax_abs(values: ArrayView1<'_, f32>) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        let mag = v.abs();
        if mag > best_val {
            best_val = mag;
            best_idx = i;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn mean_of_values() {
        assert_abs_diff_eq!(mean(&[500.0, 700.0]).unwrap(), 600.0);
        assert_abs_diff_eq!(mean(&[1.0]).unwrap(), 1.0);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert!(mean(&[]).is_none());
        assert!(mean_abs_dev(&[]).is_none());
    }

    #[test]
    fn mad_of_values() {
        // Mean 600, deviations |−100| and |100| -> MAD 100.
        assert_abs_diff_eq!(mean_abs_dev(&[500.0, 700.0]).unwrap(), 100.0);
        // A constant series has zero MAD.
        assert_abs_diff_eq!(mean_abs_dev(&[3.0, 3.0, 3.0]).unwrap(), 0.0);
    }

    #[test]
    fn mad_is_not_standard_deviation() {
        // {0, 0, 6}: mean 2, MAD = (2+2+4)/3 = 8/3; std would be sqrt(8) ≈ 2.83.
        assert_abs_diff_eq!(mean_abs_dev(&[0.0, 0.0, 6.0]).unwrap(), 8.0 / 3.0);
    }

    #[test]
    fn argmax_abs_finds_negative_peaks() {
        let v = array![1.0_f32, -7.5, 3.0, 7.5];
        // -7.5 and 7.5 tie in magnitude; the first wins.
        assert_eq!(argmax_abs(v.view()), 1);
    }

    #[test]
    fn argmax_abs_single_element() {
        let v = array![-2.0_f32];
        assert_eq!(argmax_abs(v.view()), 0);
    }
}

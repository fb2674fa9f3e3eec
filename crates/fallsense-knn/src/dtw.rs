//! Dynamic time warping distance between univariate series.
//!
//! Classic dynamic-programming formulation with squared-difference local cost
//! and a square-rooted accumulated distance. [`dtw_distance_banded`] adds an
//! optional Sakoe–Chiba band that constrains the warping path to a diagonal
//! corridor, trading exactness for a large constant-factor speedup on long
//! series.

/// Full (unconstrained) DTW distance between two series.
///
/// Returns `f64::INFINITY` when either input is empty.
pub fn dtw_distance(a: &[f32], b: &[f32]) -> f64 {
    dtw_impl(a, b, None)
}

/// DTW distance constrained to a Sakoe–Chiba band of half-width `band`
/// around the (scaled) diagonal.
///
/// A band of 0 only allows the diagonal itself; `dtw_distance_banded(a, b,
/// usize::MAX)` degenerates to the full distance. The banded distance is
/// always >= the full distance (it minimizes over a subset of paths).
pub fn dtw_distance_banded(a: &[f32], b: &[f32], band: usize) -> f64 {
    dtw_impl(a, b, Some(band))
}

fn dtw_impl(a: &[f32], b: &[f32], band: Option<usize>) -> f64 {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 {
        return f64::INFINITY;
    }

    // Two-row rolling DP over the accumulated cost matrix.
    let mut prev = vec![f64::INFINITY; m + 1];
    let mut curr = vec![f64::INFINITY; m + 1];
    prev[0] = 0.0;

    for i in 1..=n {
        curr.fill(f64::INFINITY);

        // Column range for this row: full, or a corridor around the scaled
        // diagonal when a band is given.
        let (lo, hi) = match band {
            None => (1, m),
            Some(r) => {
                let center = ((i - 1) * m) / n + 1;
                let lo = center.saturating_sub(r).max(1);
                let hi = center.saturating_add(r).min(m);
                (lo, hi)
            }
        };

        for j in lo..=hi {
            let d = (a[i - 1] - b[j - 1]) as f64;
            let cost = d * d;
            let best = prev[j].min(curr[j - 1]).min(prev[j - 1]);
            if best.is_finite() {
                curr[j] = cost + best;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m].sqrt()
}

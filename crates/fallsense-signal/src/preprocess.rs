//! Recording preprocessing pipeline.
//!
//! Turns a raw `[9, L]` recording into the fixed `[5, canonical]` shape the
//! classifier was trained on:
//!
//! 1. keep the five chosen channels,
//! 2. resample each channel to the largest whole-second sample count
//!    (`(L / rate) · rate`) with endpoint-preserving linear interpolation,
//! 3. zero-pad (or truncate) to the canonical length,
//! 4. smooth with a kernel-3 median filter (zero-padded edges).

use ndarray::Array2;
use std::path::Path;
use tracing::debug;

use fallsense_core::{CANONICAL_SAMPLES, CHOSEN_CHANNELS, SAMPLE_RATE_HZ};

use crate::record::{read_recording, RecordError};

// ---------------------------------------------------------------------------
// PreprocessConfig
// ---------------------------------------------------------------------------

/// Shape parameters of the preprocessing pipeline.
///
/// The defaults are the production values; tests use smaller geometries.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Sampling rate the recordings are aligned to (Hz).
    pub sample_rate_hz: usize,
    /// Fixed per-channel sample count after padding.
    pub canonical_samples: usize,
    /// Raw-column indices retained for classification.
    pub chosen_channels: Vec<usize>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        PreprocessConfig {
            sample_rate_hz: SAMPLE_RATE_HZ,
            canonical_samples: CANONICAL_SAMPLES,
            chosen_channels: CHOSEN_CHANNELS.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Keep the given raw columns, in the given order.
///
/// # Panics
///
/// Panics if a chosen index is out of range; the config is validated before
/// any trial is loaded.
pub fn select_channels(raw: &Array2<f32>, chosen: &[usize]) -> Array2<f32> {
    let samples = raw.ncols();
    let mut out = Array2::<f32>::zeros((chosen.len(), samples));
    for (row, &src) in chosen.iter().enumerate() {
        assert!(src < raw.nrows(), "chosen channel {src} out of range");
        out.row_mut(row).assign(&raw.row(src));
    }
    out
}

/// Sample count after rate alignment: the recording truncated to whole
/// seconds at `rate` Hz.
pub fn resampled_len(samples: usize, rate: usize) -> usize {
    (samples / rate) * rate
}

/// Resample every channel to `target_len` samples with endpoint-preserving
/// linear interpolation.
///
/// Output index `k` maps to the continuous source position
/// `k · (L − 1) / (target_len − 1)`, so the first and last samples are
/// preserved exactly.
pub fn resample_channels(signal: &Array2<f32>, target_len: usize) -> Array2<f32> {
    assert!(target_len > 0, "target_len must be > 0");
    let (channels, src_len) = (signal.nrows(), signal.ncols());

    if src_len == target_len {
        return signal.clone();
    }

    // Precompute interpolation positions once, reuse across channels.
    let mut weights = Vec::with_capacity(target_len);
    for k in 0..target_len {
        let pos = if target_len == 1 {
            0.0f64
        } else {
            k as f64 * (src_len - 1) as f64 / (target_len - 1) as f64
        };
        let i0 = (pos.floor() as usize).min(src_len - 1);
        let i1 = (pos.ceil() as usize).min(src_len - 1);
        let frac = (pos - pos.floor()) as f32;
        weights.push((i0, i1, frac));
    }

    let mut out = Array2::<f32>::zeros((channels, target_len));
    for c in 0..channels {
        let row = signal.row(c);
        for (k, &(i0, i1, frac)) in weights.iter().enumerate() {
            out[[c, k]] = row[i0] * (1.0 - frac) + row[i1] * frac;
        }
    }
    out
}

/// Right-pad every channel with zeros to `canonical` samples, or truncate
/// when the recording is longer.
pub fn pad_or_truncate(signal: &Array2<f32>, canonical: usize) -> Array2<f32> {
    let (channels, samples) = (signal.nrows(), signal.ncols());
    let keep = samples.min(canonical);
    let mut out = Array2::<f32>::zeros((channels, canonical));
    for c in 0..channels {
        for t in 0..keep {
            out[[c, t]] = signal[[c, t]];
        }
    }
    out
}

/// Kernel-3 median filter applied per channel, with zero-padded edges (the
/// first and last windows treat the out-of-range neighbor as 0).
pub fn median_filter_3(signal: &Array2<f32>) -> Array2<f32> {
    let (channels, samples) = (signal.nrows(), signal.ncols());
    let mut out = Array2::<f32>::zeros((channels, samples));
    for c in 0..channels {
        let row = signal.row(c);
        for t in 0..samples {
            let prev = if t > 0 { row[t - 1] } else { 0.0 };
            let next = if t + 1 < samples { row[t + 1] } else { 0.0 };
            out[[c, t]] = median3(prev, row[t], next);
        }
    }
    out
}

/// Median of three values.
fn median3(a: f32, b: f32, c: f32) -> f32 {
    a.max(b).min(a.min(b).max(c))
}

// ---------------------------------------------------------------------------
// Composed pipeline
// ---------------------------------------------------------------------------

/// Preprocess one recording file into the classifier's input shape
/// `[chosen_channels, canonical_samples]`.
///
/// # Errors
///
/// Propagates every [`RecordError`] unchanged — trial ingestion failures are
/// fatal for the whole run.
pub fn preprocess_recording(
    path: &Path,
    config: &PreprocessConfig,
) -> Result<Array2<f32>, RecordError> {
    let raw = read_recording(path)?;
    let chosen = select_channels(&raw, &config.chosen_channels);
    let target = resampled_len(chosen.ncols(), config.sample_rate_hz).max(1);
    let resampled = resample_channels(&chosen, target);
    let padded = pad_or_truncate(&resampled, config.canonical_samples);
    let smoothed = median_filter_3(&padded);
    debug!(
        path = %path.display(),
        raw_samples = raw.ncols(),
        resampled = target,
        "preprocessed recording"
    );
    Ok(smoothed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

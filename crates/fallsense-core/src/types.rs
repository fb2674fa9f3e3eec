//! Core data types for the FallSense evaluation pipeline.
//!
//! Types should make intent obvious: every concept that crosses a component
//! boundary gets a named type rather than a raw tuple. Arrays are stored
//! channel-major (`[channels, samples]`) in row-major (C) order.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// ActivityClass
// ---------------------------------------------------------------------------

/// Superclass of a recorded activity.
///
/// SisFall-style activity codes start with `F` (fall) or `D` (activity of
/// daily living). Only fall trials are replayed by the streaming engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityClass {
    /// A fall recording (`F01`..`F15`).
    Fall,
    /// A daily-living recording (`D01`..`D19`).
    Daily,
}

impl ActivityClass {
    /// Parse the superclass from the leading character of an activity code.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidClassCode`] for anything other than
    /// `F`/`D` (case sensitive, matching the dataset's naming scheme).
    pub fn from_code(code: &str) -> CoreResult<Self> {
        match code.chars().next() {
            Some('F') => Ok(ActivityClass::Fall),
            Some('D') => Ok(ActivityClass::Daily),
            _ => Err(CoreError::InvalidClassCode { code: code.to_string() }),
        }
    }

    /// Returns `true` for the fall superclass.
    pub fn is_fall(&self) -> bool {
        matches!(self, ActivityClass::Fall)
    }
}

impl fmt::Display for ActivityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityClass::Fall => write!(f, "fall"),
            ActivityClass::Daily => write!(f, "daily"),
        }
    }
}

// ---------------------------------------------------------------------------
// TrialMeta / Trial
// ---------------------------------------------------------------------------

/// Filename-derived metadata of one recording.
///
/// Recordings are named `{activity}_{subject}_{trial}`, e.g. `F03_SA07_R02`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialMeta {
    /// Fall / daily superclass, derived from the activity code.
    pub class: ActivityClass,
    /// Specific activity code (e.g. `F03`).
    pub activity: String,
    /// Subject identifier (e.g. `SA07`).
    pub subject: String,
    /// Trial identifier within subject and activity (e.g. `R02`).
    pub trial: String,
}

impl TrialMeta {
    /// Canonical `{activity}_{subject}_{trial}` name, used for report lines
    /// and plot file names.
    pub fn name(&self) -> String {
        format!("{}_{}_{}", self.activity, self.subject, self.trial)
    }
}

impl fmt::Display for TrialMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One preprocessed recording: a fixed-shape channel-major signal plus its
/// metadata. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Trial {
    /// Channel-major signal, shape `[channels, samples]`.
    pub signal: Array2<f32>,
    /// Filename-derived metadata.
    pub meta: TrialMeta,
}

impl Trial {
    /// Create a trial, checking that the signal matches the expected shape.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] when the signal does not have
    /// `channels` rows and `samples` columns.
    pub fn new(
        signal: Array2<f32>,
        meta: TrialMeta,
        channels: usize,
        samples: usize,
    ) -> CoreResult<Self> {
        if signal.shape() != [channels, samples] {
            return Err(CoreError::shape_mismatch(
                vec![channels, samples],
                signal.shape().to_vec(),
            ));
        }
        Ok(Trial { signal, meta })
    }

    /// Number of sensor channels.
    pub fn channels(&self) -> usize {
        self.signal.nrows()
    }

    /// Number of samples per channel.
    pub fn samples(&self) -> usize {
        self.signal.ncols()
    }
}

// ---------------------------------------------------------------------------
// ClassProbabilities
// ---------------------------------------------------------------------------

/// Per-class probability vector returned by [`crate::traits::FallClassifier::predict_proba`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// Probability of the daily-living class.
    pub p_daily: f64,
    /// Probability of the fall class.
    pub p_fall: f64,
}

impl ClassProbabilities {
    /// Create a probability vector, validating that both entries lie in
    /// `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProbability`] for out-of-range values.
    pub fn new(p_daily: f64, p_fall: f64) -> CoreResult<Self> {
        for &p in &[p_daily, p_fall] {
            if !(0.0..=1.0).contains(&p) || p.is_nan() {
                return Err(CoreError::InvalidProbability { value: p });
            }
        }
        Ok(ClassProbabilities { p_daily, p_fall })
    }

    /// Threshold the fall probability into a hard decision.
    ///
    /// A probability exactly equal to `threshold` counts as a fall decision
    /// (`>=`, not `>`).
    pub fn decide(&self, threshold: f64) -> ActivityClass {
        if self.p_fall >= threshold {
            ActivityClass::Fall
        } else {
            ActivityClass::Daily
        }
    }
}

// ---------------------------------------------------------------------------
// FallInterval
// ---------------------------------------------------------------------------

/// Ground-truth fall phase of one trial, symmetric around the peak midpoint
/// with fixed pre/post offsets.
///
/// Stored both in samples (for interval derivation tests) and milliseconds
/// (what the replay loop compares elapsed time against).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallInterval {
    /// Interval start in samples (may be fractional: the midpoint is a mean
    /// of two peak indices).
    pub start_sample: f64,
    /// Interval end in samples.
    pub end_sample: f64,
    /// Interval start in milliseconds.
    pub start_ms: f64,
    /// Interval end in milliseconds.
    pub end_ms: f64,
}

impl FallInterval {
    /// Derive the interval from a peak midpoint.
    ///
    /// `start = midpoint − pre`, `end = midpoint + post`, converted to
    /// milliseconds at `sample_rate_hz`.
    pub fn from_midpoint(
        midpoint_sample: f64,
        pre_samples: f64,
        post_samples: f64,
        sample_rate_hz: usize,
    ) -> Self {
        let start_sample = midpoint_sample - pre_samples;
        let end_sample = midpoint_sample + post_samples;
        let ms_per_sample = 1000.0 / sample_rate_hz as f64;
        FallInterval {
            start_sample,
            end_sample,
            start_ms: start_sample * ms_per_sample,
            end_ms: end_sample * ms_per_sample,
        }
    }

    /// Whether an elapsed time (ms) falls inside the labeled fall phase.
    /// Both endpoints are inclusive.
    pub fn contains_ms(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.start_ms && elapsed_ms <= self.end_ms
    }
}

// ---------------------------------------------------------------------------
// ProbabilityTrace
// ---------------------------------------------------------------------------

/// One point of a probability-over-time trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Elapsed observation time in milliseconds.
    pub elapsed_ms: f64,
    /// Fall-class probability reported at that time.
    pub p_fall: f64,
}

/// Append-only ordered sequence of `(elapsed_ms, p_fall)` pairs for one
/// trial, produced once by the replay loop and consumed by metric
/// computation and plotting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbabilityTrace {
    points: Vec<TracePoint>,
}

impl ProbabilityTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        ProbabilityTrace { points: Vec::new() }
    }

    /// Create an empty trace with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        ProbabilityTrace { points: Vec::with_capacity(capacity) }
    }

    /// Append one observation point. Points must be pushed in chronological
    /// order; the replay loop guarantees this.
    pub fn push(&mut self, elapsed_ms: f64, p_fall: f64) {
        self.points.push(TracePoint { elapsed_ms, p_fall });
    }

    /// All recorded points in insertion order.
    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when no point has been recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TrialMetrics
// ---------------------------------------------------------------------------

/// Derived metrics of one successfully evaluated trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialMetrics {
    /// Detection latency in milliseconds: the first non-negative offset of a
    /// threshold crossing from the interval start. `None` when no crossing
    /// occurred at or after the fall phase began.
    pub latency_ms: Option<f64>,
    /// False-positive rate over the replay steps outside the fall interval.
    pub fpr: f64,
    /// False-negative rate over the replay steps inside the fall interval.
    pub fnr: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn activity_class_from_code() {
        assert_eq!(ActivityClass::from_code("F03").unwrap(), ActivityClass::Fall);
        assert_eq!(ActivityClass::from_code("D11").unwrap(), ActivityClass::Daily);
        assert!(ActivityClass::from_code("X01").is_err());
        assert!(ActivityClass::from_code("").is_err());
    }

    #[test]
    fn trial_meta_name_round_trip() {
        let meta = TrialMeta {
            class: ActivityClass::Fall,
            activity: "F03".into(),
            subject: "SA07".into(),
            trial: "R02".into(),
        };
        assert_eq!(meta.name(), "F03_SA07_R02");
    }

    #[test]
    fn trial_shape_is_checked() {
        let meta = TrialMeta {
            class: ActivityClass::Daily,
            activity: "D01".into(),
            subject: "SA01".into(),
            trial: "R01".into(),
        };
        let ok = Trial::new(Array2::zeros((5, 100)), meta.clone(), 5, 100);
        assert!(ok.is_ok());
        let bad = Trial::new(Array2::zeros((5, 99)), meta, 5, 100);
        assert!(matches!(bad, Err(CoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn probability_validation() {
        assert!(ClassProbabilities::new(0.5, 0.5).is_ok());
        assert!(ClassProbabilities::new(-0.1, 0.5).is_err());
        assert!(ClassProbabilities::new(0.1, 1.5).is_err());
        assert!(ClassProbabilities::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn decision_threshold_is_inclusive() {
        let threshold = 0.391_454_345_158_036_95;
        let exactly = ClassProbabilities::new(1.0 - threshold, threshold).unwrap();
        assert_eq!(exactly.decide(threshold), ActivityClass::Fall);
        let below = ClassProbabilities::new(0.7, threshold - 1e-12).unwrap();
        assert_eq!(below.decide(threshold), ActivityClass::Daily);
    }

    #[test]
    fn fall_interval_from_midpoint() {
        // Midpoint 2000 at 200 Hz with the production offsets:
        // [1885, 2128] samples -> [9425, 10640] ms.
        let interval = FallInterval::from_midpoint(2000.0, 115.0, 128.0, 200);
        assert_abs_diff_eq!(interval.start_sample, 1885.0);
        assert_abs_diff_eq!(interval.end_sample, 2128.0);
        assert_abs_diff_eq!(interval.start_ms, 9425.0);
        assert_abs_diff_eq!(interval.end_ms, 10640.0);
        assert!(interval.start_sample < interval.end_sample);
    }

    #[test]
    fn fall_interval_contains_is_inclusive() {
        let interval = FallInterval::from_midpoint(2000.0, 115.0, 128.0, 200);
        assert!(interval.contains_ms(9425.0));
        assert!(interval.contains_ms(10640.0));
        assert!(interval.contains_ms(10050.0));
        assert!(!interval.contains_ms(9424.9));
        assert!(!interval.contains_ms(10640.1));
    }

    #[test]
    fn trace_preserves_order() {
        let mut trace = ProbabilityTrace::new();
        trace.push(500.0, 0.1);
        trace.push(600.0, 0.2);
        trace.push(700.0, 0.9);
        assert_eq!(trace.len(), 3);
        let times: Vec<f64> = trace.points().iter().map(|p| p.elapsed_ms).collect();
        assert_eq!(times, vec![500.0, 600.0, 700.0]);
    }
}

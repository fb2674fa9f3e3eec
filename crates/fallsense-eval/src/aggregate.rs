//! Running metric aggregation.
//!
//! Aggregates are explicit values owned by the runner and passed into the
//! reporting layer — never module-level state — so a single fold can be
//! evaluated in isolation without cross-fold contamination. Series are
//! append-only; means and mean absolute deviations are computed once, at
//! summary time, and only when the series is non-empty.

use fallsense_core::utils::{mean, mean_abs_dev};

use crate::engine::TrialOutcome;

// ---------------------------------------------------------------------------
// MetricSeries
// ---------------------------------------------------------------------------

/// Append-only list of one metric's per-trial values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    values: Vec<f64>,
}

/// Mean / mean-absolute-deviation summary of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    /// Arithmetic mean of the recorded values.
    pub mean: f64,
    /// Mean absolute deviation from the mean (not the standard deviation).
    pub mad: f64,
    /// Number of recorded values.
    pub count: usize,
}

impl MetricSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        MetricSeries::default()
    }

    /// Append one value.
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Recorded values in insertion order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of recorded values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean / MAD summary, or `None` when the series is empty.
    ///
    /// The `None` is the division-by-zero guard: callers log "none recorded"
    /// instead of averaging an empty list.
    pub fn summary(&self) -> Option<MetricSummary> {
        Some(MetricSummary {
            mean: mean(&self.values)?,
            mad: mean_abs_dev(&self.values)?,
            count: self.values.len(),
        })
    }

    /// Append every value of `other`.
    pub fn extend_from(&mut self, other: &MetricSeries) {
        self.values.extend_from_slice(&other.values);
    }
}

// ---------------------------------------------------------------------------
// ScopeAggregates
// ---------------------------------------------------------------------------

/// Running aggregates of one scope (a single subject fold, or the corpus).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeAggregates {
    /// Latencies of evaluated trials that produced one, in milliseconds.
    pub latency_ms: MetricSeries,
    /// False-positive rates of all evaluated trials.
    pub fpr: MetricSeries,
    /// False-negative rates of all evaluated trials.
    pub fnr: MetricSeries,
    /// Trials discarded for an early peak.
    pub discarded_early_peak: usize,
    /// Trials discarded for degenerate confusion counts.
    pub discarded_degenerate: usize,
    /// Trials fully evaluated.
    pub evaluated: usize,
}

impl ScopeAggregates {
    /// Create an empty scope.
    pub fn new() -> Self {
        ScopeAggregates::default()
    }

    /// Fold one trial outcome into the running aggregates.
    ///
    /// FPR/FNR are recorded for every evaluated trial; the latency series
    /// only grows when the trial produced a non-negative crossing, so the
    /// three series may have different lengths.
    pub fn record(&mut self, outcome: &TrialOutcome) {
        match outcome {
            TrialOutcome::NotApplicable => {}
            TrialOutcome::DiscardedEarlyPeak { .. } => {
                self.discarded_early_peak += 1;
            }
            TrialOutcome::DiscardedDegenerate { .. } => {
                self.discarded_degenerate += 1;
            }
            TrialOutcome::Evaluated(eval) => {
                self.evaluated += 1;
                if let Some(latency) = eval.metrics.latency_ms {
                    self.latency_ms.push(latency);
                }
                self.fpr.push(eval.metrics.fpr);
                self.fnr.push(eval.metrics.fnr);
            }
        }
    }

    /// Merge another scope (e.g. a completed subject fold) into this one.
    pub fn merge(&mut self, other: &ScopeAggregates) {
        self.latency_ms.extend_from(&other.latency_ms);
        self.fpr.extend_from(&other.fpr);
        self.fnr.extend_from(&other.fnr);
        self.discarded_early_peak += other.discarded_early_peak;
        self.discarded_degenerate += other.discarded_degenerate;
        self.evaluated += other.evaluated;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

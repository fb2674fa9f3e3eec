//! Streaming evaluation engine.
//!
//! [`evaluate_trial`] replays one held-out fall trial as the detector would
//! have seen it: a growth phase of expanding prefixes followed by a sliding
//! phase of fixed-span trailing windows, querying the classifier at every
//! step and comparing each decision against the ground-truth fall interval.
//!
//! The per-trial lifecycle is an explicit state machine with terminal states
//! expressed as [`TrialOutcome`] variants. Skippable conditions (non-fall
//! trial, early peak, degenerate confusion counts) never surface as errors;
//! classifier failures and impossible window geometry are fatal and
//! propagate.
//!
//! The function is pure apart from classifier inference: no I/O, no shared
//! state. Identical inputs always produce identical traces and metrics.

use tracing::debug;

use fallsense_core::{FallClassifier, FallInterval, ProbabilityTrace, Trial, TrialMetrics};
use fallsense_signal::{fall_midpoint, right_aligned_prefix_embed, trailing_slice_embed};

use crate::config::EvalConfig;
use crate::error::EvalResult;

// ---------------------------------------------------------------------------
// TrialOutcome
// ---------------------------------------------------------------------------

/// Terminal state of one trial's evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    /// The trial is not a fall recording; nothing was replayed.
    NotApplicable,

    /// The peak midpoint lies before the early-peak guard; the trial is
    /// counted as discarded and not replayed.
    DiscardedEarlyPeak {
        /// The too-early midpoint, in samples.
        midpoint_sample: f64,
    },

    /// The replay never produced both positive and negative instances, so no
    /// FPR/FNR can be computed. The trace is still available for plotting.
    DiscardedDegenerate {
        /// Ground-truth interval of the trial.
        interval: FallInterval,
        /// Probability trace recorded during the replay.
        trace: ProbabilityTrace,
    },

    /// The trial was fully evaluated.
    Evaluated(TrialEvaluation),
}

/// Full result of a successfully evaluated trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialEvaluation {
    /// Ground-truth interval the metrics were computed against.
    pub interval: FallInterval,
    /// Probability trace recorded during the replay.
    pub trace: ProbabilityTrace,
    /// Latency / FPR / FNR triple.
    pub metrics: TrialMetrics,
}

// ---------------------------------------------------------------------------
// Replay state
// ---------------------------------------------------------------------------

/// Confusion counts and latency candidates accumulated across replay steps.
struct ReplayState {
    trace: ProbabilityTrace,
    positives: usize,
    negatives: usize,
    false_negatives: usize,
    false_positives: usize,
    /// Offsets of every threshold crossing from the interval start, in
    /// chronological order. May contain negative values (crossings before
    /// the labeled fall phase).
    latency_candidates: Vec<f64>,
}

impl ReplayState {
    fn new(capacity: usize) -> Self {
        ReplayState {
            trace: ProbabilityTrace::with_capacity(capacity),
            positives: 0,
            negatives: 0,
            false_negatives: 0,
            false_positives: 0,
            latency_candidates: Vec::new(),
        }
    }

    /// Fold one replay step into the running counts.
    fn observe(&mut self, elapsed_ms: f64, p_fall: f64, interval: &FallInterval, threshold: f64) {
        self.trace.push(elapsed_ms, p_fall);

        let fall_decision = p_fall >= threshold;
        if fall_decision {
            self.latency_candidates.push(elapsed_ms - interval.start_ms);
        }

        if interval.contains_ms(elapsed_ms) {
            self.positives += 1;
            if !fall_decision {
                self.false_negatives += 1;
            }
        } else {
            self.negatives += 1;
            if fall_decision {
                self.false_positives += 1;
            }
        }
    }

    /// First non-negative latency candidate, scanning chronologically.
    fn latency_ms(&self) -> Option<f64> {
        self.latency_candidates.iter().copied().find(|&l| l >= 0.0)
    }
}

// ---------------------------------------------------------------------------
// evaluate_trial
// ---------------------------------------------------------------------------

/// Replay one trial against a trained classifier and derive its metrics.
///
/// See the module docs for the state machine; the replay schedule and all
/// numeric policy come from `config`, which must have been validated.
///
/// # Errors
///
/// Classifier failures (shape contract violations) and window-embedding
/// range errors are fatal and propagate; they indicate a misconfigured run,
/// not a property of the trial.
pub fn evaluate_trial(
    trial: &Trial,
    classifier: &dyn FallClassifier,
    config: &EvalConfig,
) -> EvalResult<TrialOutcome> {
    // 1. Only fall trials are replayed.
    if !trial.meta.class.is_fall() {
        return Ok(TrialOutcome::NotApplicable);
    }

    // 2./3. Peak localization and the early-peak guard.
    let midpoint = fall_midpoint(&trial.signal, config.peak_channels);
    if midpoint < config.early_peak_guard_samples {
        debug!(
            trial = %trial.meta,
            midpoint, "discarding trial: peak before guard"
        );
        return Ok(TrialOutcome::DiscardedEarlyPeak { midpoint_sample: midpoint });
    }

    // 4. Ground-truth interval around the midpoint.
    let interval = FallInterval::from_midpoint(
        midpoint,
        config.interval_pre_samples,
        config.interval_post_samples,
        config.sample_rate_hz,
    );

    let mut state = ReplayState::new(config.replay_steps());

    // 5a. Growth phase: expanding prefixes, right-aligned placement.
    let mut elapsed = config.growth_start;
    while elapsed < config.growth_end {
        let window =
            right_aligned_prefix_embed(&trial.signal, elapsed, config.canonical_samples)
                .map_err(fallsense_signal::SignalError::from)?;
        let probs = classifier.predict_proba(&window)?;
        state.observe(
            config.elapsed_ms(elapsed),
            probs.p_fall,
            &interval,
            config.decision_threshold,
        );
        elapsed += config.growth_step;
    }

    // 5b. Sliding phase: fixed-span trailing windows, left-aligned placement.
    let mut elapsed = config.slide_span;
    while elapsed <= config.slide_end {
        let window = trailing_slice_embed(
            &trial.signal,
            elapsed,
            config.slide_span,
            config.canonical_samples,
        )
        .map_err(fallsense_signal::SignalError::from)?;
        let probs = classifier.predict_proba(&window)?;
        state.observe(
            config.elapsed_ms(elapsed),
            probs.p_fall,
            &interval,
            config.decision_threshold,
        );
        elapsed += config.slide_step;
    }

    // 6. Metric finalization.
    if state.positives == 0 || state.negatives == 0 {
        debug!(
            trial = %trial.meta,
            positives = state.positives,
            negatives = state.negatives,
            "discarding trial: degenerate confusion counts"
        );
        return Ok(TrialOutcome::DiscardedDegenerate { interval, trace: state.trace });
    }

    let metrics = TrialMetrics {
        latency_ms: state.latency_ms(),
        fpr: state.false_positives as f64 / state.negatives as f64,
        fnr: state.false_negatives as f64 / state.positives as f64,
    };
    debug!(
        trial = %trial.meta,
        latency = ?metrics.latency_ms,
        fpr = metrics.fpr,
        fnr = metrics.fnr,
        "evaluated trial"
    );

    Ok(TrialOutcome::Evaluated(TrialEvaluation {
        interval,
        trace: state.trace,
        metrics,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fallsense_core::{
        ActivityClass, ClassProbabilities, CoreResult, TrialMeta, DECISION_THRESHOLD,
    };
    use ndarray::Array2;

    /// Config identical to production except for a shorter canonical buffer,
    /// so the scripted replays stay fast.
    fn test_config() -> EvalConfig {
        let mut cfg = EvalConfig::default();
        cfg.canonical_samples = 6000;
        cfg.validate().unwrap();
        cfg
    }

    /// A trial whose peak channels spike at `peak` and whose third channel is
    /// a sample-index ramp the scripted classifier can decode elapsed time
    /// from (the last live window sample always carries value `elapsed − 1`).
    fn ramp_trial(peak: usize, samples: usize, class: ActivityClass) -> Trial {
        let mut signal = Array2::<f32>::zeros((5, samples));
        for t in 0..samples {
            signal[[2, t]] = t as f32;
        }
        signal[[0, peak]] = 1e6;
        signal[[1, peak]] = -1e6;
        Trial {
            signal,
            meta: TrialMeta {
                class,
                activity: if class.is_fall() { "F01".into() } else { "D01".into() },
                subject: "SA01".into(),
                trial: "R01".into(),
            },
        }
    }

    /// Test double that reports `p_inside` once the decoded elapsed time (ms)
    /// reaches `fire_at_ms`, and `p_outside` before.
    struct ScriptedClassifier {
        fire_at_ms: f64,
        p_inside: f64,
        p_outside: f64,
    }

    impl ScriptedClassifier {
        fn decode_elapsed_ms(window: &Array2<f32>) -> f64 {
            // The ramp channel's maximum is the last live sample, value
            // elapsed − 1 (the peak spike lives on channels 0/1 only).
            let max = window
                .row(2)
                .iter()
                .fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
            (max as f64 + 1.0) * 5.0
        }
    }

    impl FallClassifier for ScriptedClassifier {
        fn predict(&self, window: &Array2<f32>) -> CoreResult<ActivityClass> {
            Ok(self.predict_proba(window)?.decide(DECISION_THRESHOLD))
        }

        fn predict_proba(&self, window: &Array2<f32>) -> CoreResult<ClassProbabilities> {
            let p = if Self::decode_elapsed_ms(window) >= self.fire_at_ms {
                self.p_inside
            } else {
                self.p_outside
            };
            ClassProbabilities::new(1.0 - p, p)
        }
    }

    #[test]
    fn non_fall_trials_are_not_applicable() {
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Daily);
        let clf = ScriptedClassifier { fire_at_ms: 0.0, p_inside: 0.9, p_outside: 0.9 };
        assert_eq!(
            evaluate_trial(&trial, &clf, &cfg).unwrap(),
            TrialOutcome::NotApplicable
        );
    }

    #[test]
    fn early_peak_is_discarded() {
        let cfg = test_config();
        let trial = ramp_trial(1000, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: 0.0, p_inside: 0.9, p_outside: 0.9 };
        match evaluate_trial(&trial, &clf, &cfg).unwrap() {
            TrialOutcome::DiscardedEarlyPeak { midpoint_sample } => {
                assert_abs_diff_eq!(midpoint_sample, 1000.0);
            }
            other => panic!("expected early-peak discard, got {other:?}"),
        }
    }

    #[test]
    fn boundary_midpoint_is_not_discarded() {
        let cfg = test_config();
        // Midpoint exactly at the guard must be evaluated (the guard is `<`).
        let trial = ramp_trial(1500, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: 7000.0, p_inside: 0.9, p_outside: 0.0 };
        assert!(matches!(
            evaluate_trial(&trial, &clf, &cfg).unwrap(),
            TrialOutcome::Evaluated(_)
        ));
    }

    #[test]
    fn detector_firing_at_10050ms_yields_625ms_latency() {
        // Peak midpoint 2000 -> interval [9425, 10640] ms; first crossing at
        // 10050 ms -> latency 625 ms.
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: 10050.0, p_inside: 0.5, p_outside: 0.0 };

        let outcome = evaluate_trial(&trial, &clf, &cfg).unwrap();
        let eval = match outcome {
            TrialOutcome::Evaluated(e) => e,
            other => panic!("expected evaluation, got {other:?}"),
        };

        assert_abs_diff_eq!(eval.interval.start_ms, 9425.0);
        assert_abs_diff_eq!(eval.interval.end_ms, 10640.0);
        assert_abs_diff_eq!(eval.metrics.latency_ms.unwrap(), 625.0);

        // Steps inside [9425, 10640] ms are s = 1885, 1890, …, 2125 -> 49
        // positives. Of those, s < 2010 predicted non-fall -> 25 false
        // negatives. Fall decisions outside the interval are s = 2130…3000
        // -> 175 false positives out of 446 − 49 = 397 negatives.
        assert_abs_diff_eq!(eval.metrics.fnr, 25.0 / 49.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval.metrics.fpr, 175.0 / 397.0, epsilon = 1e-12);
        assert_eq!(eval.trace.len(), cfg.replay_steps());
    }

    #[test]
    fn probability_equal_to_threshold_crosses() {
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Fall);
        // Fires with exactly the threshold probability from the very first
        // step: every step is a fall decision.
        let clf = ScriptedClassifier {
            fire_at_ms: 0.0,
            p_inside: DECISION_THRESHOLD,
            p_outside: DECISION_THRESHOLD,
        };

        let eval = match evaluate_trial(&trial, &clf, &cfg).unwrap() {
            TrialOutcome::Evaluated(e) => e,
            other => panic!("expected evaluation, got {other:?}"),
        };

        // Every out-of-interval step is a false positive, no false negatives.
        assert_abs_diff_eq!(eval.metrics.fpr, 1.0);
        assert_abs_diff_eq!(eval.metrics.fnr, 0.0);
        // The first crossing at/after the interval start is s = 1885
        // (9425 ms), i.e. zero latency.
        assert_abs_diff_eq!(eval.metrics.latency_ms.unwrap(), 0.0);
    }

    #[test]
    fn never_firing_records_rates_without_latency() {
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: f64::INFINITY, p_inside: 0.9, p_outside: 0.0 };

        let eval = match evaluate_trial(&trial, &clf, &cfg).unwrap() {
            TrialOutcome::Evaluated(e) => e,
            other => panic!("expected evaluation, got {other:?}"),
        };
        assert!(eval.metrics.latency_ms.is_none());
        assert_abs_diff_eq!(eval.metrics.fpr, 0.0);
        assert_abs_diff_eq!(eval.metrics.fnr, 1.0);
    }

    #[test]
    fn pre_interval_crossings_are_skipped_for_latency() {
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Fall);
        // Fires from 5000 ms on: crossings before 9425 ms have negative
        // offsets and must not be reported as the latency.
        let clf = ScriptedClassifier { fire_at_ms: 5000.0, p_inside: 0.9, p_outside: 0.0 };

        let eval = match evaluate_trial(&trial, &clf, &cfg).unwrap() {
            TrialOutcome::Evaluated(e) => e,
            other => panic!("expected evaluation, got {other:?}"),
        };
        assert_abs_diff_eq!(eval.metrics.latency_ms.unwrap(), 0.0);
        assert_abs_diff_eq!(eval.metrics.fnr, 0.0);
    }

    #[test]
    fn interval_beyond_replay_horizon_is_degenerate() {
        let cfg = test_config();
        // Peak at sample 5000: the interval starts after the replay's last
        // step (3000 samples), so no positive instances can occur.
        let trial = ramp_trial(5000, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: 0.0, p_inside: 0.0, p_outside: 0.0 };

        match evaluate_trial(&trial, &clf, &cfg).unwrap() {
            TrialOutcome::DiscardedDegenerate { trace, .. } => {
                // The trace is still complete for plotting.
                assert_eq!(trace.len(), cfg.replay_steps());
            }
            other => panic!("expected degenerate discard, got {other:?}"),
        }
    }

    #[test]
    fn replay_is_idempotent() {
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: 10050.0, p_inside: 0.5, p_outside: 0.1 };
        let a = evaluate_trial(&trial, &clf, &cfg).unwrap();
        let b = evaluate_trial(&trial, &clf, &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trace_times_follow_both_phases() {
        let cfg = test_config();
        let trial = ramp_trial(2000, cfg.canonical_samples, ActivityClass::Fall);
        let clf = ScriptedClassifier { fire_at_ms: 0.0, p_inside: 0.9, p_outside: 0.9 };

        let eval = match evaluate_trial(&trial, &clf, &cfg).unwrap() {
            TrialOutcome::Evaluated(e) => e,
            other => panic!("expected evaluation, got {other:?}"),
        };
        let points = eval.trace.points();
        // First growth step: 100 samples -> 500 ms; growth stride 100 ms.
        assert_abs_diff_eq!(points[0].elapsed_ms, 500.0);
        assert_abs_diff_eq!(points[1].elapsed_ms, 600.0);
        // First sliding step: 1000 samples -> 5000 ms; sliding stride 25 ms.
        assert_abs_diff_eq!(points[45].elapsed_ms, 5000.0);
        assert_abs_diff_eq!(points[46].elapsed_ms, 5025.0);
        // Last step: 3000 samples -> 15000 ms.
        assert_abs_diff_eq!(points.last().unwrap().elapsed_ms, 15000.0);
    }
}

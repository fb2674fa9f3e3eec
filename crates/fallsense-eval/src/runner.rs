//! Evaluation run orchestration.
//!
//! Strictly sequential: one subject fold at a time, one test trial at a
//! time, one replay step at a time. The runner owns the aggregate values and
//! threads them through the engine and the reporting layer; fold classifiers
//! are obtained through the model cache and dropped when the fold completes.

use std::path::PathBuf;
use tracing::{info, warn};

use fallsense_core::Trial;
use fallsense_knn::{DtwKnnClassifier, ModelCache};

use crate::aggregate::ScopeAggregates;
use crate::config::EvalConfig;
use crate::dataset::{SisFallDataset, SyntheticConfig, SyntheticDataset};
use crate::engine::{evaluate_trial, TrialOutcome};
use crate::error::EvalResult;
use crate::partition::{leave_one_subject_out, subject_groups, Fold};
use crate::plot::plot_probability_trace;
use crate::report::{CorpusReporter, SubjectReporter};

// ---------------------------------------------------------------------------
// CorpusReport
// ---------------------------------------------------------------------------

/// Programmatic result of a full evaluation run.
#[derive(Debug, Clone)]
pub struct CorpusReport {
    /// Corpus-wide aggregates across every evaluated fold.
    pub corpus: ScopeAggregates,
    /// Per-subject aggregates, in fold order.
    pub subjects: Vec<(String, ScopeAggregates)>,
}

// ---------------------------------------------------------------------------
// EvaluationRunner
// ---------------------------------------------------------------------------

/// Drives the full leave-one-subject-out streaming evaluation.
pub struct EvaluationRunner {
    config: EvalConfig,
    cache: ModelCache,
}

impl EvaluationRunner {
    /// Create a runner for a validated configuration.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the model directory cannot
    /// be created.
    pub fn new(config: EvalConfig) -> EvalResult<Self> {
        config.validate()?;
        let cache = ModelCache::new(&config.model_dir)?;
        Ok(EvaluationRunner { config, cache })
    }

    /// Load the corpus from a SisFall-style directory tree and evaluate it.
    ///
    /// # Errors
    ///
    /// Fatal on dataset, model, report, or plot failures.
    pub fn run_from_dir(&self, root: &std::path::Path) -> EvalResult<CorpusReport> {
        let trials = SisFallDataset::load(root, &self.config)?;
        self.run(&trials)
    }

    /// Generate the deterministic synthetic corpus and evaluate it.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`EvaluationRunner::run`].
    pub fn run_dry(&self, synthetic: &SyntheticConfig) -> EvalResult<CorpusReport> {
        let trials = SyntheticDataset::generate(synthetic);
        self.run(&trials)
    }

    /// Evaluate an already-loaded corpus.
    ///
    /// # Errors
    ///
    /// Fatal on model, report, or plot failures; skippable per-trial
    /// conditions are absorbed into the aggregates.
    pub fn run(&self, trials: &[Trial]) -> EvalResult<CorpusReport> {
        let (evaluated_group, reserved) = subject_groups(trials, self.config.adult_subject_count);
        info!(
            evaluated = evaluated_group.len(),
            reserved = reserved.len(),
            "partitioned subjects"
        );
        if evaluated_group.is_empty() {
            warn!("no subjects to evaluate");
        }

        let folds = leave_one_subject_out(trials, &evaluated_group);
        let mut corpus = ScopeAggregates::new();
        let mut subjects = Vec::with_capacity(folds.len());

        for fold in &folds {
            let subject_aggregates = self.run_fold(trials, fold)?;
            corpus.merge(&subject_aggregates);
            subjects.push((fold.held_out.clone(), subject_aggregates));
        }

        let mut corpus_reporter = CorpusReporter::open(&self.config.report_dir)?;
        corpus_reporter.write_summary(&corpus)?;
        info!(
            evaluated = corpus.evaluated,
            discarded_early = corpus.discarded_early_peak,
            discarded_degenerate = corpus.discarded_degenerate,
            "evaluation complete"
        );

        Ok(CorpusReport { corpus, subjects })
    }

    /// Evaluate one fold: train or load the classifier, replay every test
    /// trial, report and plot as it goes, and return the fold's aggregates.
    fn run_fold(&self, trials: &[Trial], fold: &Fold) -> EvalResult<ScopeAggregates> {
        info!(
            subject = fold.held_out.as_str(),
            train = fold.train_indices.len(),
            test = fold.test_indices.len(),
            "evaluating fold"
        );

        let classifier = self.cache.get_or_train(&fold.held_out, || {
            DtwKnnClassifier::fit(
                fold.train_indices.iter().map(|&i| &trials[i]),
                self.config.dtw_band,
            )
        })?;

        let mut reporter = SubjectReporter::open(&self.config.report_dir, &fold.held_out)?;
        let mut aggregates = ScopeAggregates::new();

        for &idx in &fold.test_indices {
            let trial = &trials[idx];
            let outcome = evaluate_trial(trial, &classifier, &self.config)?;

            aggregates.record(&outcome);
            reporter.record(&trial.meta, &outcome, &aggregates)?;
            self.plot_outcome(trial, &outcome)?;
        }

        reporter.write_summary(&aggregates)?;
        Ok(aggregates)
    }

    /// Write the probability-trace figure for replayed trials.
    fn plot_outcome(&self, trial: &Trial, outcome: &TrialOutcome) -> EvalResult<()> {
        let (trace, interval) = match outcome {
            TrialOutcome::Evaluated(eval) => (&eval.trace, &eval.interval),
            TrialOutcome::DiscardedDegenerate { trace, interval } => (trace, interval),
            _ => return Ok(()),
        };
        std::fs::create_dir_all(&self.config.plot_dir)
            .map_err(|e| crate::error::EvalError::plot(&self.config.plot_dir, e.to_string()))?;
        let name = trial.meta.name();
        let path: PathBuf = self.config.plot_dir.join(format!("{name}.svg"));
        plot_probability_trace(
            &path,
            &name,
            trace,
            self.config.decision_threshold,
            interval,
        )
    }

    /// The runner's configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }
}

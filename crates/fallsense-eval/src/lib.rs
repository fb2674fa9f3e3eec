//! # FallSense Streaming Evaluation
//!
//! This crate is the leave-one-subject-out streaming evaluation harness for
//! the FallSense fall-detection classifier. It loads the preprocessed trial
//! corpus, partitions subjects into folds, trains (or loads) one classifier
//! per fold, replays each held-out fall trial sample-by-sample, and derives
//! detection latency, false-positive rate, and false-negative rate from the
//! resulting probability traces.
//!
//! ## Architecture
//!
//! ```text
//! EvalConfig ──► EvaluationRunner ──► CorpusReport
//!      │               │
//!      │         SisFallDataset / SyntheticDataset
//!      │               │
//!      │         partition::leave_one_subject_out
//!      │               │
//!      │         ModelCache::get_or_train ──► DtwKnnClassifier
//!      │               │
//!      └────► engine::evaluate_trial ──► TrialOutcome
//!                      │
//!            aggregate / report / plot
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fallsense_eval::config::EvalConfig;
//! use fallsense_eval::dataset::{SyntheticConfig, SyntheticDataset};
//!
//! let config = EvalConfig::default();
//! config.validate().expect("default config is valid");
//!
//! // Deterministic synthetic corpus for smoke tests.
//! let trials = SyntheticDataset::generate(&SyntheticConfig::default());
//! assert!(!trials.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod partition;
pub mod plot;
pub mod report;
pub mod runner;

// Convenient re-exports at the crate root.
pub use aggregate::{MetricSeries, MetricSummary, ScopeAggregates};
pub use config::EvalConfig;
pub use dataset::{SisFallDataset, SyntheticConfig, SyntheticDataset};
pub use engine::{evaluate_trial, TrialEvaluation, TrialOutcome};
pub use error::{ConfigError, DatasetError, EvalError, EvalResult};
pub use partition::{leave_one_subject_out, subject_groups, Fold};
pub use runner::{CorpusReport, EvaluationRunner};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

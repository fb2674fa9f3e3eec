//! Error types for the streaming evaluation harness.
//!
//! This module is the single source of truth for all error types in the
//! evaluation crate. Every module that produces an error imports its error
//! type from here rather than defining it inline, keeping the hierarchy
//! centralised and consistent.
//!
//! ## Hierarchy
//!
//! ```text
//! EvalError (top-level)
//! ├── ConfigError   (config validation / file loading)
//! ├── DatasetError  (corpus scanning, metadata, ingestion)
//! ├── ModelError    (training, cache I/O)            [fallsense-knn]
//! ├── SignalError   (window embedding)               [fallsense-signal]
//! └── CoreError     (classifier contract violations) [fallsense-core]
//! ```
//!
//! Skippable per-trial conditions (non-fall trial, early peak, degenerate
//! confusion counts) are **not** errors; they are
//! [`crate::engine::TrialOutcome`] variants and never surface past the
//! engine.

use std::path::PathBuf;
use thiserror::Error;

use fallsense_core::CoreError;
use fallsense_knn::ModelError;
use fallsense_signal::{RecordError, SignalError};

// ---------------------------------------------------------------------------
// EvalResult
// ---------------------------------------------------------------------------

/// Convenient `Result` alias used by orchestration-level functions.
pub type EvalResult<T> = Result<T, EvalError>;

// ---------------------------------------------------------------------------
// EvalError — top-level aggregator
// ---------------------------------------------------------------------------

/// Top-level error type of the evaluation harness.
///
/// Every variant is fatal: the run terminates and reports already flushed to
/// disk remain valid up to the point of failure.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A configuration validation or loading error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A dataset scanning or ingestion error.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// A classifier training or cache error.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A signal-processing error (window embedding out of range).
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    /// A classifier contract violation (window shape, probability range).
    #[error("Classifier error: {0}")]
    Core(#[from] CoreError),

    /// A report file could not be written.
    #[error("Report I/O error at `{path}`: {source}")]
    Report {
        /// Report file being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A plot artifact could not be rendered or saved.
    #[error("Plot error at `{path}`: {message}")]
    Plot {
        /// Plot file being written.
        path: PathBuf,
        /// Backend error description.
        message: String,
    },
}

impl EvalError {
    /// Construct an [`EvalError::Report`].
    pub fn report(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EvalError::Report { path: path.into(), source }
    }

    /// Construct an [`EvalError::Plot`].
    pub fn plot<S: Into<String>>(path: impl Into<PathBuf>, message: S) -> Self {
        EvalError::Plot { path: path.into(), message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced when loading or validating an [`EvalConfig`].
///
/// [`EvalConfig`]: crate::config::EvalConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value.
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },

    /// A configuration file could not be read from disk.
    #[error("Cannot read config file `{path}`: {source}")]
    FileRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file contains malformed JSON.
    #[error("Cannot parse config file `{path}`: {source}")]
    ParseError {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying JSON parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Construct a [`ConfigError::InvalidValue`].
    pub fn invalid_value<S: Into<String>>(field: &'static str, reason: S) -> Self {
        ConfigError::InvalidValue { field, reason: reason.into() }
    }
}

// ---------------------------------------------------------------------------
// DatasetError
// ---------------------------------------------------------------------------

/// Errors produced while scanning and loading the trial corpus.
///
/// Every variant is fatal: a malformed file name or unreadable recording
/// halts the run rather than silently skewing the statistics.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset root directory does not exist.
    #[error("Dataset directory not found: `{path}`")]
    DirectoryNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A low-level I/O error while scanning the directory tree.
    #[error("I/O error scanning `{path}`: {source}")]
    Io {
        /// Path being scanned when the error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A file name does not follow the `{activity}_{subject}_{trial}` scheme.
    #[error("Malformed trial file name: `{name}` (expected `{{activity}}_{{subject}}_{{trial}}`)")]
    InvalidTrialName {
        /// The offending file stem.
        name: String,
    },

    /// No trials were found under the dataset root.
    #[error("No trials found under `{path}`")]
    Empty {
        /// The scanned root.
        path: PathBuf,
    },

    /// A recording file could not be parsed.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// A preprocessed trial has the wrong shape.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl DatasetError {
    /// Construct a [`DatasetError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatasetError::Io { path: path.into(), source }
    }
}

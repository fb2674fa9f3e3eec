//! Error types for the nearest-neighbor classifier crate.
//!
//! This module is the single source of truth for model-side errors: training
//! preconditions, persistence I/O, and serialization failures all live here.

use std::path::PathBuf;
use thiserror::Error;

use fallsense_core::CoreError;

/// Convenient `Result` alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors produced while training, persisting, or loading a classifier.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Training was attempted with no trials.
    #[error("Cannot train a nearest-neighbor classifier on an empty training set")]
    EmptyTrainingSet,

    /// A training trial's shape differs from the first trial's shape.
    #[error("Inconsistent training shapes: `{trial}` has {actual:?}, expected {expected:?}")]
    InconsistentShapes {
        /// Name of the offending trial.
        trial: String,
        /// Expected shape (from the first trial).
        expected: Vec<usize>,
        /// Actual shape.
        actual: Vec<usize>,
    },

    /// A core-level contract violation (window shape, probability range).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A subject id is not safe to use as a cache file name.
    #[error("Invalid subject id `{subject}` for model cache: {reason}")]
    InvalidSubjectId {
        /// The offending subject id.
        subject: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A low-level I/O error in the model store.
    #[error("Model store I/O error at `{path}`: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A persisted model could not be encoded or decoded.
    #[error("Model codec error at `{path}`: {source}")]
    Codec {
        /// Path of the model file.
        path: PathBuf,
        /// Underlying bincode error.
        #[source]
        source: bincode::Error,
    },
}

impl ModelError {
    /// Construct a [`ModelError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ModelError::Io { path: path.into(), source }
    }

    /// Construct a [`ModelError::Codec`].
    pub fn codec(path: impl Into<PathBuf>, source: bincode::Error) -> Self {
        ModelError::Codec { path: path.into(), source }
    }
}

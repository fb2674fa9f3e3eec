//! # FallSense Core
//!
//! Core types, traits, and utilities for the FallSense streaming fall-detection
//! evaluation system.
//!
//! This crate provides the foundational building blocks used throughout the
//! FallSense ecosystem, including:
//!
//! - **Core Data Types**: [`Trial`], [`TrialMeta`], [`FallInterval`],
//!   [`ProbabilityTrace`], and [`ClassProbabilities`] for representing wearable
//!   sensor recordings and streaming classifier output.
//!
//! - **Error Types**: Shared error handling via the [`error`] module.
//!
//! - **Traits**: The [`FallClassifier`] abstraction that the streaming
//!   evaluation engine queries at every replay step.
//!
//! - **Utilities**: Guarded summary statistics (mean, mean absolute deviation)
//!   and peak localization helpers.
//!
//! ## Example
//!
//! ```rust
//! use fallsense_core::{ActivityClass, ClassProbabilities, DECISION_THRESHOLD};
//!
//! let probs = ClassProbabilities::new(0.4, 0.6).unwrap();
//! assert_eq!(probs.decide(DECISION_THRESHOLD), ActivityClass::Fall);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{CoreError, CoreResult};
pub use traits::FallClassifier;
pub use types::{
    ActivityClass, ClassProbabilities, FallInterval, ProbabilityTrace, TracePoint, Trial,
    TrialMeta, TrialMetrics,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Canonical sampling rate of the wearable recordings in Hz.
pub const SAMPLE_RATE_HZ: usize = 200;

/// Canonical per-trial sample count after resampling and zero-padding
/// (180 s at [`SAMPLE_RATE_HZ`]).
pub const CANONICAL_SAMPLES: usize = 36_000;

/// Number of sensor channels retained for classification.
pub const NUM_CHANNELS: usize = 5;

/// Column order of the raw 9-channel recordings.
pub const SENSOR_CHANNELS: [&str; 9] = [
    "XAD", "YAD", "ZAD", "XR", "YR", "ZR", "XM", "YM", "ZM",
];

/// Raw-column indices of the channels retained for classification
/// (XAD, ZAD, XR, YR, ZR).
pub const CHOSEN_CHANNELS: [usize; 5] = [0, 2, 3, 4, 5];

/// Fall-probability decision threshold used by the streaming evaluation.
///
/// A probability greater than **or equal to** this value is a fall decision.
pub const DECISION_THRESHOLD: f64 = 0.391_454_345_158_036_95;

/// Prelude module for convenient imports.
///
/// ```rust
/// use fallsense_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::traits::FallClassifier;
    pub use crate::types::{
        ActivityClass, ClassProbabilities, FallInterval, ProbabilityTrace, TracePoint, Trial,
        TrialMeta, TrialMetrics,
    };
    pub use crate::{CANONICAL_SAMPLES, DECISION_THRESHOLD, NUM_CHANNELS, SAMPLE_RATE_HZ};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_valid() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn constants_are_consistent() {
        assert_eq!(CHOSEN_CHANNELS.len(), NUM_CHANNELS);
        assert_eq!(CANONICAL_SAMPLES, 180 * SAMPLE_RATE_HZ);
        assert!(DECISION_THRESHOLD > 0.0 && DECISION_THRESHOLD < 1.0);
        // Every chosen channel must reference a valid raw column.
        assert!(CHOSEN_CHANNELS.iter().all(|&c| c < SENSOR_CHANNELS.len()));
    }
}

//! # FallSense Nearest-Neighbor Classifier
//!
//! Multivariate distance-based classification for the FallSense evaluation
//! pipeline: a per-channel 1-nearest-neighbor classifier under dynamic time
//! warping, plus a persisted per-subject model cache.
//!
//! ## Semantics
//!
//! Each sensor channel is classified independently against the training
//! templates; the channel votes are averaged into a per-class probability
//! vector and thresholded by the evaluation engine. With five channels the
//! fall probability is therefore a multiple of 0.2.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fallsense_knn::{DtwKnnClassifier, ModelCache, ModelResult};
//!
//! # fn demo(trials: Vec<fallsense_core::Trial>) -> ModelResult<()> {
//! let cache = ModelCache::new("models")?;
//! let classifier = cache.get_or_train("SA01", || {
//!     DtwKnnClassifier::fit(trials.iter(), None)
//! })?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod dtw;
pub mod error;
pub mod store;

// Re-exports for convenience
pub use classifier::DtwKnnClassifier;
pub use dtw::{dtw_distance, dtw_distance_banded};
pub use error::{ModelError, ModelResult};
pub use store::ModelCache;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classifier::DtwKnnClassifier;
    pub use crate::dtw::{dtw_distance, dtw_distance_banded};
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::store::ModelCache;
}

//! Evaluation configuration.
//!
//! [`EvalConfig`] is the single source of truth for every constant of the
//! streaming evaluation: signal geometry, replay schedule, ground-truth
//! offsets, the decision threshold, the subject split, and output locations.
//! It is serializable via [`serde`] so a run can be reproduced from a JSON
//! file, and validated up front so the replay loop never has to reason about
//! inconsistent geometry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fallsense_core::{CANONICAL_SAMPLES, CHOSEN_CHANNELS, DECISION_THRESHOLD, SAMPLE_RATE_HZ};
use fallsense_signal::PreprocessConfig;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// EvalConfig
// ---------------------------------------------------------------------------

/// Complete configuration for one evaluation run.
///
/// All defaults match the tuned production values. Use
/// [`EvalConfig::default()`] as a starting point and override individual
/// fields as needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    // -----------------------------------------------------------------------
    // Signal geometry
    // -----------------------------------------------------------------------
    /// Sampling rate recordings are aligned to (Hz). Default: **200**.
    pub sample_rate_hz: usize,

    /// Fixed per-channel sample count after padding. Default: **36000**
    /// (180 s at 200 Hz).
    pub canonical_samples: usize,

    /// Raw-column indices retained for classification.
    /// Default: **[0, 2, 3, 4, 5]** (XAD, ZAD, XR, YR, ZR).
    pub chosen_channels: Vec<usize>,

    /// The two retained channels (by retained index) whose absolute-value
    /// peaks define the fall-event midpoint. Default: **(0, 1)**.
    pub peak_channels: (usize, usize),

    // -----------------------------------------------------------------------
    // Ground-truth interval
    // -----------------------------------------------------------------------
    /// Trials whose peak midpoint lies before this sample are discarded:
    /// a peak that early has no valid pre-fall baseline. Default: **1500**.
    pub early_peak_guard_samples: f64,

    /// Samples subtracted from the midpoint for the interval start.
    /// Default: **115**.
    pub interval_pre_samples: f64,

    /// Samples added to the midpoint for the interval end. Default: **128**.
    pub interval_post_samples: f64,

    // -----------------------------------------------------------------------
    // Decision
    // -----------------------------------------------------------------------
    /// Fall-probability decision threshold; a probability equal to the
    /// threshold crosses. Default: **0.39145434515803695**.
    pub decision_threshold: f64,

    // -----------------------------------------------------------------------
    // Replay schedule
    // -----------------------------------------------------------------------
    /// First elapsed sample count of the growth phase. Default: **100**.
    pub growth_start: usize,

    /// Exclusive end of the growth phase. Default: **1000**.
    pub growth_end: usize,

    /// Growth-phase step in samples. Default: **20**.
    pub growth_step: usize,

    /// Sliding-window span; the live region is `span − 1` samples and the
    /// sliding phase starts at this elapsed count. Default: **1000**.
    pub slide_span: usize,

    /// Inclusive end of the sliding phase. Default: **3000**.
    pub slide_end: usize,

    /// Sliding-phase step in samples. Default: **5**.
    pub slide_step: usize,

    // -----------------------------------------------------------------------
    // Subject split
    // -----------------------------------------------------------------------
    /// Size of the first (evaluated) subject group after lexicographic
    /// ordering; remaining subjects are reserved. Default: **23**.
    pub adult_subject_count: usize,

    // -----------------------------------------------------------------------
    // Classifier
    // -----------------------------------------------------------------------
    /// Optional Sakoe–Chiba band half-width for the DTW distance.
    /// `None` (the default) runs the full distance the models were tuned on.
    pub dtw_band: Option<usize>,

    // -----------------------------------------------------------------------
    // Output locations
    // -----------------------------------------------------------------------
    /// Directory for per-subject and corpus text reports.
    pub report_dir: PathBuf,

    /// Directory for probability-trace plot artifacts.
    pub plot_dir: PathBuf,

    /// Directory for persisted fold classifiers.
    pub model_dir: PathBuf,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            // Signal geometry
            sample_rate_hz: SAMPLE_RATE_HZ,
            canonical_samples: CANONICAL_SAMPLES,
            chosen_channels: CHOSEN_CHANNELS.to_vec(),
            peak_channels: (0, 1),
            // Ground-truth interval
            early_peak_guard_samples: 1500.0,
            interval_pre_samples: 115.0,
            interval_post_samples: 128.0,
            // Decision
            decision_threshold: DECISION_THRESHOLD,
            // Replay schedule
            growth_start: 100,
            growth_end: 1000,
            growth_step: 20,
            slide_span: 1000,
            slide_end: 3000,
            slide_step: 5,
            // Subject split
            adult_subject_count: 23,
            // Classifier
            dtw_band: None,
            // Output locations
            report_dir: PathBuf::from("results"),
            plot_dir: PathBuf::from("plots"),
            model_dir: PathBuf::from("models"),
        }
    }
}

impl EvalConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so partial override files
    /// are valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] / [`ConfigError::ParseError`].
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::invalid_value("sample_rate_hz", "must be > 0"));
        }
        if self.canonical_samples == 0 {
            return Err(ConfigError::invalid_value("canonical_samples", "must be > 0"));
        }
        if self.chosen_channels.is_empty() {
            return Err(ConfigError::invalid_value("chosen_channels", "must not be empty"));
        }
        if let Some(&bad) = self
            .chosen_channels
            .iter()
            .find(|&&c| c >= fallsense_core::SENSOR_CHANNELS.len())
        {
            return Err(ConfigError::invalid_value(
                "chosen_channels",
                format!("raw column {bad} does not exist in the recording layout"),
            ));
        }
        let n = self.num_channels();
        if self.peak_channels.0 >= n || self.peak_channels.1 >= n {
            return Err(ConfigError::invalid_value(
                "peak_channels",
                format!("indices {:?} out of range for {n} channels", self.peak_channels),
            ));
        }
        if !(self.decision_threshold > 0.0 && self.decision_threshold < 1.0) {
            return Err(ConfigError::invalid_value(
                "decision_threshold",
                format!("{} is outside (0, 1)", self.decision_threshold),
            ));
        }
        if self.interval_pre_samples < 0.0 || self.interval_post_samples < 0.0 {
            return Err(ConfigError::invalid_value(
                "interval_pre_samples",
                "interval offsets must be non-negative",
            ));
        }
        if self.interval_pre_samples >= self.early_peak_guard_samples {
            return Err(ConfigError::invalid_value(
                "early_peak_guard_samples",
                "guard must exceed the pre-interval offset",
            ));
        }
        if self.growth_step == 0 || self.slide_step == 0 {
            return Err(ConfigError::invalid_value("growth_step", "steps must be > 0"));
        }
        if self.growth_start == 0 || self.growth_start >= self.growth_end {
            return Err(ConfigError::invalid_value(
                "growth_start",
                "need 0 < growth_start < growth_end",
            ));
        }
        if self.slide_span < 2 {
            return Err(ConfigError::invalid_value("slide_span", "must be >= 2"));
        }
        if self.growth_end > self.slide_span {
            return Err(ConfigError::invalid_value(
                "growth_end",
                "growth phase must end where the sliding phase begins",
            ));
        }
        if self.slide_span > self.slide_end {
            return Err(ConfigError::invalid_value(
                "slide_end",
                "sliding phase must not end before it begins",
            ));
        }
        // The growth-phase placement writes columns up to 2·elapsed − 1.
        if 2 * self.growth_end > self.canonical_samples {
            return Err(ConfigError::invalid_value(
                "canonical_samples",
                "too small for the growth-phase window placement",
            ));
        }
        if self.slide_end > self.canonical_samples {
            return Err(ConfigError::invalid_value(
                "slide_end",
                "replay horizon exceeds the canonical trial length",
            ));
        }
        Ok(())
    }

    /// Number of retained channels.
    pub fn num_channels(&self) -> usize {
        self.chosen_channels.len()
    }

    /// Elapsed observation time in milliseconds for an elapsed sample count.
    pub fn elapsed_ms(&self, samples: usize) -> f64 {
        samples as f64 * 1000.0 / self.sample_rate_hz as f64
    }

    /// Total number of replay steps per trial (both phases).
    pub fn replay_steps(&self) -> usize {
        let growth = (self.growth_end - 1).saturating_sub(self.growth_start) / self.growth_step + 1;
        let slide = (self.slide_end - self.slide_span) / self.slide_step + 1;
        growth + slide
    }

    /// The preprocessing parameters implied by this configuration.
    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            sample_rate_hz: self.sample_rate_hz,
            canonical_samples: self.canonical_samples,
            chosen_channels: self.chosen_channels.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

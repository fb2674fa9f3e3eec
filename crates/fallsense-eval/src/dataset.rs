//! Trial corpus loading.
//!
//! Two sources implement the same output contract (`Vec<Trial>`):
//!
//! - [`SisFallDataset`]: scans a SisFall-style directory tree of delimited
//!   text recordings (`<root>/<subject>/<activity>_<subject>_<trial>.txt`),
//!   preprocesses every file, and parses the filename-encoded metadata.
//! - [`SyntheticDataset`]: a fully deterministic analytic corpus for unit
//!   tests, integration tests, and `--dry-run` smoke checks.
//!   **Never uses random data.**
//!
//! # Directory layout expected by `SisFallDataset`
//!
//! ```text
//! <root>/
//!   SA01/
//!     D01_SA01_R01.txt
//!     F01_SA01_R01.txt
//!     ...
//!   SA02/
//!     ...
//! ```
//!
//! Scanning is fatal on the first malformed file name or unreadable
//! recording: silently skipping trials would bias every downstream
//! statistic.

use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::info;

use fallsense_core::{ActivityClass, Trial, TrialMeta};
use fallsense_signal::preprocess_recording;

use crate::config::EvalConfig;
use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// Trial name parsing
// ---------------------------------------------------------------------------

/// Parse a `{activity}_{subject}_{trial}` file stem into trial metadata.
///
/// # Errors
///
/// Returns [`DatasetError::InvalidTrialName`] when the stem does not have
/// exactly three non-empty underscore-separated parts or the activity code
/// has no recognised class letter.
pub fn parse_trial_name(stem: &str) -> Result<TrialMeta, DatasetError> {
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(DatasetError::InvalidTrialName { name: stem.to_string() });
    }
    let class = ActivityClass::from_code(parts[0])
        .map_err(|_| DatasetError::InvalidTrialName { name: stem.to_string() })?;
    Ok(TrialMeta {
        class,
        activity: parts[0].to_string(),
        subject: parts[1].to_string(),
        trial: parts[2].to_string(),
    })
}

// ---------------------------------------------------------------------------
// SisFallDataset
// ---------------------------------------------------------------------------

/// Loader for SisFall-style directory trees of raw recordings.
pub struct SisFallDataset;

impl SisFallDataset {
    /// Scan `root` and load the full corpus into memory.
    ///
    /// Subject directories and recordings are visited in sorted order so the
    /// trial index assignment is deterministic across platforms.
    ///
    /// # Errors
    ///
    /// Fatal on a missing root, any filesystem failure, malformed metadata,
    /// unreadable recordings, or an empty corpus.
    pub fn load(root: &Path, config: &EvalConfig) -> Result<Vec<Trial>, DatasetError> {
        if !root.exists() {
            return Err(DatasetError::DirectoryNotFound { path: root.to_path_buf() });
        }

        let preprocess = config.preprocess_config();
        let mut trials = Vec::new();

        let mut subject_dirs: Vec<PathBuf> = std::fs::read_dir(root)
            .map_err(|e| DatasetError::io(root, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect();
        subject_dirs.sort();

        for subject_dir in &subject_dirs {
            let mut files: Vec<PathBuf> = std::fs::read_dir(subject_dir)
                .map_err(|e| DatasetError::io(subject_dir, e))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().map(|ext| ext == "txt").unwrap_or(false))
                .collect();
            files.sort();

            for file in &files {
                let stem = file
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| DatasetError::InvalidTrialName {
                        name: file.display().to_string(),
                    })?;
                let meta = parse_trial_name(stem)?;
                let signal = preprocess_recording(file, &preprocess)?;
                let trial = Trial::new(
                    signal,
                    meta,
                    config.num_channels(),
                    config.canonical_samples,
                )?;
                trials.push(trial);
            }
        }

        if trials.is_empty() {
            return Err(DatasetError::Empty { path: root.to_path_buf() });
        }

        let subjects: std::collections::BTreeSet<&str> =
            trials.iter().map(|t| t.meta.subject.as_str()).collect();
        info!(
            trials = trials.len(),
            subjects = subjects.len(),
            root = %root.display(),
            "loaded trial corpus"
        );
        Ok(trials)
    }
}

// ---------------------------------------------------------------------------
// SyntheticDataset
// ---------------------------------------------------------------------------

/// Configuration for [`SyntheticDataset`].
///
/// All fields are plain numbers; no randomness is involved anywhere.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Number of synthetic subjects (`S01`, `S02`, …).
    pub subjects: usize,
    /// Fall trials per subject (`F01`, `F02`, …).
    pub falls_per_subject: usize,
    /// Daily-living trials per subject (`D01`, `D02`, …).
    pub dailies_per_subject: usize,
    /// Number of sensor channels.
    pub channels: usize,
    /// Per-channel sample count.
    pub samples: usize,
    /// Sample index of the synthetic fall impact peak.
    pub peak_sample: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        SyntheticConfig {
            subjects: 3,
            falls_per_subject: 2,
            dailies_per_subject: 2,
            channels: 5,
            samples: 4000,
            peak_sample: 2000,
        }
    }
}

/// Fully deterministic synthetic trial corpus.
///
/// Every sample value is computed analytically from the trial and sample
/// indices, making the corpus perfectly reproducible across platforms.
///
/// - Daily trials are a low-amplitude multi-phase sine (ordinary movement).
/// - Fall trials add a sharp impact spike of amplitude `10 + index` at
///   [`SyntheticConfig::peak_sample`] on every channel, so the peak channels
///   agree on the midpoint.
pub struct SyntheticDataset;

impl SyntheticDataset {
    /// Generate the corpus described by `config`.
    pub fn generate(config: &SyntheticConfig) -> Vec<Trial> {
        let mut trials = Vec::new();
        for subject_idx in 0..config.subjects {
            let subject = format!("S{:02}", subject_idx + 1);
            for fall_idx in 0..config.falls_per_subject {
                let activity = format!("F{:02}", fall_idx + 1);
                trials.push(Self::trial(config, &subject, &activity, true, fall_idx));
            }
            for daily_idx in 0..config.dailies_per_subject {
                let activity = format!("D{:02}", daily_idx + 1);
                trials.push(Self::trial(config, &subject, &activity, false, daily_idx));
            }
        }
        trials
    }

    fn trial(
        config: &SyntheticConfig,
        subject: &str,
        activity: &str,
        fall: bool,
        index: usize,
    ) -> Trial {
        let phase = index as f32 * 0.37;
        let mut signal = Array2::from_shape_fn((config.channels, config.samples), |(c, t)| {
            0.4 * (t as f32 * 0.011 + c as f32 * 0.5 + phase).sin()
        });
        if fall {
            let spike = 10.0 + index as f32;
            for c in 0..config.channels {
                signal[[c, config.peak_sample]] = spike;
            }
        }
        Trial {
            signal,
            meta: TrialMeta {
                class: if fall { ActivityClass::Fall } else { ActivityClass::Daily },
                activity: activity.to_string(),
                subject: subject.to_string(),
                trial: "R01".to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ----- parse_trial_name -------------------------------------------------

    #[test]
    fn parses_well_formed_names() {
        let meta = parse_trial_name("F03_SA07_R02").unwrap();
        assert_eq!(meta.class, ActivityClass::Fall);
        assert_eq!(meta.activity, "F03");
        assert_eq!(meta.subject, "SA07");
        assert_eq!(meta.trial, "R02");

        let meta = parse_trial_name("D11_SE02_R05").unwrap();
        assert_eq!(meta.class, ActivityClass::Daily);
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["F03_SA07", "F03_SA07_R02_extra", "__", "X01_SA01_R01", ""] {
            assert!(
                matches!(parse_trial_name(bad), Err(DatasetError::InvalidTrialName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    // ----- SisFallDataset ---------------------------------------------------

    fn tiny_config() -> EvalConfig {
        let mut cfg = EvalConfig::default();
        cfg.sample_rate_hz = 5;
        cfg.canonical_samples = 40;
        cfg.growth_start = 2;
        cfg.growth_end = 10;
        cfg.growth_step = 2;
        cfg.slide_span = 10;
        cfg.slide_end = 20;
        cfg.slide_step = 2;
        cfg.early_peak_guard_samples = 10.0;
        cfg.interval_pre_samples = 3.0;
        cfg.interval_post_samples = 4.0;
        cfg
    }

    fn write_recording(dir: &Path, name: &str, samples: usize) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        for t in 0..samples {
            writeln!(file, "{t},1,2,3,4,5,6,7,8;").unwrap();
        }
    }

    #[test]
    fn loads_sorted_corpus_with_metadata() {
        let root = tempfile::tempdir().unwrap();
        let sa01 = root.path().join("SA01");
        let sa02 = root.path().join("SA02");
        std::fs::create_dir(&sa01).unwrap();
        std::fs::create_dir(&sa02).unwrap();
        write_recording(&sa01, "F01_SA01_R01.txt", 20);
        write_recording(&sa01, "D01_SA01_R01.txt", 20);
        write_recording(&sa02, "F01_SA02_R01.txt", 20);

        let cfg = tiny_config();
        let trials = SisFallDataset::load(root.path(), &cfg).unwrap();
        assert_eq!(trials.len(), 3);
        // Sorted: SA01/D01, SA01/F01, SA02/F01.
        assert_eq!(trials[0].meta.name(), "D01_SA01_R01");
        assert_eq!(trials[1].meta.name(), "F01_SA01_R01");
        assert_eq!(trials[2].meta.name(), "F01_SA02_R01");
        for trial in &trials {
            assert_eq!(trial.signal.shape(), &[5, 40]);
        }
    }

    #[test]
    fn malformed_name_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("SA01");
        std::fs::create_dir(&dir).unwrap();
        write_recording(&dir, "garbage.txt", 10);

        let err = SisFallDataset::load(root.path(), &tiny_config()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidTrialName { .. }));
    }

    #[test]
    fn missing_root_is_fatal() {
        let err =
            SisFallDataset::load(Path::new("/nonexistent/sisfall"), &tiny_config()).unwrap_err();
        assert!(matches!(err, DatasetError::DirectoryNotFound { .. }));
    }

    #[test]
    fn empty_corpus_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("SA01")).unwrap();
        let err = SisFallDataset::load(root.path(), &tiny_config()).unwrap_err();
        assert!(matches!(err, DatasetError::Empty { .. }));
    }

    // ----- SyntheticDataset -------------------------------------------------

    #[test]
    fn synthetic_corpus_shape_and_labels() {
        let cfg = SyntheticConfig::default();
        let trials = SyntheticDataset::generate(&cfg);
        assert_eq!(
            trials.len(),
            cfg.subjects * (cfg.falls_per_subject + cfg.dailies_per_subject)
        );
        let falls = trials.iter().filter(|t| t.meta.class.is_fall()).count();
        assert_eq!(falls, cfg.subjects * cfg.falls_per_subject);
        for trial in &trials {
            assert_eq!(trial.signal.shape(), &[cfg.channels, cfg.samples]);
        }
    }

    #[test]
    fn synthetic_is_deterministic() {
        let cfg = SyntheticConfig::default();
        let a = SyntheticDataset::generate(&cfg);
        let b = SyntheticDataset::generate(&cfg);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.meta, y.meta);
            assert_eq!(x.signal, y.signal);
        }
    }

    #[test]
    fn synthetic_fall_peak_is_where_configured() {
        use fallsense_signal::fall_midpoint;
        let cfg = SyntheticConfig::default();
        let trials = SyntheticDataset::generate(&cfg);
        let fall = trials.iter().find(|t| t.meta.class.is_fall()).unwrap();
        assert_eq!(fall_midpoint(&fall.signal, (0, 1)), cfg.peak_sample as f64);
    }
}

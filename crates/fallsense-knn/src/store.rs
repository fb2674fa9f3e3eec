//! Persisted per-subject model cache.
//!
//! Fold classifiers are keyed by the held-out subject id. A cache hit skips
//! retraining entirely; a miss trains, persists, and returns the fresh model.
//! Writes go to a temporary file in the same directory followed by a rename,
//! so a crash mid-write never leaves a truncated model behind.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classifier::DtwKnnClassifier;
use crate::error::{ModelError, ModelResult};

/// Maximum subject-id length accepted as a cache key.
const MAX_SUBJECT_ID_LEN: usize = 64;

/// Validate a subject id for use as a file name component.
///
/// Only alphanumerics, `-` and `_` are allowed; this rules out path
/// separators and relative path components entirely.
fn validate_subject_id(subject: &str) -> ModelResult<()> {
    if subject.is_empty() {
        return Err(ModelError::InvalidSubjectId {
            subject: subject.to_string(),
            reason: "empty id".into(),
        });
    }
    if subject.len() > MAX_SUBJECT_ID_LEN {
        return Err(ModelError::InvalidSubjectId {
            subject: subject.to_string(),
            reason: format!("longer than {MAX_SUBJECT_ID_LEN} characters"),
        });
    }
    if let Some(bad) = subject
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(ModelError::InvalidSubjectId {
            subject: subject.to_string(),
            reason: format!("disallowed character `{bad}`"),
        });
    }
    Ok(())
}

/// Directory-backed cache of trained fold classifiers.
#[derive(Debug, Clone)]
pub struct ModelCache {
    dir: PathBuf,
}

impl ModelCache {
    /// Open (and create if needed) a cache rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> ModelResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| ModelError::io(&dir, e))?;
        Ok(ModelCache { dir })
    }

    /// Path of the model file for one held-out subject.
    fn model_path(&self, subject: &str) -> ModelResult<PathBuf> {
        validate_subject_id(subject)?;
        Ok(self.dir.join(format!("{subject}.knn.bin")))
    }

    /// Load the persisted classifier for `subject`, if one exists.
    ///
    /// # Errors
    ///
    /// I/O and decode failures are fatal; a missing file is simply `None`.
    pub fn load(&self, subject: &str) -> ModelResult<Option<DtwKnnClassifier>> {
        let path = self.model_path(subject)?;
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(&path).map_err(|e| ModelError::io(&path, e))?;
        let classifier =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| ModelError::codec(&path, e))?;
        debug!(subject, path = %path.display(), "loaded cached classifier");
        Ok(Some(classifier))
    }

    /// Persist a classifier for `subject` with write-then-rename.
    ///
    /// # Errors
    ///
    /// Fatal on any I/O or encode failure.
    pub fn save(&self, subject: &str, classifier: &DtwKnnClassifier) -> ModelResult<()> {
        let path = self.model_path(subject)?;
        let tmp = path.with_extension("bin.tmp");

        let file = File::create(&tmp).map_err(|e| ModelError::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, classifier).map_err(|e| ModelError::codec(&tmp, e))?;
        // Flush before the rename so the visible file is always complete.
        let file = writer.into_inner().map_err(|e| ModelError::io(&tmp, e.into_error()))?;
        file.sync_all().map_err(|e| ModelError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| ModelError::io(&path, e))?;

        debug!(subject, path = %path.display(), "persisted classifier");
        Ok(())
    }

    /// Return the cached classifier for `subject`, or train one with `train`,
    /// persist it, and return it.
    ///
    /// # Errors
    ///
    /// Propagates training and persistence failures.
    pub fn get_or_train<F>(&self, subject: &str, train: F) -> ModelResult<DtwKnnClassifier>
    where
        F: FnOnce() -> ModelResult<DtwKnnClassifier>,
    {
        if let Some(classifier) = self.load(subject)? {
            info!(subject, "model cache hit");
            return Ok(classifier);
        }
        info!(subject, "model cache miss — training");
        let classifier = train()?;
        self.save(subject, &classifier)?;
        Ok(classifier)
    }

    /// Root directory of this cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use fallsense_core::{ActivityClass, Trial, TrialMeta};
    use ndarray::Array2;

    fn toy_classifier() -> DtwKnnClassifier {
        let trials = vec![
            Trial {
                signal: Array2::zeros((2, 4)),
                meta: TrialMeta {
                    class: ActivityClass::Daily,
                    activity: "D01".into(),
                    subject: "SA02".into(),
                    trial: "R01".into(),
                },
            },
            Trial {
                signal: Array2::from_elem((2, 4), 9.0),
                meta: TrialMeta {
                    class: ActivityClass::Fall,
                    activity: "F01".into(),
                    subject: "SA02".into(),
                    trial: "R01".into(),
                },
            },
        ];
        DtwKnnClassifier::fit(trials.iter(), None).unwrap()
    }

    #[test]
    fn subject_id_validation() {
        assert!(validate_subject_id("SA01").is_ok());
        assert!(validate_subject_id("subject_7-b").is_ok());
        assert!(validate_subject_id("").is_err());
        assert!(validate_subject_id("../etc").is_err());
        assert!(validate_subject_id("a/b").is_err());
        assert!(validate_subject_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn miss_then_hit_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path()).unwrap();

        assert!(cache.load("SA01").unwrap().is_none());

        let mut trained = 0;
        let clf = cache
            .get_or_train("SA01", || {
                trained += 1;
                Ok(toy_classifier())
            })
            .unwrap();
        assert_eq!(trained, 1);
        assert_eq!(clf.num_templates(), 2);

        // Second call must hit the cache and never invoke the trainer.
        let clf2 = cache
            .get_or_train("SA01", || {
                panic!("trainer must not run on a cache hit");
            })
            .unwrap();
        assert_eq!(clf2.num_templates(), 2);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path()).unwrap();
        cache.save("SA03", &toy_classifier()).unwrap();

        let entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["SA03.knn.bin".to_string()]);
    }

    #[test]
    fn training_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::new(dir.path()).unwrap();
        let result = cache.get_or_train("SA04", || Err(ModelError::EmptyTrainingSet));
        assert!(matches!(result, Err(ModelError::EmptyTrainingSet)));
        // A failed training run must not leave a model behind.
        assert!(cache.load("SA04").unwrap().is_none());
    }
}

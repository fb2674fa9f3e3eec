//! Per-channel DTW nearest-neighbor classifier.
//!
//! Mirrors the multivariate k-NN setup the models were tuned against: each
//! channel is matched to its own nearest training template under DTW (k = 1)
//! and votes with that template's label. The per-class probability vector is
//! the mean of the channel vote vectors, which is what the fixed decision
//! threshold of the evaluation engine operates on.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use fallsense_core::{
    ActivityClass, ClassProbabilities, CoreError, CoreResult, FallClassifier, Trial,
};

use crate::dtw::{dtw_distance, dtw_distance_banded};
use crate::error::{ModelError, ModelResult};

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// One stored training trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Template {
    /// Channel-major signal, same shape for every template.
    signal: Array2<f32>,
    /// Class label of the training trial.
    class: ActivityClass,
}

// ---------------------------------------------------------------------------
// DtwKnnClassifier
// ---------------------------------------------------------------------------

/// Multivariate 1-nearest-neighbor classifier under dynamic time warping.
///
/// Training stores the trials verbatim; prediction is a per-channel nearest
/// template search. The classifier is serializable so a fold's model can be
/// persisted by [`crate::store::ModelCache`] and reloaded on later runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtwKnnClassifier {
    templates: Vec<Template>,
    channels: usize,
    samples: usize,
    /// Optional Sakoe–Chiba band half-width; `None` runs the full DTW.
    band: Option<usize>,
}

impl DtwKnnClassifier {
    /// Train (store) the classifier on the given trials.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyTrainingSet`] when `trials` is empty.
    /// - [`ModelError::InconsistentShapes`] when any trial's shape differs
    ///   from the first trial's.
    pub fn fit<'a, I>(trials: I, band: Option<usize>) -> ModelResult<Self>
    where
        I: IntoIterator<Item = &'a Trial>,
    {
        let mut templates: Vec<Template> = Vec::new();
        let mut shape: Option<(usize, usize)> = None;

        for trial in trials {
            let (c, s) = (trial.channels(), trial.samples());
            match shape {
                None => shape = Some((c, s)),
                Some(expected) if expected != (c, s) => {
                    return Err(ModelError::InconsistentShapes {
                        trial: trial.meta.name(),
                        expected: vec![expected.0, expected.1],
                        actual: vec![c, s],
                    });
                }
                Some(_) => {}
            }
            templates.push(Template {
                signal: trial.signal.clone(),
                class: trial.meta.class,
            });
        }

        let (channels, samples) = shape.ok_or(ModelError::EmptyTrainingSet)?;
        debug!(
            templates = templates.len(),
            channels, samples, "fitted DTW 1-NN classifier"
        );
        Ok(DtwKnnClassifier { templates, channels, samples, band })
    }

    /// Number of stored training templates.
    pub fn num_templates(&self) -> usize {
        self.templates.len()
    }

    /// Number of sensor channels the classifier expects.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Per-channel sample count the classifier expects.
    pub fn samples(&self) -> usize {
        self.samples
    }

    fn check_shape(&self, window: &Array2<f32>) -> CoreResult<()> {
        if window.shape() != [self.channels, self.samples] {
            return Err(CoreError::shape_mismatch(
                vec![self.channels, self.samples],
                window.shape().to_vec(),
            ));
        }
        Ok(())
    }

    fn channel_distance(&self, a: &[f32], b: &[f32]) -> f64 {
        match self.band {
            Some(band) => dtw_distance_banded(a, b, band),
            None => dtw_distance(a, b),
        }
    }

    /// Count the channels whose nearest template carries the fall label.
    fn fall_votes(&self, window: &Array2<f32>) -> usize {
        let mut votes = 0usize;
        for c in 0..self.channels {
            let query = window.row(c);
            let query = query.as_slice().expect("row of a C-order array");

            let mut best = f64::INFINITY;
            let mut best_class = self.templates[0].class;
            for template in &self.templates {
                let row = template.signal.row(c);
                let row = row.as_slice().expect("row of a C-order array");
                let d = self.channel_distance(query, row);
                if d < best {
                    best = d;
                    best_class = template.class;
                }
            }
            if best_class.is_fall() {
                votes += 1;
            }
        }
        votes
    }
}

impl FallClassifier for DtwKnnClassifier {
    /// Majority vote across channels. Ties resolve to the daily class
    /// (lexicographically first label, matching the tuned reference setup).
    fn predict(&self, window: &Array2<f32>) -> CoreResult<ActivityClass> {
        self.check_shape(window)?;
        let fall = self.fall_votes(window);
        let daily = self.channels - fall;
        if fall > daily {
            Ok(ActivityClass::Fall)
        } else {
            Ok(ActivityClass::Daily)
        }
    }

    /// Mean of the per-channel vote vectors: `p_fall` = fall votes divided by
    /// channel count.
    fn predict_proba(&self, window: &Array2<f32>) -> CoreResult<ClassProbabilities> {
        self.check_shape(window)?;
        let fall = self.fall_votes(window) as f64;
        let p_fall = fall / self.channels as f64;
        ClassProbabilities::new(1.0 - p_fall, p_fall)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fallsense_core::TrialMeta;
    use ndarray::array;

    fn trial(signal: Array2<f32>, class: ActivityClass, name: &str) -> Trial {
        Trial {
            signal,
            meta: TrialMeta {
                class,
                activity: name.into(),
                subject: "SA01".into(),
                trial: "R01".into(),
            },
        }
    }

    /// Two clearly separated 2-channel template families.
    fn toy_training() -> Vec<Trial> {
        vec![
            trial(array![[0.0_f32, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]], ActivityClass::Daily, "D01"),
            trial(array![[9.0_f32, 9.0, 9.0, 9.0], [9.0, 9.0, 9.0, 9.0]], ActivityClass::Fall, "F01"),
        ]
    }

    #[test]
    fn fit_rejects_empty_training_set() {
        let err = DtwKnnClassifier::fit(std::iter::empty(), None).unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrainingSet));
    }

    #[test]
    fn fit_rejects_inconsistent_shapes() {
        let trials = vec![
            trial(Array2::zeros((2, 4)), ActivityClass::Daily, "D01"),
            trial(Array2::zeros((2, 5)), ActivityClass::Fall, "F01"),
        ];
        let err = DtwKnnClassifier::fit(trials.iter(), None).unwrap_err();
        assert!(matches!(err, ModelError::InconsistentShapes { .. }));
    }

    #[test]
    fn unanimous_votes_give_extreme_probabilities() {
        let clf = DtwKnnClassifier::fit(toy_training().iter(), None).unwrap();

        let near_fall = array![[8.5_f32, 9.0, 9.1, 8.9], [9.2, 9.0, 8.8, 9.0]];
        let probs = clf.predict_proba(&near_fall).unwrap();
        assert_abs_diff_eq!(probs.p_fall, 1.0);
        assert_eq!(clf.predict(&near_fall).unwrap(), ActivityClass::Fall);

        let near_daily = array![[0.1_f32, 0.0, -0.1, 0.0], [0.0, 0.2, 0.0, -0.2]];
        let probs = clf.predict_proba(&near_daily).unwrap();
        assert_abs_diff_eq!(probs.p_fall, 0.0);
        assert_eq!(clf.predict(&near_daily).unwrap(), ActivityClass::Daily);
    }

    #[test]
    fn split_votes_average_per_channel() {
        let clf = DtwKnnClassifier::fit(toy_training().iter(), None).unwrap();
        // Channel 0 looks like the fall template, channel 1 like the daily one.
        let mixed = array![[9.0_f32, 9.0, 9.0, 9.0], [0.0, 0.0, 0.0, 0.0]];
        let probs = clf.predict_proba(&mixed).unwrap();
        assert_abs_diff_eq!(probs.p_fall, 0.5);
        assert_abs_diff_eq!(probs.p_daily, 0.5);
        // A 1-1 tie resolves to the daily class.
        assert_eq!(clf.predict(&mixed).unwrap(), ActivityClass::Daily);
    }

    #[test]
    fn predict_rejects_wrong_shape() {
        let clf = DtwKnnClassifier::fit(toy_training().iter(), None).unwrap();
        let bad = Array2::<f32>::zeros((2, 7));
        assert!(matches!(
            clf.predict(&bad),
            Err(CoreError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            clf.predict_proba(&bad),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn prediction_is_deterministic() {
        let clf = DtwKnnClassifier::fit(toy_training().iter(), None).unwrap();
        let window = array![[4.0_f32, 5.0, 4.0, 5.0], [4.0, 5.0, 4.0, 5.0]];
        let a = clf.predict_proba(&window).unwrap();
        let b = clf.predict_proba(&window).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn banded_classifier_still_separates() {
        let clf = DtwKnnClassifier::fit(toy_training().iter(), Some(1)).unwrap();
        let near_fall = array![[9.0_f32, 9.0, 9.0, 9.0], [9.0, 9.0, 9.0, 9.0]];
        assert_eq!(clf.predict(&near_fall).unwrap(), ActivityClass::Fall);
    }

    #[test]
    fn serde_round_trip_preserves_behavior() {
        let clf = DtwKnnClassifier::fit(toy_training().iter(), None).unwrap();
        let bytes = bincode::serialize(&clf).unwrap();
        let restored: DtwKnnClassifier = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored.num_templates(), clf.num_templates());

        let window = array![[9.0_f32, 9.0, 9.0, 9.0], [0.0, 0.0, 0.0, 0.0]];
        assert_eq!(
            clf.predict_proba(&window).unwrap(),
            restored.predict_proba(&window).unwrap()
        );
    }
}

//! Subject partitioning for leave-one-subject-out cross-validation.
//!
//! Subjects are ordered lexicographically and split at a fixed point into the
//! evaluated group and a reserved group. Each evaluated subject is held out
//! exactly once; for a fold, the test set is exactly the held-out subject's
//! trials and the training set is exactly the complement.

use std::collections::BTreeSet;
use tracing::debug;

use fallsense_core::Trial;

/// One leave-one-subject-out split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// The held-out subject id.
    pub held_out: String,
    /// Corpus indices of the training trials (every other subject).
    pub train_indices: Vec<usize>,
    /// Corpus indices of the test trials (the held-out subject).
    pub test_indices: Vec<usize>,
}

/// Split the corpus's unique subject ids into the evaluated group and the
/// reserved group.
///
/// Ids are sorted lexicographically; the first `adult_count` form the
/// evaluated group. A corpus with fewer subjects than `adult_count` puts
/// every subject in the evaluated group.
pub fn subject_groups(trials: &[Trial], adult_count: usize) -> (Vec<String>, Vec<String>) {
    let unique: BTreeSet<&str> = trials.iter().map(|t| t.meta.subject.as_str()).collect();
    let sorted: Vec<String> = unique.into_iter().map(str::to_string).collect();
    let split = adult_count.min(sorted.len());
    let evaluated = sorted[..split].to_vec();
    let reserved = sorted[split..].to_vec();
    (evaluated, reserved)
}

/// Build one [`Fold`] per subject in `evaluated`, in order.
pub fn leave_one_subject_out(trials: &[Trial], evaluated: &[String]) -> Vec<Fold> {
    let mut folds = Vec::with_capacity(evaluated.len());
    for subject in evaluated {
        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();
        for (idx, trial) in trials.iter().enumerate() {
            if &trial.meta.subject == subject {
                test_indices.push(idx);
            } else {
                train_indices.push(idx);
            }
        }
        debug!(
            subject = subject.as_str(),
            train = train_indices.len(),
            test = test_indices.len(),
            "built fold"
        );
        folds.push(Fold {
            held_out: subject.clone(),
            train_indices,
            test_indices,
        });
    }
    folds
}

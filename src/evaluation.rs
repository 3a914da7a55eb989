use log::info;
use rayon::prelude::*;

use crate::classifier::{CandidateKs, MultiKClassifier, Predictions};
use crate::dataset::Dataset;
use crate::{KnnError, Label, Result};

// Headline guess for one test example next to its true label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub predicted: Label,
    pub actual: Label,
}

// Running per-k correctness counts over a batch of test examples.
// `counts` follows the candidate order, so the first entry is the first k inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationTracker {
    counts: Vec<(usize, usize)>,
    outcomes: Vec<Outcome>,
}

impl EvaluationTracker {
    pub fn new(ks: &CandidateKs) -> Self {
        EvaluationTracker {
            counts: ks.as_slice().iter().map(|&k| (k, 0)).collect(),
            outcomes: Vec::new(),
        }
    }

    // Score one example's predictions against its true label.
    // The predictions must cover the tracked k values in the same order.
    pub fn record(&mut self, predictions: &Predictions, actual: Label) -> Result<()> {
        let aligned = predictions.len() == self.counts.len()
            && self
                .counts
                .iter()
                .zip(predictions.iter())
                .all(|((k, _), (predicted_k, _))| *k == predicted_k);
        if !aligned {
            return Err(KnnError::CandidateMismatch {
                expected: self.counts.iter().map(|(k, _)| *k).collect(),
                got: predictions.iter().map(|(k, _)| k).collect(),
            });
        }

        for ((_, count), (_, predicted)) in self.counts.iter_mut().zip(predictions.iter()) {
            if predicted == actual {
                *count += 1;
            }
        }
        self.outcomes.push(Outcome {
            predicted: predictions.headline(),
            actual,
        });
        Ok(())
    }

    // Combine two trackers over consecutive slices of the same test set
    pub fn merge(mut self, other: EvaluationTracker) -> Self {
        for ((_, count), (_, more)) in self.counts.iter_mut().zip(other.counts) {
            *count += more;
        }
        self.outcomes.extend(other.outcomes);
        self
    }

    pub fn evaluated(&self) -> usize {
        self.outcomes.len()
    }

    pub fn counts(&self) -> &[(usize, usize)] {
        &self.counts
    }

    pub fn count(&self, k: usize) -> Option<usize> {
        self.counts.iter().find(|(x, _)| *x == k).map(|(_, c)| *c)
    }

    pub fn accuracy(&self, k: usize) -> Option<f64> {
        let count = self.count(k)?;
        if self.outcomes.is_empty() {
            return Some(0.0);
        }
        Some(count as f64 / self.outcomes.len() as f64)
    }

    // The k with the most correct guesses; the earliest inserted k wins a draw
    pub fn best_k(&self) -> usize {
        let mut best = self.counts[0];
        for &(k, count) in &self.counts[1..] {
            if count > best.1 {
                best = (k, count);
            }
        }
        best.0
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }
}

// Both datasets must describe images of the same size
fn check_compatible(classifier: &MultiKClassifier, test: &Dataset) -> Result<()> {
    let expected = classifier.training().dimensionality();
    if test.dimensionality() != expected {
        return Err(KnnError::DimensionMismatch {
            expected,
            got: test.dimensionality(),
        });
    }
    Ok(())
}

// Classify every test example in order, one at a time.
// With `report_progress` the 25/50/75/95% milestones are logged.
pub fn evaluate(
    classifier: &MultiKClassifier,
    test: &Dataset,
    report_progress: bool,
) -> Result<EvaluationTracker> {
    check_compatible(classifier, test)?;
    let mut tracker = EvaluationTracker::new(classifier.candidate_ks());
    let mut progress = Progress::new(test.len(), report_progress);
    for (i, example) in test.iter().enumerate() {
        let predictions = classifier.classify(&example.vector)?;
        tracker.record(&predictions, example.label)?;
        progress.update(i);
    }
    Ok(tracker)
}

// Same result as `evaluate`, with the test set split across the rayon pool.
// Each split folds into its own tracker and the trackers are merged in order.
pub fn evaluate_parallel(
    classifier: &MultiKClassifier,
    test: &Dataset,
) -> Result<EvaluationTracker> {
    check_compatible(classifier, test)?;
    let ks = classifier.candidate_ks();
    test.examples()
        .par_iter()
        .try_fold(
            || EvaluationTracker::new(ks),
            |mut tracker, example| {
                let predictions = classifier.classify(&example.vector)?;
                tracker.record(&predictions, example.label)?;
                Ok::<_, KnnError>(tracker)
            },
        )
        .try_reduce(|| EvaluationTracker::new(ks), |a, b| Ok(a.merge(b)))
}

// Logs 25/50/75/95% milestones of a serial run; silent when disabled
struct Progress {
    total: usize,
    next: usize,
    enabled: bool,
}

const MILESTONES: [usize; 4] = [25, 50, 75, 95];

impl Progress {
    fn new(total: usize, enabled: bool) -> Self {
        Progress {
            total,
            next: 0,
            enabled,
        }
    }

    // Returns the milestone logged for this example, if any
    fn update(&mut self, index: usize) -> Option<usize> {
        if !self.enabled {
            return None;
        }
        let percent = *MILESTONES.get(self.next)?;
        if index * 100 > self.total * percent {
            info!("\t{}% complete...", percent);
            self.next += 1;
            return Some(percent);
        }
        None
    }
}

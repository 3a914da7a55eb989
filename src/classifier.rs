use std::collections::HashMap;

use log::debug;

use crate::dataset::Dataset;
use crate::distance::Metric;
use crate::ranker::{rank, Neighbor};
use crate::{KnnError, Label, Pixel, Result};

// The k values evaluated together, in the order the caller gave them.
// The last one is the headline k whose prediction is shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateKs(Vec<usize>);

impl CandidateKs {
    // Duplicates are dropped, keeping the first occurrence
    pub fn new(ks: impl IntoIterator<Item = usize>) -> Result<Self> {
        let mut unique: Vec<usize> = Vec::new();
        for k in ks {
            if k == 0 {
                return Err(KnnError::InvalidK);
            }
            if !unique.contains(&k) {
                unique.push(k);
            }
        }
        if unique.is_empty() {
            return Err(KnnError::InvalidK);
        }
        Ok(CandidateKs(unique))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn headline(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    pub fn max(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

// One predicted label per candidate k, in candidate order.
// Only built by the classifier, so it is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predictions(Vec<(usize, Label)>);

impl Predictions {
    pub(crate) fn from_pairs(pairs: Vec<(usize, Label)>) -> Self {
        debug_assert!(!pairs.is_empty());
        Predictions(pairs)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Label)> + '_ {
        self.0.iter().copied()
    }

    pub fn get(&self, k: usize) -> Option<Label> {
        self.0.iter().find(|(x, _)| *x == k).map(|(_, label)| *label)
    }

    // Prediction of the last candidate k
    pub fn headline(&self) -> Label {
        self.0[self.0.len() - 1].1
    }
}

pub struct MultiKClassifier {
    training: Dataset,
    ks: CandidateKs,
    metric: Box<dyn Metric>,
}

impl MultiKClassifier {
    pub fn new(training: Dataset, ks: CandidateKs, metric: Box<dyn Metric>) -> Result<Self> {
        if let Some(&k) = ks.as_slice().iter().find(|&&k| k > training.len()) {
            return Err(KnnError::InsufficientNeighbors {
                k,
                available: training.len(),
            });
        }
        debug!(
            "Classifier ready: {} training examples of {} pixels, k = {:?}",
            training.len(),
            training.dimensionality(),
            ks.as_slice()
        );
        Ok(MultiKClassifier {
            training,
            ks,
            metric,
        })
    }

    pub fn candidate_ks(&self) -> &CandidateKs {
        &self.ks
    }

    pub fn training(&self) -> &Dataset {
        &self.training
    }

    // Rank the training set once and derive a prediction for every candidate k
    pub fn classify(&self, query: &[Pixel]) -> Result<Predictions> {
        let ranked = rank(self.metric.as_ref(), query, &self.training)?;
        self.classify_ranked(&ranked)
    }

    // Majority vote for every candidate k over a single ranked neighbor list.
    // The tally grows one neighbor at a time and each k reads off the current
    // leader once k neighbors have voted. Ties on votes go to the label whose
    // closest neighbor ranks first.
    pub fn classify_ranked(&self, ranked: &[Neighbor]) -> Result<Predictions> {
        let max_k = self.ks.max();
        if ranked.len() < max_k {
            return Err(KnnError::InsufficientNeighbors {
                k: max_k,
                available: ranked.len(),
            });
        }

        // Visit the candidates smallest k first, remembering where each one goes
        let mut order: Vec<usize> = (0..self.ks.len()).collect();
        order.sort_by_key(|&i| self.ks.as_slice()[i]);
        let mut pending = order.into_iter().peekable();

        let mut predicted = vec![0; self.ks.len()];
        // label -> (votes, rank of its closest neighbor)
        let mut tally: HashMap<Label, (usize, usize)> = HashMap::new();
        let mut leader: (Label, usize, usize) = (ranked[0].label, 0, 0);

        for (position, neighbor) in ranked.iter().take(max_k).enumerate() {
            let entry = tally.entry(neighbor.label).or_insert((0, position));
            entry.0 += 1;
            let (votes, first) = *entry;
            if votes > leader.1 || (votes == leader.1 && first < leader.2) {
                leader = (neighbor.label, votes, first);
            }

            let seen = position + 1;
            while let Some(&slot) = pending.peek() {
                if self.ks.as_slice()[slot] != seen {
                    break;
                }
                predicted[slot] = leader.0;
                pending.next();
            }
        }

        Ok(Predictions::from_pairs(
            self.ks.as_slice().iter().copied().zip(predicted).collect(),
        ))
    }
}

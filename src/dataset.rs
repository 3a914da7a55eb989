use std::ops::Deref;

use log::debug;
use rand::{seq::index, Rng};

use crate::{KnnError, Label, Pixel, Result};

// One image, flattened row by row into pixel codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureVector(Box<[Pixel]>);

impl FeatureVector {
    pub fn new(pixels: Vec<Pixel>) -> Result<Self> {
        if let Some(&value) = pixels.iter().find(|&&p| p > 2) {
            return Err(KnnError::InvalidPixel { value });
        }
        Ok(FeatureVector(pixels.into_boxed_slice()))
    }

    pub fn as_slice(&self) -> &[Pixel] {
        &self.0
    }
}

impl Deref for FeatureVector {
    type Target = [Pixel];

    fn deref(&self) -> &[Pixel] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub vector: FeatureVector,
    pub label: Label,
}

impl LabeledExample {
    pub fn new(vector: FeatureVector, label: Label) -> Self {
        LabeledExample { vector, label }
    }
}

// An ordered, non-empty collection of examples which all share one vector length.
// Used for both the training and the test side.
#[derive(Debug, Clone)]
pub struct Dataset {
    examples: Vec<LabeledExample>,
    dimensionality: usize,
}

impl Dataset {
    // `name` only shows up in the error when the collection is empty
    pub fn new(name: &'static str, examples: Vec<LabeledExample>) -> Result<Self> {
        let dimensionality = examples
            .first()
            .ok_or(KnnError::EmptyDataset(name))?
            .vector
            .len();
        if let Some(bad) = examples
            .iter()
            .find(|example| example.vector.len() != dimensionality)
        {
            return Err(KnnError::DimensionMismatch {
                expected: dimensionality,
                got: bad.vector.len(),
            });
        }
        Ok(Dataset {
            examples,
            dimensionality,
        })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    // False for any constructed dataset
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabeledExample> {
        self.examples.iter()
    }

    // Random subset holding `percent` of the examples, in their original order.
    // Always keeps at least one example.
    pub fn sample_fraction(&self, percent: f64, rng: &mut impl Rng) -> Result<Dataset> {
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(KnnError::InvalidPercent(percent));
        }
        if percent == 100.0 {
            return Ok(self.clone());
        }
        let amount = ((self.len() as f64 * percent / 100.0).round() as usize).max(1);
        self.sample_count(amount, rng)
    }

    // Random subset of `n` examples (or all of them if there are fewer), in original order.
    // Asking for none would leave an empty dataset.
    pub fn sample_count(&self, n: usize, rng: &mut impl Rng) -> Result<Dataset> {
        if n == 0 {
            return Err(KnnError::EmptyDataset("sampled"));
        }
        let amount = n.min(self.len());
        let mut picked = index::sample(rng, self.len(), amount).into_vec();
        picked.sort_unstable();
        debug!("Sampled {} of {} examples", amount, self.len());
        Ok(Dataset {
            examples: picked.into_iter().map(|i| self.examples[i].clone()).collect(),
            dimensionality: self.dimensionality,
        })
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LabeledExample;
    type IntoIter = std::slice::Iter<'a, LabeledExample>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

#[cfg(test)]
pub(crate) fn example(pixels: &[Pixel], label: Label) -> LabeledExample {
    LabeledExample::new(FeatureVector::new(pixels.to_vec()).unwrap(), label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn numbered(n: usize) -> Dataset {
        Dataset::new("training", (0..n).map(|i| example(&[0, 1], i)).collect()).unwrap()
    }

    #[test]
    fn test_rejects_bad_pixels() {
        assert!(matches!(
            FeatureVector::new(vec![0, 1, 3]),
            Err(KnnError::InvalidPixel { value: 3 })
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Dataset::new("test", vec![]),
            Err(KnnError::EmptyDataset("test"))
        ));
    }

    #[test]
    fn test_rejects_mixed_lengths() {
        let examples = vec![example(&[0, 1, 2], 0), example(&[0, 1], 1)];
        assert!(matches!(
            Dataset::new("training", examples),
            Err(KnnError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_sample_fraction() {
        let data = numbered(200);
        let mut rng = SmallRng::seed_from_u64(0);
        let sampled = data.sample_fraction(25.0, &mut rng).unwrap();
        assert_eq!(sampled.len(), 50);
        assert_eq!(sampled.dimensionality(), 2);
        // Original order is preserved
        let labels: Vec<Label> = sampled.iter().map(|e| e.label).collect();
        assert!(labels.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(data.sample_fraction(100.0, &mut rng).unwrap().len(), 200);
        assert_eq!(data.sample_fraction(0.01, &mut rng).unwrap().len(), 1);
        assert!(data.sample_fraction(0.0, &mut rng).is_err());
        assert!(data.sample_fraction(150.0, &mut rng).is_err());
    }

    #[test]
    fn test_sample_count() {
        let data = numbered(10);
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(data.sample_count(4, &mut rng).unwrap().len(), 4);
        assert_eq!(data.sample_count(40, &mut rng).unwrap().len(), 10);
    }

    #[test]
    fn test_sample_count_of_zero() {
        let data = numbered(10);
        let mut rng = SmallRng::seed_from_u64(7);
        assert!(matches!(
            data.sample_count(0, &mut rng),
            Err(KnnError::EmptyDataset("sampled"))
        ));
    }
}

use crate::{KnnError, Pixel, Result};

// A distance between two pixel vectors of equal length.
// Implementations may assume equal lengths; `distance` checks it.
pub trait Metric: Sync {
    fn measure(&self, a: &[Pixel], b: &[Pixel]) -> f64;
}

// Sum of squared per-pixel differences. Ranks exactly like Euclidean distance without the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl Metric for SquaredEuclidean {
    fn measure(&self, a: &[Pixel], b: &[Pixel]) -> f64 {
        let sum: u64 = a
            .iter()
            .zip(b)
            .map(|(&x, &y)| {
                let d = x.abs_diff(y) as u64;
                d * d
            })
            .sum();
        sum as f64
    }
}

impl Metric for Euclidean {
    fn measure(&self, a: &[Pixel], b: &[Pixel]) -> f64 {
        SquaredEuclidean.measure(a, b).sqrt()
    }
}

impl Metric for Manhattan {
    fn measure(&self, a: &[Pixel], b: &[Pixel]) -> f64 {
        let sum: u64 = a.iter().zip(b).map(|(&x, &y)| x.abs_diff(y) as u64).sum();
        sum as f64
    }
}

// Checked distance between a query and a reference vector
pub fn distance(metric: &dyn Metric, query: &[Pixel], reference: &[Pixel]) -> Result<f64> {
    if query.len() != reference.len() {
        return Err(KnnError::DimensionMismatch {
            expected: reference.len(),
            got: query.len(),
        });
    }
    Ok(metric.measure(query, reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_euclidean() {
        assert_eq!(SquaredEuclidean.measure(&[0, 0, 1], &[0, 0, 0]), 1.0);
        assert_eq!(SquaredEuclidean.measure(&[0, 0, 1], &[2, 2, 2]), 9.0);
        assert_eq!(SquaredEuclidean.measure(&[2, 1, 0], &[2, 1, 0]), 0.0);
    }

    #[test]
    fn test_other_metrics() {
        assert_eq!(Euclidean.measure(&[0, 0], &[2, 2]), 8.0_f64.sqrt());
        assert_eq!(Manhattan.measure(&[0, 2, 1], &[2, 0, 1]), 4.0);
    }

    #[test]
    fn test_length_mismatch() {
        let result = distance(&SquaredEuclidean, &[0; 10], &[0; 12]);
        assert!(matches!(
            result,
            Err(KnnError::DimensionMismatch {
                expected: 12,
                got: 10
            })
        ));
    }
}

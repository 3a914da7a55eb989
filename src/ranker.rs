use crate::dataset::Dataset;
use crate::distance::Metric;
use crate::{KnnError, Label, Pixel, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f64,
    pub label: Label,
}

// Rank every training example by its distance from the query, closest first.
// Equidistant examples keep their order in the dataset, so the earlier one is
// treated as the closer neighbor.
pub fn rank(metric: &dyn Metric, query: &[Pixel], training: &Dataset) -> Result<Vec<Neighbor>> {
    // Check the length once up front rather than per training example
    if query.len() != training.dimensionality() {
        return Err(KnnError::DimensionMismatch {
            expected: training.dimensionality(),
            got: query.len(),
        });
    }

    let mut ranked: Vec<Neighbor> = training
        .iter()
        .map(|example| Neighbor {
            distance: metric.measure(query, &example.vector),
            label: example.label,
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::example;
    use crate::distance::{Manhattan, SquaredEuclidean};

    #[test]
    fn test_rank_orders_by_distance() {
        let training = Dataset::new(
            "training",
            vec![
                example(&[2, 2, 2], 8),
                example(&[0, 0, 0], 5),
                example(&[0, 1, 1], 3),
            ],
        )
        .unwrap();
        let ranked = rank(&SquaredEuclidean, &[0, 0, 1], &training).unwrap();
        let labels: Vec<Label> = ranked.iter().map(|n| n.label).collect();
        assert_eq!(labels, vec![5, 3, 8]);
        let distances: Vec<f64> = ranked.iter().map(|n| n.distance).collect();
        assert_eq!(distances, vec![1.0, 1.0, 9.0]);
    }

    #[test]
    fn test_ties_keep_dataset_order() {
        // [1, 0] and [0, 1] are both at distance 1 from [0, 0]
        let training = Dataset::new(
            "training",
            vec![example(&[1, 0], 7), example(&[0, 1], 4), example(&[0, 0], 9)],
        )
        .unwrap();
        let ranked = rank(&Manhattan, &[0, 0], &training).unwrap();
        let labels: Vec<Label> = ranked.iter().map(|n| n.label).collect();
        assert_eq!(labels, vec![9, 7, 4]);
    }

    #[test]
    fn test_rank_rejects_wrong_length() {
        let training = Dataset::new("training", vec![example(&[0; 12], 1)]).unwrap();
        assert!(matches!(
            rank(&SquaredEuclidean, &[0; 10], &training),
            Err(KnnError::DimensionMismatch {
                expected: 12,
                got: 10
            })
        ));
    }
}

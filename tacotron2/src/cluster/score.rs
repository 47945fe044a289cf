//! Clustering quality score.

use candle_core::{DType, Tensor};

use crate::cluster::distance::DistanceMetric;
use crate::error::Result;

/// Sum of distances from each point to its assigned centroid (lower is better).
///
/// Uses the same metric as the run being scored so restarts compare on one scale.
pub fn compute_score(
    points: &Tensor,
    assignment: &Tensor,
    centroids: &Tensor,
    metric: DistanceMetric,
) -> Result<f32> {
    let assigned = centroids.index_select(assignment, 0)?;
    let distances = metric.paired(points, &assigned)?;
    Ok(distances.sum_all()?.to_dtype(DType::F32)?.to_scalar::<f32>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_score_sums_assigned_distances() -> Result<()> {
        let device = Device::Cpu;
        let points = Tensor::from_vec(vec![0.0f32, 0.0, 0.0, 4.0, 10.0, 0.0], (3, 2), &device)?;
        let centroids = Tensor::from_vec(vec![0.0f32, 1.0, 10.0, 0.0], (2, 2), &device)?;
        let assignment = Tensor::from_vec(vec![0u32, 0, 1], 3, &device)?;

        let score = compute_score(&points, &assignment, &centroids, DistanceMetric::Euclidean)?;
        // 1 + 3 + 0
        assert!((score - 4.0).abs() < 1e-6);

        let score = compute_score(&points, &assignment, &centroids, DistanceMetric::Manhattan)?;
        assert!((score - 4.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_better_assignment_scores_lower() -> Result<()> {
        let device = Device::Cpu;
        let points = Tensor::from_vec(vec![0.0f32, 1.0, 9.0, 10.0], (4, 1), &device)?;
        let centroids = Tensor::from_vec(vec![0.5f32, 9.5], (2, 1), &device)?;

        let good = Tensor::from_vec(vec![0u32, 0, 1, 1], 4, &device)?;
        let bad = Tensor::from_vec(vec![1u32, 1, 0, 0], 4, &device)?;

        let metric = DistanceMetric::Euclidean;
        assert!(
            compute_score(&points, &good, &centroids, metric)?
                < compute_score(&points, &bad, &centroids, metric)?
        );
        Ok(())
    }
}

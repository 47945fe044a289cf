//! Clustering over batches of point sets.
//!
//! Every set is clustered independently with the same configuration and `k`.

use candle_core::{DType, Tensor};

use crate::cluster::kmeans::{ClusterResult, KMeans};
use crate::config::kmeans_config::KMeansConfig;
use crate::error::{ClusterError, Result};

/// Cluster a tensor of point sets.
///
/// - rank 1 `(N,)`: scalar points, treated as `(N, 1)`
/// - rank 2 `(N, D)`: a single point set
/// - rank 3 `(B, N, D)`: B point sets of equal size, one result per set
///
/// Inputs are converted to F32 before clustering.
pub fn cluster_batch(points: &Tensor, k: usize, config: &KMeansConfig) -> Result<Vec<ClusterResult>> {
    let points = points.to_dtype(DType::F32)?;
    let kmeans = KMeans::new(config.clone())?;

    match points.rank() {
        1 => Ok(vec![kmeans.fit(&points.unsqueeze(1)?, k)?]),
        2 => Ok(vec![kmeans.fit(&points, k)?]),
        3 => {
            let batch = points.dim(0)?;
            tracing::debug!(batch, k, "clustering point-set batch");
            (0..batch)
                .map(|b| kmeans.fit(&points.get(b)?, k))
                .collect()
        }
        rank => Err(ClusterError::input(format!(
            "expected a point set of rank 1, 2 or 3, got shape {:?} (rank {rank})",
            points.dims()
        ))),
    }
}

/// Cluster a list of point sets that may differ in size.
///
/// Each element follows the rank-1/rank-2 rules of [`cluster_batch`]; an empty
/// list yields an empty result.
pub fn cluster_each(sets: &[Tensor], k: usize, config: &KMeansConfig) -> Result<Vec<ClusterResult>> {
    let kmeans = KMeans::new(config.clone())?;

    sets.iter()
        .enumerate()
        .map(|(i, set)| {
            let set = set.to_dtype(DType::F32)?;
            let set = match set.rank() {
                1 => set.unsqueeze(1)?,
                2 => set,
                _ => {
                    return Err(ClusterError::input(format!(
                        "point set {i} must be rank 1 or 2, got shape {:?}",
                        set.dims()
                    )));
                }
            };
            kmeans.fit(&set, k)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn config() -> KMeansConfig {
        KMeansConfig::default().with_random_state(Some(11)).with_n_init(2)
    }

    #[test]
    fn test_rank1_is_scalar_points() -> Result<()> {
        let points = Tensor::new(&[0.0f32, 0.1, 9.9, 10.0], &Device::Cpu)?;
        let results = cluster_batch(&points, 2, &config())?;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].centroids.dims(), &[2, 1]);

        let a = results[0].assignment_vec()?;
        assert_eq!(a[0], a[1]);
        assert_eq!(a[2], a[3]);
        assert_ne!(a[0], a[2]);
        Ok(())
    }

    #[test]
    fn test_rank3_clusters_each_element() -> Result<()> {
        let data: Vec<f32> = vec![
            0.0, 0.0, 0.0, 1.0, 5.0, 5.0, 5.0, 6.0, // set 0
            1.0, 1.0, 2.0, 2.0, 8.0, 8.0, 9.0, 9.0, // set 1
            3.0, 0.0, 3.0, 0.5, 3.0, 7.0, 3.0, 7.5, // set 2
        ];
        let points = Tensor::from_vec(data, (3, 4, 2), &Device::Cpu)?;
        let results = cluster_batch(&points, 2, &config())?;

        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.centroids.dims(), &[2, 2]);
            assert_eq!(result.assignment.dims(), &[4]);
        }
        Ok(())
    }

    #[test]
    fn test_rank4_rejected() -> Result<()> {
        let points = Tensor::zeros((1, 2, 3, 2), DType::F32, &Device::Cpu)?;
        let err = cluster_batch(&points, 1, &config()).unwrap_err();
        assert!(matches!(err, ClusterError::InvalidInput(_)));
        Ok(())
    }

    #[test]
    fn test_f64_input_converted() -> Result<()> {
        let points = Tensor::from_vec(vec![0.0f64, 1.0, 2.0, 3.0], (2, 2), &Device::Cpu)?;
        let results = cluster_batch(&points, 1, &config())?;
        assert_eq!(results[0].centroids.dtype(), DType::F32);
        assert_eq!(results[0].centroid_rows()?, vec![vec![1.0, 2.0]]);
        Ok(())
    }

    #[test]
    fn test_cluster_each_heterogeneous() -> Result<()> {
        let device = Device::Cpu;
        let sets = vec![
            Tensor::from_vec(vec![0.0f32, 0.0, 1.0, 1.0, 4.0, 4.0], (3, 2), &device)?,
            Tensor::new(&[1.0f32, 2.0, 30.0, 31.0, 32.0], &device)?,
        ];
        let results = cluster_each(&sets, 2, &config())?;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].assignment.dims(), &[3]);
        assert_eq!(results[1].assignment.dims(), &[5]);
        assert_eq!(results[1].centroids.dims(), &[2, 1]);
        Ok(())
    }

    #[test]
    fn test_cluster_each_empty_list() -> Result<()> {
        assert!(cluster_each(&[], 3, &config())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_cluster_each_k_too_large() -> Result<()> {
        let sets = vec![Tensor::new(&[1.0f32, 2.0], &Device::Cpu)?];
        let err = cluster_each(&sets, 3, &config()).unwrap_err();
        assert!(err.is_invalid_config());
        Ok(())
    }
}

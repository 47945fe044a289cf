//! Centroid recomputation from the current assignment.
//!
//! The aggregator only reports clusters that received at least one point. The
//! orchestrator then merges those means back into the full K-row centroid set
//! with [`merge_by_key`], keeping previous positions for empty clusters.

use candle_core::{D, DType, Tensor};

use crate::error::{ClusterError, Result};

/// Means of the non-empty clusters.
#[derive(Debug, Clone)]
pub struct CentroidUpdate {
    /// Cluster ids with at least one assigned point, ascending.
    pub ids: Vec<u32>,
    /// (ids.len(), D) means, row `r` belongs to cluster `ids[r]`.
    pub means: Tensor,
}

impl CentroidUpdate {
    /// Number of clusters that received points.
    pub fn present(&self) -> usize {
        self.ids.len()
    }

    /// True when at least one of the `k` clusters got no points.
    pub fn has_shortfall(&self, k: usize) -> bool {
        self.ids.len() < k
    }
}

/// Recompute per-cluster means.
///
/// Input: points (N, D) F32, assignment (N,) U32 with values in `[0, k)`
///
/// Sums come from a single (K, N) one-hot matmul and counts from its row sums,
/// so the work is one dense product regardless of N.
pub fn compute_centroids(points: &Tensor, assignment: &Tensor, k: usize) -> Result<CentroidUpdate> {
    let device = points.device();

    let cluster_ids = Tensor::arange(0u32, k as u32, device)?;
    let one_hot = cluster_ids
        .unsqueeze(1)?
        .broadcast_eq(&assignment.unsqueeze(0)?)?
        .to_dtype(points.dtype())?;

    let sums = one_hot.matmul(points)?;
    let counts = one_hot.sum(D::Minus1)?;

    let ids: Vec<u32> = counts
        .to_dtype(DType::F32)?
        .to_vec1::<f32>()?
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0.0)
        .map(|(id, _)| id as u32)
        .collect();

    if ids.is_empty() {
        return Err(ClusterError::input("cannot aggregate an empty point set"));
    }

    let index = Tensor::from_slice(&ids, ids.len(), device)?;
    let means = sums
        .index_select(&index, 0)?
        .broadcast_div(&counts.index_select(&index, 0)?.unsqueeze(1)?)?;

    Ok(CentroidUpdate { ids, means })
}

/// Merge recomputed means into the previous centroid set by cluster id.
///
/// Row `i` of the result is the new mean of cluster `i` when it is present in
/// `update`, otherwise row `i` of `previous`. The result always has the same
/// (K, D) shape as `previous`.
pub fn merge_by_key(update: &CentroidUpdate, previous: &Tensor) -> Result<Tensor> {
    let k = previous.dim(0)?;
    let present = update.ids.len();

    if present == k && update.ids.iter().enumerate().all(|(i, &id)| id as usize == i) {
        return Ok(update.means.clone());
    }
    if present == 0 {
        return Ok(previous.clone());
    }

    // Rows of `pool`: [0, present) are the new means, [present, present + k) the old centroids
    let mut slot: Vec<Option<u32>> = vec![None; k];
    for (row, &id) in update.ids.iter().enumerate() {
        let id = id as usize;
        if id >= k {
            return Err(ClusterError::input(format!(
                "cluster id {id} out of range for {k} centroids"
            )));
        }
        slot[id] = Some(row as u32);
    }
    let gather: Vec<u32> = slot
        .iter()
        .enumerate()
        .map(|(id, row)| row.unwrap_or((present + id) as u32))
        .collect();

    let pool = Tensor::cat(&[&update.means, previous], 0)?;
    let index = Tensor::from_vec(gather, k, previous.device())?;
    Ok(pool.index_select(&index, 0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_compute_centroids_all_present() -> Result<()> {
        let device = Device::Cpu;
        let points = Tensor::from_vec(vec![0.0f32, 0.0, 2.0, 2.0, 10.0, 10.0], (3, 2), &device)?;
        let assignment = Tensor::from_vec(vec![0u32, 0, 1], 3, &device)?;

        let update = compute_centroids(&points, &assignment, 2)?;
        assert_eq!(update.ids, vec![0, 1]);
        assert!(!update.has_shortfall(2));
        assert_eq!(
            update.means.to_vec2::<f32>()?,
            vec![vec![1.0, 1.0], vec![10.0, 10.0]]
        );
        Ok(())
    }

    #[test]
    fn test_compute_centroids_reports_shortfall() -> Result<()> {
        let device = Device::Cpu;
        let points = Tensor::from_vec(vec![1.0f32, 3.0, 5.0], (3, 1), &device)?;
        let assignment = Tensor::from_vec(vec![2u32, 0, 2], 3, &device)?;

        let update = compute_centroids(&points, &assignment, 4)?;
        assert_eq!(update.ids, vec![0, 2]);
        assert_eq!(update.present(), 2);
        assert!(update.has_shortfall(4));
        assert_eq!(update.means.to_vec2::<f32>()?, vec![vec![3.0], vec![3.0]]);
        Ok(())
    }

    #[test]
    fn test_merge_by_key_keeps_stale_rows() -> Result<()> {
        let device = Device::Cpu;
        let previous = Tensor::from_vec(
            vec![0.0f32, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0],
            (4, 2),
            &device,
        )?;
        let update = CentroidUpdate {
            ids: vec![1, 3],
            means: Tensor::from_vec(vec![10.0f32, 10.0, 30.0, 30.0], (2, 2), &device)?,
        };

        let merged = merge_by_key(&update, &previous)?;
        assert_eq!(
            merged.to_vec2::<f32>()?,
            vec![
                vec![0.0, 0.0],
                vec![10.0, 10.0],
                vec![2.0, 2.0],
                vec![30.0, 30.0]
            ]
        );
        Ok(())
    }

    #[test]
    fn test_merge_by_key_full_update() -> Result<()> {
        let device = Device::Cpu;
        let previous = Tensor::zeros((2, 1), DType::F32, &device)?;
        let update = CentroidUpdate {
            ids: vec![0, 1],
            means: Tensor::from_vec(vec![4.0f32, 5.0], (2, 1), &device)?,
        };

        let merged = merge_by_key(&update, &previous)?;
        assert_eq!(merged.to_vec2::<f32>()?, vec![vec![4.0], vec![5.0]]);
        Ok(())
    }

    #[test]
    fn test_merge_by_key_rejects_out_of_range_id() -> Result<()> {
        let device = Device::Cpu;
        let previous = Tensor::zeros((2, 1), DType::F32, &device)?;
        let update = CentroidUpdate {
            ids: vec![5],
            means: Tensor::ones((1, 1), DType::F32, &device)?,
        };

        assert!(merge_by_key(&update, &previous).is_err());
        Ok(())
    }
}

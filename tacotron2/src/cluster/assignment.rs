//! Nearest-centroid assignment.

use candle_core::{D, Tensor};

use crate::cluster::distance::DistanceMetric;
use crate::error::Result;

/// Assign every point to its nearest centroid.
///
/// Input: points (N, D), centroids (K, D)
/// Output: (N,) U32 tensor of centroid indices in `[0, K)`
///
/// Ties resolve to the lowest centroid index, which is what argmin returns.
pub fn get_assignment(
    points: &Tensor,
    centroids: &Tensor,
    metric: DistanceMetric,
) -> Result<Tensor> {
    let distances = metric.pairwise(points, centroids)?;
    Ok(distances.argmin(D::Minus1)?)
}

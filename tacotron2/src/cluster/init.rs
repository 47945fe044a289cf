//! Initial centroid selection.

use std::fmt;
use std::str::FromStr;

use candle_core::{D, DType, Tensor};
use serde::Deserialize;

use crate::cluster::distance::DistanceMetric;
use crate::cluster::rng::ClusterRng;
use crate::error::{ClusterError, Result};

/// Centroid initialization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum InitMethod {
    /// K samples from a standard normal distribution.
    Normal,
    /// K samples uniform between the global min and max of the points.
    Uniform,
    /// K distinct points drawn without replacement.
    Random,
    /// Greedy farthest-point seeding from one random point.
    #[default]
    KMeansPlusPlus,
}

impl InitMethod {
    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            InitMethod::Normal => "normal",
            InitMethod::Uniform => "uniform",
            InitMethod::Random => "random",
            InitMethod::KMeansPlusPlus => "kmeans_pp",
        }
    }
}

impl FromStr for InitMethod {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(InitMethod::Normal),
            "uniform" => Ok(InitMethod::Uniform),
            "random" => Ok(InitMethod::Random),
            "kmeans_pp" | "kmeans++" => Ok(InitMethod::KMeansPlusPlus),
            other => Err(ClusterError::config(format!(
                "unknown initialization method: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for InitMethod {
    type Error = ClusterError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Produce `k` initial centroids of shape (k, D) for `points` (N, D).
pub fn init_centroids(
    points: &Tensor,
    k: usize,
    method: InitMethod,
    metric: DistanceMetric,
    rng: &mut ClusterRng,
) -> Result<Tensor> {
    let (n, dim) = points.dims2()?;
    let device = points.device();

    let centroids = match method {
        InitMethod::Normal => rng.randn(&[k, dim], device)?,
        InitMethod::Uniform => {
            let flat = points.flatten_all()?;
            let lo = flat.min(0)?.to_dtype(DType::F32)?.to_scalar::<f32>()?;
            let hi = flat.max(0)?.to_dtype(DType::F32)?.to_scalar::<f32>()?;
            rng.rand_uniform(&[k, dim], lo, hi, device)?
        }
        InitMethod::Random => {
            let mut indices: Vec<u32> = (0..n as u32).collect();
            rng.shuffle(&mut indices);
            indices.truncate(k);
            let index = Tensor::from_vec(indices, k.min(n), device)?;
            points.index_select(&index, 0)?
        }
        InitMethod::KMeansPlusPlus => kmeans_pp_init(points, k, metric, rng)?,
    };

    Ok(centroids.to_dtype(points.dtype())?)
}

/// Farthest-point seeding.
///
/// The first centroid is a uniformly random point. Each following centroid is
/// the point whose distance to its nearest chosen centroid is largest. Only the
/// first pick is random, so the whole sequence is fixed once it is made.
pub fn kmeans_pp_init(
    points: &Tensor,
    k: usize,
    metric: DistanceMetric,
    rng: &mut ClusterRng,
) -> Result<Tensor> {
    let n = points.dim(0)?;
    if n == 0 || k == 0 {
        return Err(ClusterError::input("k-means++ needs at least one point and one centroid"));
    }
    let device = points.device();

    let mut last = rng.below(n);
    let mut chosen: Vec<u32> = Vec::with_capacity(k);
    chosen.push(last as u32);

    // Running distance of every point to its nearest chosen centroid
    let mut nearest: Option<Tensor> = None;

    while chosen.len() < k {
        let newest = points.narrow(0, last, 1)?;
        let dist = metric.pairwise(points, &newest)?.squeeze(D::Minus1)?;

        let dist = match nearest {
            Some(prev) => prev.minimum(&dist)?,
            None => dist,
        };
        let next = dist.argmax(0)?.to_scalar::<u32>()?;

        tracing::trace!(
            centroid = chosen.len(),
            point = next,
            "k-means++ picked farthest point"
        );
        chosen.push(next);
        last = next as usize;
        nearest = Some(dist);
    }

    let index = Tensor::from_vec(chosen, k, device)?;
    Ok(points.index_select(&index, 0)?)
}

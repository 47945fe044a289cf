//! Distance metrics between point sets.
//!
//! All metrics are expressed as distances (lower = closer), so similarity
//! measures are converted before they reach argmin/argmax: cosine becomes
//! `1 - cos`, the dot product is negated.

use std::fmt;
use std::str::FromStr;

use candle_core::{D, Tensor};
use serde::Deserialize;

use crate::error::{ClusterError, Result};

/// Norm floor used when normalizing rows for the cosine metric.
const COSINE_EPS: f64 = 1e-12;

/// Named distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DistanceMetric {
    /// L2 distance. Named `euclidian` for compatibility with existing configs.
    #[default]
    Euclidean,
    /// L1 distance.
    Manhattan,
    /// `1 - cosine similarity`.
    Cosine,
    /// Negated dot product.
    DotProduct,
}

impl DistanceMetric {
    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidian",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::DotProduct => "dot_product",
        }
    }

    /// Full distance matrix between `a` (N, D) and `b` (M, D), shape (N, M).
    pub fn pairwise(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        let (_, dim_a) = a.dims2()?;
        let (_, dim_b) = b.dims2()?;
        if dim_a != dim_b {
            return Err(ClusterError::input(format!(
                "dimension mismatch: {dim_a} vs {dim_b}"
            )));
        }

        let distances = match self {
            DistanceMetric::Euclidean => a
                .unsqueeze(1)?
                .broadcast_sub(&b.unsqueeze(0)?)?
                .sqr()?
                .sum(D::Minus1)?
                .sqrt()?,
            DistanceMetric::Manhattan => a
                .unsqueeze(1)?
                .broadcast_sub(&b.unsqueeze(0)?)?
                .abs()?
                .sum(D::Minus1)?,
            DistanceMetric::Cosine => {
                let sim = normalize_rows(a)?.matmul(&normalize_rows(b)?.t()?)?;
                sim.affine(-1.0, 1.0)?
            }
            DistanceMetric::DotProduct => a.matmul(&b.t()?)?.neg()?,
        };
        Ok(distances)
    }

    /// Row-paired distances between `a` (N, D) and `b` (N, D), shape (N,).
    pub fn paired(&self, a: &Tensor, b: &Tensor) -> Result<Tensor> {
        if a.dims() != b.dims() {
            return Err(ClusterError::input(format!(
                "paired distance needs equal shapes, got {:?} and {:?}",
                a.dims(),
                b.dims()
            )));
        }

        let distances = match self {
            DistanceMetric::Euclidean => (a - b)?.sqr()?.sum(D::Minus1)?.sqrt()?,
            DistanceMetric::Manhattan => (a - b)?.abs()?.sum(D::Minus1)?,
            DistanceMetric::Cosine => (normalize_rows(a)? * normalize_rows(b)?)?
                .sum(D::Minus1)?
                .affine(-1.0, 1.0)?,
            DistanceMetric::DotProduct => (a * b)?.sum(D::Minus1)?.neg()?,
        };
        Ok(distances)
    }
}

/// Scale each row to unit L2 norm; zero rows stay zero.
fn normalize_rows(xs: &Tensor) -> Result<Tensor> {
    let norms = xs
        .sqr()?
        .sum_keepdim(D::Minus1)?
        .sqrt()?
        .clamp(COSINE_EPS, f64::INFINITY)?;
    Ok(xs.broadcast_div(&norms)?)
}

impl FromStr for DistanceMetric {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidian" | "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            "cosine" => Ok(DistanceMetric::Cosine),
            "dot_product" | "dp" | "dot" => Ok(DistanceMetric::DotProduct),
            other => Err(ClusterError::config(format!(
                "unknown distance metric: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for DistanceMetric {
    type Error = ClusterError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

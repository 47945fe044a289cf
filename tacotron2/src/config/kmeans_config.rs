//! k-means clustering configuration.

use serde::Deserialize;

use crate::cluster::distance::DistanceMetric;
use crate::cluster::init::InitMethod;
use crate::error::{ClusterError, Result};

/// Options for a clustering call.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a valid
/// configuration. Method and metric names are checked while deserializing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KMeansConfig {
    /// Number of independent restarts; the lowest-score run is kept (default: 5)
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    /// Iteration budget per run (default: 100)
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Stop once the summed absolute centroid shift drops below this (default: 1e-6)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Initialization strategy (default: "kmeans_pp")
    #[serde(default)]
    pub init_method: InitMethod,

    /// Distance metric name (default: "euclidian")
    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Seed for reproducible runs; None seeds from the clock
    #[serde(default)]
    pub random_state: Option<u64>,
}

fn default_n_init() -> usize {
    5
}
fn default_max_iter() -> usize {
    100
}
fn default_threshold() -> f64 {
    1e-6
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_init: default_n_init(),
            max_iter: default_max_iter(),
            threshold: default_threshold(),
            init_method: InitMethod::default(),
            distance_metric: DistanceMetric::default(),
            random_state: None,
        }
    }
}

impl KMeansConfig {
    /// Load configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    ///
    /// Falls back to defaults if the file doesn't exist or can't be parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to parse k-means config at {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }),
            Err(e) => {
                tracing::debug!(
                    "No k-means config at {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Check the parameters that do not depend on the point set.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ClusterError::config(format!(
                "threshold must be a finite value >= 0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Check `k` against a point set of `n_points` points.
    pub fn validate_k(&self, k: usize, n_points: usize) -> Result<()> {
        if k == 0 {
            return Err(ClusterError::config("k must be > 0"));
        }
        if k > n_points {
            return Err(ClusterError::config(format!(
                "cannot build {k} clusters from {n_points} points"
            )));
        }
        Ok(())
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_init_method(mut self, init_method: InitMethod) -> Self {
        self.init_method = init_method;
        self
    }

    pub fn with_distance_metric(mut self, distance_metric: DistanceMetric) -> Self {
        self.distance_metric = distance_metric;
        self
    }

    pub fn with_random_state(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }

    /// Merge user-provided parameters with these defaults.
    ///
    /// User values take precedence. Names are parsed here so an unknown
    /// method or metric fails before any clustering work starts.
    pub fn merge(
        &self,
        n_init: Option<usize>,
        max_iter: Option<usize>,
        threshold: Option<f64>,
        init_method: Option<&str>,
        distance_metric: Option<&str>,
        random_state: Option<u64>,
    ) -> Result<Self> {
        let merged = Self {
            n_init: n_init.unwrap_or(self.n_init),
            max_iter: max_iter.unwrap_or(self.max_iter),
            threshold: threshold.unwrap_or(self.threshold),
            init_method: init_method
                .map(str::parse::<InitMethod>)
                .transpose()?
                .unwrap_or(self.init_method),
            distance_metric: distance_metric
                .map(str::parse::<DistanceMetric>)
                .transpose()?
                .unwrap_or(self.distance_metric),
            random_state: random_state.or(self.random_state),
        };
        merged.validate()?;
        Ok(merged)
    }

    /// Seed for restart `run` given a base seed.
    pub fn restart_seed(base: u64, run: usize) -> u64 {
        base.wrapping_add(run as u64)
    }
}

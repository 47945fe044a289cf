//! Multi-restart k-means over candle tensors.
//!
//! A single run is: initialize, assign, then repeat (aggregate, merge-by-key,
//! convergence test, reassign) until the summed centroid shift falls below
//! `threshold` or `max_iter` iterations have been spent. With `n_init > 1`
//! independent runs execute in parallel and the lowest-score one is returned.

use candle_core::{DType, Tensor};
use rayon::prelude::*;

use crate::cluster::assignment::get_assignment;
use crate::cluster::centroids::{compute_centroids, merge_by_key};
use crate::cluster::init::init_centroids;
use crate::cluster::rng::{ClusterRng, entropy_seed};
use crate::cluster::score::compute_score;
use crate::config::kmeans_config::KMeansConfig;
use crate::error::{ClusterError, Result};

#[cfg(feature = "timing")]
use crate::cluster::timing::{
    ASSIGN_TIME_US, EMPTY_CLUSTER_EVENTS, INIT_TIME_US, ITERATIONS, RUNS, SCORE_TIME_US,
    UPDATE_TIME_US,
};

/// How a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The summed absolute centroid shift dropped below the threshold.
    Converged,
    /// The iteration budget ran out first (always the case for `max_iter = 0`).
    MaxIterReached,
}

/// Result of a clustering call.
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// (K, D) centroids; row i is cluster i.
    pub centroids: Tensor,
    /// (N,) U32 cluster index per point.
    pub assignment: Tensor,
    /// Sum of point-to-centroid distances, set when restarts were compared.
    pub score: Option<f32>,
    /// Refinement iterations performed (centroid updates computed).
    pub iterations: usize,
    pub termination: Termination,
}

impl ClusterResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Assignment copied to the host.
    pub fn assignment_vec(&self) -> Result<Vec<u32>> {
        Ok(self.assignment.to_vec1::<u32>()?)
    }

    /// Centroids copied to the host as rows.
    pub fn centroid_rows(&self) -> Result<Vec<Vec<f32>>> {
        Ok(self.centroids.to_dtype(DType::F32)?.to_vec2::<f32>()?)
    }

    /// Split into the plain (centroids, assignment) pair.
    pub fn into_parts(self) -> (Tensor, Tensor) {
        (self.centroids, self.assignment)
    }
}

/// k-means clustering with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    /// Create a clusterer, rejecting invalid configurations up front.
    pub fn new(config: KMeansConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Cluster `points` (N, D) into `k` groups.
    ///
    /// With `n_init > 1` the result carries the winning restart's score; a
    /// single run leaves `score` unset.
    pub fn fit(&self, points: &Tensor, k: usize) -> Result<ClusterResult> {
        let points = prepare_points(points)?;
        let (n, dim) = points.dims2()?;
        self.config.validate_k(k, n)?;

        let base_seed = self.config.random_state.unwrap_or_else(entropy_seed);

        tracing::info!(
            n,
            k,
            dim,
            n_init = self.config.n_init,
            max_iter = self.config.max_iter,
            init_method = %self.config.init_method,
            distance_metric = %self.config.distance_metric,
            "starting k-means"
        );

        if self.config.n_init <= 1 {
            let mut rng = ClusterRng::new(base_seed);
            return self.fit_single(&points, k, &mut rng);
        }

        self.fit_restarts(&points, k, base_seed)
    }

    /// Run `n_init` independent restarts and keep the lowest score.
    ///
    /// Restarts share only the read-only point tensor. Results are collected
    /// in restart order, so the fold below keeps the first-found run on ties
    /// no matter how rayon scheduled the work. Any failing restart fails the
    /// whole call.
    fn fit_restarts(&self, points: &Tensor, k: usize, base_seed: u64) -> Result<ClusterResult> {
        let metric = self.config.distance_metric;

        let runs = (0..self.config.n_init)
            .into_par_iter()
            .map(|run| {
                let mut rng = ClusterRng::new(KMeansConfig::restart_seed(base_seed, run));
                let result = self.fit_single(points, k, &mut rng)?;
                let score = crate::timed!(
                    &SCORE_TIME_US,
                    compute_score(points, &result.assignment, &result.centroids, metric)?
                );
                tracing::debug!(run, score, iterations = result.iterations, "restart finished");
                Ok((run, ClusterResult {
                    score: Some(score),
                    ..result
                }))
            })
            .collect::<Result<Vec<_>>>()?;

        let (best_run, best) = runs
            .into_iter()
            .reduce(|best, candidate| {
                if candidate.1.score < best.1.score {
                    candidate
                } else {
                    best
                }
            })
            .ok_or_else(|| ClusterError::config("n_init must be >= 1"))?;

        tracing::info!(
            best_run,
            score = best.score,
            n_init = self.config.n_init,
            "selected best restart"
        );
        Ok(best)
    }

    /// One initialization followed by refinement.
    fn fit_single(&self, points: &Tensor, k: usize, rng: &mut ClusterRng) -> Result<ClusterResult> {
        crate::increment_counter!(&RUNS);

        let centroids = crate::timed!(
            &INIT_TIME_US,
            init_centroids(
                points,
                k,
                self.config.init_method,
                self.config.distance_metric,
                rng,
            )?
        );

        self.refine_prepared(points, centroids)
    }

    /// Refine caller-supplied initial centroids (K, D) against `points` (N, D).
    ///
    /// Skips initialization entirely; useful for warm starts from a previous
    /// clustering.
    pub fn refine(&self, points: &Tensor, centroids: &Tensor) -> Result<ClusterResult> {
        let points = prepare_points(points)?;
        let centroids = centroids.to_dtype(DType::F32)?;

        let (n, dim) = points.dims2()?;
        let (k, centroid_dim) = centroids.dims2()?;
        if dim != centroid_dim {
            return Err(ClusterError::input(format!(
                "points have dimension {dim} but centroids have {centroid_dim}"
            )));
        }
        self.config.validate_k(k, n)?;

        self.refine_prepared(&points, centroids.to_device(points.device())?)
    }

    fn refine_prepared(&self, points: &Tensor, mut centroids: Tensor) -> Result<ClusterResult> {
        let metric = self.config.distance_metric;
        let k = centroids.dim(0)?;

        let mut assignment = crate::timed!(
            &ASSIGN_TIME_US,
            get_assignment(points, &centroids, metric)?
        );

        let mut iterations = 0;
        let mut termination = Termination::MaxIterReached;

        while iterations < self.config.max_iter {
            iterations += 1;
            crate::increment_counter!(&ITERATIONS);

            let new_centroids = crate::timed!(&UPDATE_TIME_US, {
                let update = compute_centroids(points, &assignment, k)?;
                if update.has_shortfall(k) {
                    crate::increment_counter!(&EMPTY_CLUSTER_EVENTS);
                    tracing::debug!(
                        iteration = iterations,
                        present = update.present(),
                        k,
                        "empty clusters keep their previous centroid"
                    );
                }
                merge_by_key(&update, &centroids)?
            });

            let shift = (&new_centroids - &centroids)?
                .abs()?
                .sum_all()?
                .to_dtype(DType::F64)?
                .to_scalar::<f64>()?;

            tracing::debug!(iteration = iterations, shift, "k-means iteration complete");

            if shift < self.config.threshold {
                termination = Termination::Converged;
                tracing::debug!(iterations, shift, "k-means converged");
                break;
            }

            centroids = new_centroids;
            assignment = crate::timed!(
                &ASSIGN_TIME_US,
                get_assignment(points, &centroids, metric)?
            );
        }

        Ok(ClusterResult {
            centroids,
            assignment,
            score: None,
            iterations,
            termination,
        })
    }
}

/// Cluster `points` into `k` groups and return `(centroids, assignment)`.
pub fn kmeans(points: &Tensor, k: usize, config: &KMeansConfig) -> Result<(Tensor, Tensor)> {
    Ok(KMeans::new(config.clone())?.fit(points, k)?.into_parts())
}

/// Check rank and convert to F32, the dtype all clustering math runs in.
fn prepare_points(points: &Tensor) -> Result<Tensor> {
    let (n, dim) = points.dims2().map_err(|_| {
        ClusterError::input(format!(
            "points must be a (N, D) matrix, got shape {:?}",
            points.dims()
        ))
    })?;
    if n == 0 || dim == 0 {
        return Err(ClusterError::input(format!(
            "points must be non-empty, got shape {:?}",
            points.dims()
        )));
    }
    Ok(points.to_dtype(DType::F32)?)
}

//! # Tacotron2
//!
//! Hyperparameters for a Tacotron2-style text-to-speech model, plus a k-means
//! clustering stack written on top of candle tensors.
//!
//! This crate provides:
//! - Model hyperparameter containers (`config::tacotron2_config`)
//! - Multi-restart k-means with pluggable initialization (`cluster::kmeans`)
//! - Batched clustering over stacks or lists of point sets (`cluster::wrapper`)
//! - Point-set file loading and JSON reports for the CLI (`io`)
//!
//! ## Clustering Overview
//!
//! A single k-means run goes through:
//! 1. Centroid initialization (`normal`, `uniform`, `random` or `kmeans_pp`)
//! 2. Nearest-centroid assignment over the full distance matrix
//! 3. Per-cluster means; empty clusters keep their previous centroid
//! 4. Repeat 2-3 until the total centroid shift drops below `threshold`
//!
//! With `n_init > 1` independent restarts run in parallel and the one with the
//! lowest score (sum of point-to-centroid distances) wins.
//!
//! ## Example
//!
//! ```no_run
//! use candle_core::{Device, Tensor};
//! use tacotron2::cluster::kmeans::KMeans;
//! use tacotron2::config::kmeans_config::KMeansConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let points = Tensor::from_vec(
//!     vec![0f32, 0., 0., 1., 10., 0., 10., 1.],
//!     (4, 2),
//!     &Device::Cpu,
//! )?;
//! let config = KMeansConfig::default().with_random_state(Some(42));
//! let result = KMeans::new(config)?.fit(&points, 2)?;
//! println!("{:?}", result.assignment_vec()?);
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod io;

pub use cluster::kmeans::{ClusterResult, KMeans, Termination, kmeans};
pub use cluster::wrapper::{cluster_batch, cluster_each};
pub use error::{ClusterError, Result};

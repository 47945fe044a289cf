use anyhow::Context;
use std::path::PathBuf;

use crate::config::kmeans_config::KMeansConfig;

pub mod point_set;
pub mod report;

/// File paths and I/O configuration.
#[derive(Debug, Clone, Default)]
pub struct IoArgs {
    /// Point-set file (format detected from extension: .json or text)
    pub input: PathBuf,

    /// Report destination; stdout when absent
    pub output: Option<PathBuf>,

    /// k-means configuration JSON, overridden by explicit flags
    pub config: Option<PathBuf>,

    /// Enable tracing output (debug logs)
    pub tracing: bool,
}

/// Clustering parameters given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ClusterArgs {
    /// Number of clusters
    pub k: usize,

    pub n_init: Option<usize>,

    pub max_iter: Option<usize>,

    pub threshold: Option<f64>,

    /// Initialization method name (normal, uniform, random, kmeans_pp)
    pub init_method: Option<String>,

    /// Distance metric name (euclidian, manhattan, cosine, dot_product)
    pub distance_metric: Option<String>,

    /// Random seed for reproducible clustering
    pub seed: Option<u64>,
}

impl ClusterArgs {
    /// Layer these arguments over `base`; explicit values win.
    pub fn to_config(&self, base: &KMeansConfig) -> crate::Result<KMeansConfig> {
        base.merge(
            self.n_init,
            self.max_iter,
            self.threshold,
            self.init_method.as_deref(),
            self.distance_metric.as_deref(),
            self.seed,
        )
    }
}

impl IoArgs {
    /// Base configuration from `--config`, or defaults when no file was given.
    ///
    /// An explicit file must exist and hold a valid configuration.
    pub fn load_config(&self) -> anyhow::Result<KMeansConfig> {
        let Some(ref path) = self.config else {
            return Ok(KMeansConfig::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = KMeansConfig::from_json(&content)
            .with_context(|| format!("Invalid k-means config in {:?}", path))?;
        tracing::debug!(path = ?path, "loaded k-means config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::init::InitMethod;

    #[test]
    fn test_cluster_args_override_file_config() {
        let base = KMeansConfig::from_json(r#"{"n_init": 2, "max_iter": 7}"#).unwrap();
        let args = ClusterArgs {
            k: 3,
            max_iter: Some(50),
            init_method: Some("random".to_string()),
            seed: Some(1),
            ..Default::default()
        };

        let config = args.to_config(&base).unwrap();
        assert_eq!(config.n_init, 2);
        assert_eq!(config.max_iter, 50);
        assert_eq!(config.init_method, InitMethod::Random);
        assert_eq!(config.random_state, Some(1));
    }

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn io_args(config: Option<PathBuf>) -> IoArgs {
        IoArgs {
            config,
            ..Default::default()
        }
    }

    #[test]
    fn test_load_config_without_path() {
        assert_eq!(IoArgs::default().load_config().unwrap(), KMeansConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let file = config_file(r#"{"n_init": 1, "init_method": "random"}"#);
        let config = io_args(Some(file.path().to_path_buf())).load_config().unwrap();
        assert_eq!(config.n_init, 1);
        assert_eq!(config.init_method, InitMethod::Random);
    }

    #[test]
    fn test_load_config_unknown_method_fails() {
        let file = config_file(r#"{"init_method": "forgy", "n_init": 1}"#);
        let err = io_args(Some(file.path().to_path_buf())).load_config().unwrap_err();
        assert!(format!("{err:#}").contains("forgy"));
    }

    #[test]
    fn test_load_config_invalid_threshold_fails() {
        let file = config_file(r#"{"threshold": -0.5}"#);
        let err = io_args(Some(file.path().to_path_buf())).load_config().unwrap_err();
        let cause = err.downcast_ref::<crate::ClusterError>().unwrap();
        assert!(cause.is_invalid_config());
    }

    #[test]
    fn test_load_config_missing_file_fails() {
        let args = io_args(Some(PathBuf::from("/nonexistent/kmeans.json")));
        assert!(args.load_config().is_err());
    }
}

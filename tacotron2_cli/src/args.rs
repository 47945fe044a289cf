use clap::Parser;
use std::path::PathBuf;
use tacotron2::io::{ClusterArgs, IoArgs};

/// k-means clustering over point-set files
///
/// Reads one or more point sets, clusters each into K groups and writes the
/// centroids and assignments as JSON.
#[derive(Parser, Debug)]
#[command(name = "tacotron2-kmeans")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Point-set file (format detected from extension: .json or text)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of clusters
    #[arg(short, long)]
    pub k: usize,

    /// k-means configuration JSON (flags below take precedence)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of restarts; the lowest-score run is kept
    #[arg(long)]
    pub n_init: Option<usize>,

    /// Iteration budget per restart
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Convergence threshold on the summed centroid shift
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Initialization method (normal, uniform, random, kmeans_pp)
    #[arg(long)]
    pub init_method: Option<String>,

    /// Distance metric (euclidian, manhattan, cosine, dot_product)
    #[arg(long)]
    pub distance_metric: Option<String>,

    /// Random seed for reproducible clustering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report file; printed to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Device to use (cpu, cuda, metal)
    #[arg(long, default_value = "cpu")]
    pub device: String,

    /// Enable tracing output (debug logs, filter with RUST_LOG)
    #[arg(long)]
    pub tracing: bool,
}

impl Cli {
    pub fn to_io_args(&self) -> IoArgs {
        IoArgs {
            input: self.input.clone(),
            output: self.output.clone(),
            config: self.config.clone(),
            tracing: self.tracing,
        }
    }

    pub fn to_cluster_args(&self) -> ClusterArgs {
        ClusterArgs {
            k: self.k,
            n_init: self.n_init,
            max_iter: self.max_iter,
            threshold: self.threshold,
            init_method: self.init_method.clone(),
            distance_metric: self.distance_metric.clone(),
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "tacotron2-kmeans",
            "-i",
            "points.txt",
            "-k",
            "3",
            "--n-init",
            "2",
            "--init-method",
            "random",
            "--seed",
            "9",
        ]);

        let io_args = cli.to_io_args();
        assert_eq!(io_args.input, PathBuf::from("points.txt"));
        assert!(io_args.output.is_none());
        assert!(!io_args.tracing);

        let cluster_args = cli.to_cluster_args();
        assert_eq!(cluster_args.k, 3);
        assert_eq!(cluster_args.n_init, Some(2));
        assert_eq!(cluster_args.max_iter, None);
        assert_eq!(cluster_args.init_method.as_deref(), Some("random"));
        assert_eq!(cluster_args.seed, Some(9));
        assert_eq!(cli.device, "cpu");
    }
}

//! Command-line k-means clustering over point-set files.
//!
//! # Usage
//!
//! ```bash
//! # Two clusters from a whitespace/comma separated text file
//! tacotron2-kmeans -i points.txt -k 2
//!
//! # Reproducible run with explicit parameters, report written to a file
//! tacotron2-kmeans -i points.txt -k 4 --seed 42 --n-init 10 \
//!     --init-method kmeans_pp --distance-metric manhattan -o clusters.json
//!
//! # Parameters from a config file, with one flag overriding it
//! tacotron2-kmeans -i sets.json -k 3 --config kmeans.json --max-iter 20
//!
//! # Per-phase timings
//! cargo run --release -p tacotron2_cli --features timing -- -i points.txt -k 8
//! ```
//!
//! # Input JSON Format
//!
//! ```json
//! {
//!   "sets": [
//!     [[0.0, 0.0], [0.0, 1.0], [10.0, 0.0]],
//!     [[1.0], [2.0], [30.0], [31.0]]
//!   ]
//! }
//! ```
//!
//! A bare list of points (`[[0.0, 0.0], [0.0, 1.0]]`) is also accepted.

mod args;

use anyhow::{Result, bail};
use candle_core::Device;
use clap::Parser;
use tacotron2::cluster::kmeans::KMeans;
use tacotron2::io::point_set::load_point_sets;
use tacotron2::io::report::{ClusterReport, write_reports};

use args::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber if --tracing flag is passed
    if cli.tracing {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let io_args = cli.to_io_args();
    let cluster_args = cli.to_cluster_args();

    let device = match cli.device.as_str() {
        "cpu" => Device::Cpu,
        "cuda" | "cuda:0" => {
            #[cfg(feature = "cuda")]
            {
                Device::new_cuda(0)?
            }
            #[cfg(not(feature = "cuda"))]
            {
                bail!("CUDA support not compiled. Rebuild with --features cuda")
            }
        }
        "metal" => {
            #[cfg(feature = "metal")]
            {
                Device::new_metal(0)?
            }
            #[cfg(not(feature = "metal"))]
            {
                bail!("Metal support not compiled. Rebuild with --features metal")
            }
        }
        other => bail!("Unknown device: {}. Use cpu, cuda, or metal", other),
    };

    let config = cluster_args.to_config(&io_args.load_config()?)?;
    let kmeans = KMeans::new(config)?;

    let point_sets = load_point_sets(&io_args.input)?;
    tracing::info!(
        input = ?io_args.input,
        sets = point_sets.len(),
        k = cluster_args.k,
        device = ?device,
        "Clustering configuration"
    );

    let mut reports = Vec::with_capacity(point_sets.len());
    for (i, set) in point_sets.iter().enumerate() {
        if point_sets.len() > 1 {
            tracing::info!(
                progress = format!("[{}/{}]", i + 1, point_sets.len()),
                points = set.n_points(),
                dim = set.dim(),
                "Processing point set"
            );
        }
        let points = set.to_tensor(&device)?;
        let result = kmeans.fit(&points, cluster_args.k)?;
        reports.push(ClusterReport::from_result(&result)?);
    }

    write_reports(io_args.output.as_deref(), &reports)?;

    // Print timing summary if timing feature is enabled
    #[cfg(feature = "timing")]
    tacotron2::cluster::timing::print_timings();

    Ok(())
}

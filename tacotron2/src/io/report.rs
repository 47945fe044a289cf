use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::cluster::kmeans::ClusterResult;

/// Serializable summary of one clustering result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    pub centroids: Vec<Vec<f32>>,
    pub assignment: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    pub iterations: usize,
    pub converged: bool,
}

impl ClusterReport {
    /// Copy a result's tensors to the host.
    pub fn from_result(result: &ClusterResult) -> Result<Self> {
        Ok(Self {
            centroids: result.centroid_rows()?,
            assignment: result.assignment_vec()?,
            score: result.score,
            iterations: result.iterations,
            converged: result.converged(),
        })
    }
}

/// Write reports as pretty JSON to `path`, or stdout when `None`.
pub fn write_reports(path: Option<&Path>, reports: &[ClusterReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
            fs::write(path, json).with_context(|| format!("Failed to write file: {:?}", path))?;
            tracing::info!(path = ?path, reports = reports.len(), "wrote cluster reports");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

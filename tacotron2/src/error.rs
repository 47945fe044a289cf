//! Error type for the clustering stack.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// Unknown strategy or metric name, or parameters that cannot produce a clustering.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tensor shapes the clustering code cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClusterError>;

impl ClusterError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// True for errors caused by the caller's parameters rather than the backend.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}

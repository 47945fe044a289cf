pub mod assignment;
pub mod centroids;
pub mod distance;
pub mod init;
pub mod kmeans;
pub mod rng;
pub mod score;
pub mod timing;
pub mod wrapper;

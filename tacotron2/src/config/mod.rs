pub mod kmeans_config;
pub mod tacotron2_config;

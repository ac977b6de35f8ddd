pub mod estimator;
pub mod image_cloud;
pub mod ranker;
pub mod sample;
pub mod statistics;
pub mod utils;

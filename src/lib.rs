// THEORY:
// This file is the main entry point for the `pixel_pi` library crate.
//
// The engine reads every photo in a corpus as a cloud of colour points in the
// unit cube, estimates pi from the fraction of points inside the unit sphere,
// and ranks the photos by how close their estimate lands to the real constant.
//
// The primary public surface is the pair of pipelines (`CorpusPipeline`,
// `ParallelPipeline`) and their data structures (`PipelineConfig`,
// `CorpusReport`, `EstimateRecord`, ...). The building blocks in `core_modules`
// (sample, image, estimator, ranker, statistics, image sources) stay public for
// callers who want to run a single stage on its own.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::estimator::estimator::estimate;
pub use core_modules::ranker::ranker::{rank, top_k};
pub use core_modules::statistics::statistics::summary_statistics;
pub use core_modules::utils::image_helper::image_helper::{
    DirectorySource, ImageSource, MemorySource,
};
pub use error::{InvalidInputError, ParseSettingError, PipelineError, SourceError};

// THEORY:
// Every failure the engine can report lives here. The estimator and ranker are
// pure, so the only thing that can go wrong inside them is bad input; those
// cases share `InvalidInputError`. Reading a corpus from disk is the job of an
// image source collaborator and has its own `SourceError`. `PipelineError` is
// what the top-level pipelines hand back to callers.

use thiserror::Error;

/// An error returned when the estimator or ranker is handed input outside its contract.
///
/// This enum is marked `#[non_exhaustive]` and may include additional variants
/// in future releases.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InvalidInputError {
    #[error("image has no samples")]
    EmptyImage,
    #[error("duplicate image identifier `{0}`")]
    DuplicateIdentifier(String),
    #[error("sample {index} has {component} component {value} outside [0, 1]")]
    ComponentOutOfRange {
        index: usize,
        component: char,
        value: f64,
    },
    #[error("record `{identifier}` has absolute error {error}, expected a non-negative number")]
    InvalidError { identifier: String, error: f64 },
    #[error("buffer of {actual} bytes is not a whole number of {expected}-channel pixels")]
    ChannelCount { expected: usize, actual: usize },
}

/// An error raised while an image source collects its corpus.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("`{0}` is not a directory")]
    NotADirectory(String),
}

/// An error returned by [`CorpusPipeline`](crate::pipeline::CorpusPipeline) and
/// [`ParallelPipeline`](crate::parallel_pipeline::ParallelPipeline).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input for `{identifier}`: {source}")]
    Estimate {
        identifier: String,
        #[source]
        source: InvalidInputError,
    },
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("worker pool failure: {0}")]
    WorkerPool(&'static str),
}

/// An error returned when a textual setting (boundary, range policy) is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {setting} `{value}`")]
pub struct ParseSettingError {
    pub setting: &'static str,
    pub value: String,
}

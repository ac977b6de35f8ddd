// THEORY:
// The `pipeline` module is the top-level API for the whole engine. It strings
// the layers together in one explicit, linear order:
//
//     ImageSource → Estimator (per image) → rank → top_k (+ summary statistics)
//
// Nothing runs implicitly and nothing is cached between runs; calling `run`
// twice over the same corpus gives the same report. The sequential pipeline is
// the reference; `ParallelPipeline` must agree with it record for record.

use crate::core_modules::utils::image_helper::image_helper::ImageSource;
use crate::error::PipelineError;
use log::info;

// Re-export key data structures for the public API.
pub use crate::core_modules::estimator::estimator::{Boundary, Estimate, Estimator, RangePolicy};
pub use crate::core_modules::image_cloud::image_cloud::Image;
pub use crate::core_modules::ranker::ranker::{EstimateRecord, RankedResult};
pub use crate::core_modules::statistics::statistics::SummaryStatistics;

use crate::core_modules::ranker::ranker::rank;
use crate::core_modules::statistics::statistics::summary_statistics;

const DEFAULT_TOP_K: usize = 5;

/// Configuration for the corpus pipelines.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Whether samples exactly on the unit sphere count as inside.
    pub boundary: Boundary,
    /// What to do with samples outside [0, 1]³.
    pub range_policy: RangePolicy,
    /// How many of the best-ranked records the report singles out.
    pub top_k: usize,
    /// Number of workers used by `ParallelPipeline`. Ignored by `CorpusPipeline`.
    pub worker_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            boundary: Boundary::default(),
            range_policy: RangePolicy::default(),
            top_k: DEFAULT_TOP_K,
            worker_count: num_cpus::get().max(1),
        }
    }
}

impl PipelineConfig {
    pub fn estimator(&self) -> Estimator {
        Estimator::new(self.boundary, self.range_policy)
    }
}

/// The output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusReport {
    /// One record per image, in corpus order.
    pub records: Vec<EstimateRecord>,
    /// Every record ordered by ascending absolute error.
    pub ranked: RankedResult,
    /// The first `top_k` entries of `ranked`.
    pub top: Vec<EstimateRecord>,
    /// Mean and spread of the estimates; `None` for an empty corpus.
    pub summary: Option<SummaryStatistics>,
}

impl CorpusReport {
    /// The record whose estimate came closest to pi.
    pub fn best(&self) -> Option<&EstimateRecord> {
        self.ranked.records().first()
    }
}

/// Builds the report from records already estimated, shared by both pipelines.
pub(crate) fn assemble_report(
    records: Vec<EstimateRecord>,
    top_k: usize,
) -> Result<CorpusReport, PipelineError> {
    let ranked = rank(records.iter().cloned())?;
    let top = ranked.top_k(top_k).to_vec();
    let summary = summary_statistics(&records);

    if let (Some(best), Some(summary)) = (ranked.records().first(), summary) {
        info!(
            "ranked {} images, best `{}` ({:.6}, error {:.6}), mean {:.6}, std dev {:.6}",
            ranked.len(),
            best.identifier(),
            best.estimate(),
            best.error(),
            summary.mean,
            summary.std_dev
        );
    }

    Ok(CorpusReport {
        records,
        ranked,
        top,
        summary,
    })
}

/// The sequential, reference implementation of the estimate → rank → top-K pipeline.
#[derive(Debug, Clone, Default)]
pub struct CorpusPipeline {
    config: PipelineConfig,
}

impl CorpusPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Loads the corpus from `source` and processes it.
    pub fn run<S: ImageSource + ?Sized>(&self, source: &S) -> Result<CorpusReport, PipelineError> {
        let images = source.load()?;
        self.process(images)
    }

    /// Estimates, ranks and summarises images the caller already holds.
    ///
    /// # Errors
    ///
    /// - `PipelineError::Estimate` naming the first image the estimator rejects.
    /// - `PipelineError::InvalidInput` if two images share an identifier.
    pub fn process(&self, images: Vec<(String, Image)>) -> Result<CorpusReport, PipelineError> {
        info!("estimating pi over {} images", images.len());
        let estimator = self.config.estimator();

        let mut records = Vec::with_capacity(images.len());
        for (identifier, image) in images {
            match estimator.estimate(&image) {
                Ok(estimate) => records.push(EstimateRecord::new(identifier, estimate)),
                Err(source) => return Err(PipelineError::Estimate { identifier, source }),
            }
        }

        assemble_report(records, self.config.top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::sample::sample::Sample;
    use crate::core_modules::utils::image_helper::image_helper::MemorySource;
    use crate::error::InvalidInputError;
    use approx::assert_relative_eq;

    fn image(points: &[(f64, f64, f64)]) -> Image {
        points.iter().map(|&(r, g, b)| Sample::new(r, g, b)).collect()
    }

    fn corpus() -> Vec<(String, Image)> {
        vec![
            // 6 × 2/4 = 3.0
            (
                "three.png".to_string(),
                image(&[(0.0, 0.0, 0.0), (0.1, 0.1, 0.1), (1.0, 1.0, 1.0), (0.9, 0.9, 0.0)]),
            ),
            // 6 × 3/4 = 4.5
            (
                "four_and_a_half.png".to_string(),
                image(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (0.5, 0.0, 0.0), (0.3, 0.3, 0.3)]),
            ),
            // 6 × 1/2 = 3.0, ties with three.png
            (
                "also_three.png".to_string(),
                image(&[(0.2, 0.2, 0.2), (1.0, 0.5, 0.5)]),
            ),
        ]
    }

    #[test]
    fn runs_estimate_rank_and_top_k_in_order() {
        let config = PipelineConfig {
            top_k: 2,
            ..PipelineConfig::default()
        };
        let report = CorpusPipeline::new(config)
            .run(&MemorySource::new(corpus()))
            .unwrap();

        let corpus_order: Vec<&str> = report.records.iter().map(|r| r.identifier()).collect();
        assert_eq!(corpus_order, ["three.png", "four_and_a_half.png", "also_three.png"]);
        assert_eq!(
            report.ranked.identifiers(),
            ["also_three.png", "three.png", "four_and_a_half.png"]
        );
        assert_eq!(report.top, report.ranked.records()[..2].to_vec());
        assert_eq!(report.best().unwrap().identifier(), "also_three.png");

        let summary = report.summary.unwrap();
        assert_eq!(summary.count, 3);
        assert_relative_eq!(summary.mean, 3.5);
    }

    #[test]
    fn names_the_image_that_failed() {
        let mut images = corpus();
        images.push(("blank.png".to_string(), Image::default()));
        let error = CorpusPipeline::default().process(images).unwrap_err();
        match error {
            PipelineError::Estimate { identifier, source } => {
                assert_eq!(identifier, "blank.png");
                assert_eq!(source, InvalidInputError::EmptyImage);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_identifiers_fail_the_run() {
        let mut images = corpus();
        images.push(("three.png".to_string(), image(&[(0.0, 0.0, 0.0)])));
        let error = CorpusPipeline::default().process(images).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::InvalidInput(InvalidInputError::DuplicateIdentifier(ref id)) if id == "three.png"
        ));
    }

    #[test]
    fn empty_corpus_has_no_summary() {
        let report = CorpusPipeline::default().process(Vec::new()).unwrap();
        assert!(report.ranked.is_empty());
        assert!(report.top.is_empty());
        assert_eq!(report.summary, None);
        assert_eq!(report.best(), None);
    }
}

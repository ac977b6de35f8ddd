// THEORY:
// Estimating one image never looks at another, so a large corpus can be spread
// over a pool of workers without any shared state. The `ParallelPipeline` keeps
// the sequential pipeline's contract exactly:
// - every image is estimated by the same pure `Estimator`, so each record is
//   bit-identical to the sequential one;
// - replies travel back on one oneshot channel per image and are awaited in
//   submission order, so `records` keeps corpus order;
// - ranking, top-K and statistics run once, after every worker has replied, via
//   the same `assemble_report` the sequential pipeline uses.
//
// A dispatcher task hands tasks to workers round-robin. Workers run until the
// pool is shut down or dropped.

use crate::core_modules::estimator::estimator::{Estimate, Estimator};
use crate::error::{InvalidInputError, PipelineError};
use crate::pipeline::{CorpusReport, EstimateRecord, Image, PipelineConfig, assemble_report};
use futures::future::try_join_all;
use log::{debug, info};
use tokio::sync::{mpsc, oneshot};

pub struct EstimateTask {
    pub image: Image,
    pub result_sender: oneshot::Sender<Result<Estimate, InvalidInputError>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<EstimateTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` workers (at least one) on the current tokio runtime.
    pub fn new(estimator: Estimator, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<EstimateTask>();
        let mut workers = Vec::with_capacity(worker_count + 1);

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<EstimateTask>())
            .unzip();

        // Spawn dispatcher
        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        }));

        // Spawn workers
        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            workers.push(tokio::spawn(async move {
                let mut processed = 0usize;
                while let Some(task) = worker_receiver.recv().await {
                    let _ = task.result_sender.send(estimator.estimate(&task.image));
                    processed += 1;
                }
                debug!("worker {worker_id} stopped after {processed} images");
            }));
        }

        Self {
            task_sender,
            workers,
        }
    }

    /// Queues `image` for estimation and waits for its result.
    pub async fn estimate(&self, image: Image) -> Result<Result<Estimate, InvalidInputError>, PipelineError> {
        let (result_sender, result_receiver) = oneshot::channel();

        self.task_sender
            .send(EstimateTask {
                image,
                result_sender,
            })
            .map_err(|_| PipelineError::WorkerPool("Failed to send task to worker pool"))?;

        result_receiver
            .await
            .map_err(|_| PipelineError::WorkerPool("Failed to receive result from worker"))
    }

    /// Closes the task queue and waits for every worker to drain and stop.
    pub async fn shutdown(self) -> Result<(), PipelineError> {
        drop(self.task_sender);
        for worker in self.workers {
            worker
                .await
                .map_err(|_| PipelineError::WorkerPool("Worker panicked during shutdown"))?;
        }
        Ok(())
    }
}

/// Runs the estimate → rank → top-K pipeline with a pool of estimation workers.
pub struct ParallelPipeline {
    config: PipelineConfig,
    worker_pool: WorkerPool,
}

impl ParallelPipeline {
    /// Must be called from within a tokio runtime.
    pub fn new(config: PipelineConfig) -> Self {
        let worker_pool = WorkerPool::new(config.estimator(), config.worker_count);
        Self {
            config,
            worker_pool,
        }
    }

    /// Estimates, ranks and summarises `images`, matching `CorpusPipeline::process`.
    pub async fn process(&self, images: Vec<(String, Image)>) -> Result<CorpusReport, PipelineError> {
        info!(
            "estimating pi over {} images with {} workers",
            images.len(),
            self.config.worker_count.max(1)
        );

        let (identifiers, pending): (Vec<String>, Vec<_>) = images
            .into_iter()
            .map(|(identifier, image)| (identifier, self.worker_pool.estimate(image)))
            .unzip();
        let results = try_join_all(pending).await?;

        let mut records = Vec::with_capacity(results.len());
        for (identifier, result) in identifiers.into_iter().zip(results) {
            match result {
                Ok(estimate) => records.push(EstimateRecord::new(identifier, estimate)),
                Err(source) => return Err(PipelineError::Estimate { identifier, source }),
            }
        }

        assemble_report(records, self.config.top_k)
    }

    /// Stops the worker pool.
    pub async fn shutdown(self) -> Result<(), PipelineError> {
        self.worker_pool.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::estimator::estimator::{Boundary, RangePolicy};
    use crate::pipeline::CorpusPipeline;

    fn corpus(count: usize) -> Vec<(String, Image)> {
        (0..count)
            .map(|i| {
                let buffer: Vec<u8> = (0..300usize)
                    .map(|j| ((i * 37 + j * 11) % 256) as u8)
                    .collect();
                (
                    format!("photo_{i:03}.png"),
                    Image::from_rgb_bytes(&buffer).unwrap(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn matches_sequential_pipeline() {
        for boundary in [Boundary::Inclusive, Boundary::Strict] {
            let config = PipelineConfig {
                boundary,
                range_policy: RangePolicy::Reject,
                top_k: 3,
                worker_count: 4,
            };
            let sequential = CorpusPipeline::new(config.clone())
                .process(corpus(25))
                .unwrap();

            let parallel_pipeline = ParallelPipeline::new(config);
            let parallel = parallel_pipeline.process(corpus(25)).await.unwrap();
            parallel_pipeline.shutdown().await.unwrap();

            assert_eq!(parallel, sequential);
        }
    }

    #[tokio::test]
    async fn reports_failed_image() {
        let pipeline = ParallelPipeline::new(PipelineConfig {
            worker_count: 2,
            ..PipelineConfig::default()
        });
        let mut images = corpus(3);
        images.insert(1, ("empty.png".to_string(), Image::default()));

        let error = pipeline.process(images).await.unwrap_err();
        assert!(matches!(
            error,
            PipelineError::Estimate { ref identifier, source: InvalidInputError::EmptyImage }
                if identifier == "empty.png"
        ));
    }

    #[tokio::test]
    async fn zero_workers_still_runs() {
        let pipeline = ParallelPipeline::new(PipelineConfig {
            worker_count: 0,
            ..PipelineConfig::default()
        });
        let report = pipeline.process(corpus(4)).await.unwrap();
        assert_eq!(report.ranked.len(), 4);
        pipeline.shutdown().await.unwrap();
    }
}

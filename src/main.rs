// Example runner for the `pixel_pi` library: estimates pi from every image in a
// directory and prints the photos that came closest.
//
// Usage: pixel_pi <corpus_dir> [top_k]
//
// Environment overrides:
//   PIXEL_PI_BOUNDARY=inclusive|strict
//   PIXEL_PI_RANGE=reject|clamp
//   PIXEL_PI_WORKERS=<n>      (more than one runs the parallel pipeline)
//   RUST_LOG=info|debug       (log level, via env_logger)

use anyhow::{Context, Result, bail};
use log::info;
use pixel_pi::parallel_pipeline::ParallelPipeline;
use pixel_pi::pipeline::{CorpusPipeline, CorpusReport, PipelineConfig};
use pixel_pi::{DirectorySource, ImageSource};
use std::env;

fn config_from_env(top_k: Option<usize>) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();
    if let Some(top_k) = top_k {
        config.top_k = top_k;
    }
    if let Ok(value) = env::var("PIXEL_PI_BOUNDARY") {
        config.boundary = value.parse()?;
    }
    if let Ok(value) = env::var("PIXEL_PI_RANGE") {
        config.range_policy = value.parse()?;
    }
    if let Ok(value) = env::var("PIXEL_PI_WORKERS") {
        config.worker_count = value
            .parse()
            .with_context(|| format!("PIXEL_PI_WORKERS must be a number, got `{value}`"))?;
    }
    Ok(config)
}

fn print_report(report: &CorpusReport) {
    println!("{:<4} {:<40} {:>10} {:>10}", "rank", "image", "estimate", "error");
    for (position, record) in report.top.iter().enumerate() {
        println!(
            "{:<4} {:<40} {:>10.6} {:>10.6}",
            position + 1,
            record.identifier(),
            record.estimate(),
            record.error()
        );
    }
    match &report.summary {
        Some(summary) => println!(
            "\n{} images, mean estimate {:.6}, std dev {:.6}",
            summary.count, summary.mean, summary.std_dev
        ),
        None => println!("\nno images found"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("Usage: pixel_pi <corpus_dir> [top_k]");
    }
    let corpus_dir = &args[1];
    let top_k = args
        .get(2)
        .map(|value| value.parse::<usize>())
        .transpose()
        .context("top_k must be a non-negative integer")?;
    let config = config_from_env(top_k)?;
    info!("Corpus: {corpus_dir}");
    info!("Config: {config:?}");

    // --- 2. Corpus Loading ---
    let images = DirectorySource::new(corpus_dir)
        .load()
        .with_context(|| format!("loading corpus from {corpus_dir}"))?;

    // --- 3. Estimate, Rank, Select ---
    let report = if config.worker_count > 1 {
        let pipeline = ParallelPipeline::new(config);
        let report = pipeline.process(images).await?;
        pipeline.shutdown().await?;
        report
    } else {
        CorpusPipeline::new(config).process(images)?
    };

    // --- 4. Presentation ---
    print_report(&report);
    Ok(())
}

use std::path::Path;

use anyhow::Context;
use log::info;
use popseries::utils::logging::{create_spinner, finish_progress_bar};
use popseries::{ConfigFile, Pipeline, RegionOutcome, load_sources_async};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional first argument: path to a JSON configuration file
    let config = match std::env::args().nth(1) {
        Some(path) => ConfigFile::load(Path::new(&path))
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => ConfigFile::from_env().context("Failed to load configuration")?,
    };

    let spinner = config
        .pipeline
        .show_progress
        .then(|| create_spinner(Some("Loading prepared sources")));
    let sources = load_sources_async(&config.sources)
        .await
        .context("Failed to load prepared sources")?;
    if let Some(spinner) = &spinner {
        finish_progress_bar(spinner, Some("Sources loaded"));
    }

    let pipeline = Pipeline::new(config.pipeline.clone()).context("Invalid pipeline configuration")?;
    let output = pipeline
        .run_and_write(&sources)
        .context("Pipeline run failed")?;

    for (region, outcome) in output.outcomes() {
        match outcome {
            RegionOutcome::Processed => info!("{region}: processed"),
            RegionOutcome::Flagged => info!("{region}: processed with warnings"),
            RegionOutcome::Skipped => info!("{region}: skipped"),
        }
    }
    if let Some(accuracy) = output.classifier.accuracy {
        info!("Classifier accuracy: {:.1}%", accuracy * 100.0);
    }
    info!(
        "Outputs written to {}",
        pipeline.config().output_dir.display()
    );

    Ok(())
}

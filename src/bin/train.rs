//! Trains the leaf classifier and writes the model artifact served by the API.

use anyhow::{Context, Result};
use clap::Parser;
use crop_doctor::{
    catalog::ClassCatalog,
    config, logging,
    model::{ModelArtifact, TrainingBackend},
    training::Trainer,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Train the crop disease classifier")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config.yaml")]
    config: PathBuf,

    /// Dataset root with one sub-directory per class
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Output artifact directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    epochs: Option<usize>,

    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Pretrained feature extractor record
    #[arg(long)]
    backbone_weights: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_from(&cli.config)
        .await
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());
    logging::validate_log_level(&log_level)?;
    logging::init(&log_level)?;

    if let Some(dataset) = cli.dataset {
        config.training.dataset_dir = dataset;
    }
    if let Some(output) = cli.output {
        config.model.artifact_dir = output;
    }
    if let Some(epochs) = cli.epochs {
        config.training.epochs = epochs;
    }
    if let Some(batch_size) = cli.batch_size {
        config.training.batch_size = batch_size;
    }
    if cli.backbone_weights.is_some() {
        config.training.backbone_weights = cli.backbone_weights;
    }

    let catalog = ClassCatalog::builtin();
    info!("Crop disease model training");
    info!(
        "Dataset: {:?}, classes: {}, epochs: {}, batch size: {}",
        config.training.dataset_dir,
        catalog.len(),
        config.training.epochs,
        config.training.batch_size
    );

    let artifact = ModelArtifact::new(config.model.artifact_dir.clone());
    let trainer = Trainer::new(config.training, catalog, config.model.image_size);

    let summary = tokio::task::spawn_blocking(move || trainer.run::<TrainingBackend>(&artifact))
        .await
        .context("Training task panicked")??;

    info!(
        "Training complete after {} epochs (test accuracy: {})",
        summary.epochs_run,
        summary
            .test_accuracy
            .map(|a| format!("{:.2}%", a * 100.0))
            .unwrap_or_else(|| "n/a".to_string())
    );
    info!("Model saved to {:?}", config.model.artifact_dir);

    Ok(())
}

use super::network::{LeafClassifier, LeafClassifierConfig};
use crate::{Error, Result, catalog::ClassCatalog};
use burn::{
    module::Module,
    record::CompactRecorder,
    tensor::backend::Backend,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const WEIGHTS_STEM: &str = "model";
const METADATA_FILE: &str = "metadata.json";

/// Everything needed to rebuild and serve a trained model, written next to
/// the weights. The class list here is authoritative for output indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub classes: Vec<String>,
    pub image_size: usize,
    /// Value range of the tensors fed to `forward`.
    pub input_range: [f32; 2],
    pub architecture: LeafClassifierConfig,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<TrainingSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub epochs_run: usize,
    pub best_val_loss: Option<f64>,
    /// Absent when the dataset was too small for a test split.
    pub test_loss: Option<f64>,
    pub test_accuracy: Option<f64>,
    pub train_samples: usize,
    pub synthetic_data: bool,
}

impl ModelMetadata {
    pub fn new(catalog: &ClassCatalog, image_size: usize, architecture: LeafClassifierConfig) -> Self {
        Self {
            classes: catalog.labels(),
            image_size,
            input_range: [0.0, 1.0],
            architecture,
            created_at: Utc::now(),
            summary: None,
        }
    }

    pub fn catalog(&self) -> Result<ClassCatalog> {
        let catalog = ClassCatalog::from_labels(self.classes.iter().cloned())?;
        if catalog.len() != self.architecture.num_classes {
            return Err(Error::config(format!(
                "Artifact lists {} classes but the model has {} outputs",
                catalog.len(),
                self.architecture.num_classes
            )));
        }
        Ok(catalog)
    }
}

/// On-disk layout of a trained model: `<dir>/model.mpk` + `<dir>/metadata.json`.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    dir: PathBuf,
}

impl ModelArtifact {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(format!("{WEIGHTS_STEM}.mpk"))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    pub fn exists(&self) -> bool {
        self.weights_path().exists() && self.metadata_path().exists()
    }

    pub fn save<B: Backend>(&self, model: &LeafClassifier<B>, metadata: &ModelMetadata) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        model
            .clone()
            .save_file(self.dir.join(WEIGHTS_STEM), &CompactRecorder::new())
            .map_err(Error::recorder)?;

        let json = serde_json::to_string_pretty(metadata)?;
        std::fs::write(self.metadata_path(), json)?;

        info!("Model artifact saved to {:?}", self.dir);
        Ok(())
    }

    pub fn load_metadata(&self) -> Result<ModelMetadata> {
        let json = std::fs::read_to_string(self.metadata_path())?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<(LeafClassifier<B>, ModelMetadata)> {
        if !self.exists() {
            return Err(Error::config(format!(
                "Model artifact not found at {:?}. Train the model first with the `train` binary.",
                self.dir
            )));
        }

        let metadata = self.load_metadata()?;
        debug!(
            "Rebuilding model with {} classes at {}px",
            metadata.architecture.num_classes, metadata.image_size
        );

        let model = metadata
            .architecture
            .init::<B>(device)
            .load_file(self.dir.join(WEIGHTS_STEM), &CompactRecorder::new(), device)
            .map_err(Error::recorder)?;

        Ok((model, metadata))
    }
}

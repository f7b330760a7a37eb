mod artifact;
mod backbone;
mod network;

pub use artifact::{ModelArtifact, ModelMetadata, TrainingSummary};
pub use backbone::{FeatureExtractor, FeatureExtractorConfig, SeparableBlock};
pub use network::{LeafClassifier, LeafClassifierConfig};

use crate::{
    Error, Result,
    catalog::ClassCatalog,
    preprocess::{CHANNELS, ImageTensor},
};
use async_trait::async_trait;
use burn::{
    backend::{Autodiff, NdArray, ndarray::NdArrayDevice},
    tensor::{Tensor, TensorData},
};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::info;

/// CPU backend used for serving and evaluation.
pub type InferenceBackend = NdArray<f32>;

/// Autodiff backend used for training.
pub type TrainingBackend = Autodiff<InferenceBackend>;

/// A loaded model able to score one preprocessed image.
pub trait Classifier: Send + Sync {
    /// Output index to label mapping of this model.
    fn classes(&self) -> &ClassCatalog;

    fn image_size(&self) -> usize;

    /// Class probabilities, one per entry of [`Classifier::classes`].
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>>;
}

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Classifier>>;
}

pub struct BurnClassifier {
    model: Mutex<LeafClassifier<InferenceBackend>>,
    device: NdArrayDevice,
    catalog: ClassCatalog,
    image_size: usize,
}

impl BurnClassifier {
    pub fn new(
        model: LeafClassifier<InferenceBackend>,
        catalog: ClassCatalog,
        image_size: usize,
    ) -> Self {
        Self {
            model: Mutex::new(model),
            device: NdArrayDevice::default(),
            catalog,
            image_size,
        }
    }

    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        let device = NdArrayDevice::default();
        let (model, metadata) = artifact.load::<InferenceBackend>(&device)?;
        let catalog = metadata.catalog()?;
        Ok(Self::new(model, catalog, metadata.image_size))
    }
}

impl Classifier for BurnClassifier {
    fn classes(&self) -> &ClassCatalog {
        &self.catalog
    }

    fn image_size(&self) -> usize {
        self.image_size
    }

    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        if input.size != self.image_size || input.data.len() != CHANNELS * input.size * input.size {
            return Err(Error::inference(format!(
                "Expected a {0}x{0} RGB tensor, got {1} values at size {2}",
                self.image_size,
                input.data.len(),
                input.size
            )));
        }

        let images = Tensor::<InferenceBackend, 4>::from_data(
            TensorData::new(input.data.clone(), input.shape()),
            &self.device,
        );

        let model = self
            .model
            .lock()
            .map_err(|e| Error::internal(format!("Mutex lock failed: {e}")))?;
        let probabilities = model
            .forward_probabilities(images)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| Error::inference(format!("{e:?}")))?;

        if probabilities.len() != self.catalog.len() {
            return Err(Error::inference(format!(
                "Model produced {} outputs for {} classes",
                probabilities.len(),
                self.catalog.len()
            )));
        }

        Ok(probabilities)
    }
}

/// Loads a [`BurnClassifier`] from a model artifact directory.
pub struct ArtifactLoader {
    dir: PathBuf,
}

impl ArtifactLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ModelLoader for ArtifactLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        let artifact = ModelArtifact::new(self.dir.clone());
        info!("Loading model from {:?}...", artifact.dir());

        let classifier = tokio::task::spawn_blocking(move || BurnClassifier::from_artifact(&artifact))
            .await
            .map_err(|e| Error::internal(format!("Model loading task failed: {e}")))??;

        info!(
            "Model loaded successfully ({} classes)",
            classifier.classes().len()
        );
        Ok(Arc::new(classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ClassCatalog;
    use tempfile::TempDir;

    fn tiny_classifier() -> BurnClassifier {
        let device = NdArrayDevice::default();
        let catalog = ClassCatalog::from_labels(["Apple___healthy", "Apple___Apple_scab"]).unwrap();
        let model = LeafClassifierConfig::new(2, FeatureExtractorConfig::new(vec![4, 8]))
            .with_dense1_units(8)
            .with_dense2_units(4)
            .init::<InferenceBackend>(&device);
        BurnClassifier::new(model, catalog, 16)
    }

    #[test]
    fn test_predict_returns_distribution() {
        let classifier = tiny_classifier();
        let input = ImageTensor {
            data: vec![0.5; 3 * 16 * 16],
            size: 16,
        };

        let probs = classifier.predict(&input).unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_predict_rejects_wrong_size() {
        let classifier = tiny_classifier();
        let input = ImageTensor {
            data: vec![0.5; 3 * 8 * 8],
            size: 8,
        };

        assert!(matches!(classifier.predict(&input), Err(Error::Inference(_))));
    }

    #[tokio::test]
    async fn test_loader_reports_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let loader = ArtifactLoader::new(dir.path().join("nothing-here"));
        assert!(loader.load().await.is_err());
    }
}

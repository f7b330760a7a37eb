mod types;
mod upload;

pub use types::*;
pub use upload::*;

use crate::{
    Error, Result,
    catalog::{ClassCatalog, TreatmentGuide},
    model::{Classifier, ModelLoader},
    preprocess::preprocess_path,
};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

/// Owns the model handle and runs the upload -> prediction pipeline.
///
/// The model is loaded at most once. Concurrent first requests wait on the
/// same load; a failed load is retried by the next request.
pub struct Predictor {
    loader: Arc<dyn ModelLoader>,
    model: OnceCell<Arc<dyn Classifier>>,
    guide: Arc<TreatmentGuide>,
    upload_dir: PathBuf,
}

impl Predictor {
    pub fn new(
        loader: Arc<dyn ModelLoader>,
        guide: Arc<TreatmentGuide>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
            guide,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Classes of the loaded model, or the built-in list before loading.
    pub fn classes(&self) -> ClassCatalog {
        match self.model.get() {
            Some(model) => model.classes().clone(),
            None => ClassCatalog::builtin(),
        }
    }

    /// Explicit load, used at startup. Failure leaves the service running.
    pub async fn load(&self) -> bool {
        match self.ensure_loaded().await {
            Ok(_) => true,
            Err(_) => {
                warn!("Model file not available yet; train the model first using the `train` binary");
                false
            }
        }
    }

    pub async fn ensure_loaded(&self) -> Result<Arc<dyn Classifier>> {
        let model = self
            .model
            .get_or_try_init(|| async { self.loader.load().await })
            .await;

        match model {
            Ok(model) => Ok(model.clone()),
            Err(e) => {
                error!("Error loading model: {}", e);
                Err(Error::ModelUnavailable)
            }
        }
    }

    /// Validates, stores, preprocesses and classifies one upload.
    ///
    /// Validation problems are returned as they are; anything failing after
    /// that is reported as `Error::Prediction`.
    pub async fn predict(
        &self,
        model: Arc<dyn Classifier>,
        upload: Upload,
    ) -> Result<PredictionResult> {
        upload.validate()?;

        self.run(model, &upload).await.map_err(|e| {
            error!("Prediction failed for '{}': {}", upload.filename, e);
            Error::Prediction(e.to_string())
        })
    }

    async fn run(&self, model: Arc<dyn Classifier>, upload: &Upload) -> Result<PredictionResult> {
        let transient = TransientUpload::persist(&self.upload_dir, upload).await?;

        let path = transient.path().to_path_buf();
        let classifier = model.clone();
        let probabilities = tokio::task::spawn_blocking(move || {
            let input = preprocess_path(&path, classifier.image_size())?;
            classifier.predict(&input)
        })
        .await
        .map_err(|e| Error::inference(format!("Inference task failed: {e}")))??;

        drop(transient);

        let result = PredictionResult::from_probabilities(&probabilities, model.classes(), &self.guide)?;
        info!(
            "Predicted {} / {} ({})",
            result.crop, result.disease, result.confidence
        );
        Ok(result)
    }
}

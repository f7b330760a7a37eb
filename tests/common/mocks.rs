use async_trait::async_trait;
use crop_doctor::{
    Error, Result,
    catalog::ClassCatalog,
    model::{Classifier, ModelLoader},
    preprocess::ImageTensor,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Classifier returning a fixed probability vector.
#[derive(Debug)]
pub struct StubClassifier {
    pub catalog: ClassCatalog,
    pub probabilities: Vec<f32>,
    pub image_size: usize,
    pub calls: AtomicUsize,
}

impl StubClassifier {
    /// Full class list with `probability` on `index` and the rest spread evenly.
    pub fn peaked(index: usize, probability: f32) -> Self {
        let catalog = ClassCatalog::builtin();
        let rest = (1.0 - probability) / (catalog.len() - 1) as f32;
        let mut probabilities = vec![rest; catalog.len()];
        probabilities[index] = probability;

        Self {
            catalog,
            probabilities,
            image_size: 8,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for StubClassifier {
    fn classes(&self) -> &ClassCatalog {
        &self.catalog
    }

    fn image_size(&self) -> usize {
        self.image_size
    }

    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>> {
        assert_eq!(input.shape(), [1, 3, self.image_size, self.image_size]);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probabilities.clone())
    }
}

/// Loader handing out a shared [`StubClassifier`], optionally failing the
/// first `failures` attempts.
#[derive(Debug)]
pub struct MockLoader {
    pub classifier: Arc<StubClassifier>,
    pub failures: usize,
    pub attempts: AtomicUsize,
}

impl MockLoader {
    pub fn new(classifier: StubClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
            failures: 0,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::new(StubClassifier::peaked(0, 1.0))
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        // give concurrent callers a chance to pile up on the same load
        tokio::task::yield_now().await;

        if attempt < self.failures {
            return Err(Error::config("Model artifact not found"));
        }
        Ok(self.classifier.clone())
    }
}

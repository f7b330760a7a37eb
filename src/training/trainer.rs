use super::{
    augment::Augmentation,
    batcher::{ImageBatch, ImageBatcher},
    dataset::{LoadedDataset, Sample, load_or_synthesize},
    schedule::{EarlyStopping, ReduceLrOnPlateau, Verdict},
    split::split_holdout,
};
use crate::{
    Error, Result,
    catalog::ClassCatalog,
    config::TrainingConfig,
    inference::argmax,
    model::{
        FeatureExtractorConfig, LeafClassifier, LeafClassifierConfig, ModelArtifact, ModelMetadata,
        TrainingSummary,
    },
};
use burn::{
    data::dataloader::batcher::Batcher,
    module::{AutodiffModule, Module},
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    record::CompactRecorder,
    tensor::{
        ElementConversion,
        backend::{AutodiffBackend, Backend},
    },
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info, warn};

/// Loss and accuracy over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

/// A trained model (autodiff stripped) and how it got there.
pub struct TrainedModel<B: Backend> {
    pub model: LeafClassifier<B>,
    pub summary: TrainingSummary,
}

/// Transfer-learning trainer: frozen feature extractor, trainable dense head.
pub struct Trainer {
    config: TrainingConfig,
    catalog: ClassCatalog,
    image_size: usize,
    architecture: LeafClassifierConfig,
    augmentation: Augmentation,
}

impl Trainer {
    pub fn new(config: TrainingConfig, catalog: ClassCatalog, image_size: usize) -> Self {
        let architecture = LeafClassifierConfig::new(catalog.len(), FeatureExtractorConfig::standard());
        Self {
            config,
            catalog,
            image_size,
            architecture,
            augmentation: Augmentation::default(),
        }
    }

    pub fn with_architecture(mut self, architecture: LeafClassifierConfig) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn load_data(&self) -> LoadedDataset {
        load_or_synthesize(
            &self.config.dataset_dir,
            &self.catalog,
            self.image_size,
            self.config.synthetic_samples,
            self.config.seed,
        )
    }

    /// Loads data, trains, evaluates and writes the artifact.
    pub fn run<B: AutodiffBackend>(&self, artifact: &ModelArtifact) -> Result<TrainingSummary> {
        let device = B::Device::default();
        let dataset = self.load_data();
        let trained = self.fit::<B>(dataset, &device)?;

        let mut metadata = ModelMetadata::new(&self.catalog, self.image_size, self.architecture.clone());
        metadata.summary = Some(trained.summary.clone());
        artifact.save(&trained.model, &metadata)?;

        Ok(trained.summary)
    }

    pub fn fit<B: AutodiffBackend>(
        &self,
        dataset: LoadedDataset,
        device: &B::Device,
    ) -> Result<TrainedModel<B::InnerBackend>> {
        if dataset.image_size != self.image_size {
            return Err(Error::training(format!(
                "Dataset images are {}px but the trainer expects {}px",
                dataset.image_size, self.image_size
            )));
        }
        if self.architecture.num_classes != self.catalog.len() {
            return Err(Error::training(format!(
                "Model has {} outputs for {} classes",
                self.architecture.num_classes,
                self.catalog.len()
            )));
        }

        let cfg = &self.config;
        let synthetic = dataset.synthetic;
        let (train_val, test) = split_holdout(dataset.samples, cfg.test_split, cfg.seed);
        let (train, val) = split_holdout(train_val, cfg.validation_split, cfg.seed);
        if train.is_empty() {
            return Err(Error::training("No training samples left after splitting"));
        }

        info!(
            "Training set size: {}, validation: {}, test: {}",
            train.len(),
            val.len(),
            test.len()
        );

        let mut model = self.build_model::<B>(device)?;
        let mut optimizer = AdamConfig::new().init();
        let batcher = ImageBatcher::<B>::new(device.clone(), self.image_size);
        let inner_device = <B::InnerBackend as Backend>::Device::default();
        let eval_batcher = ImageBatcher::<B::InnerBackend>::new(inner_device, self.image_size);
        let batch_size = cfg.batch_size.max(1);

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut stopping = EarlyStopping::new(cfg.early_stopping_patience);
        let mut plateau = ReduceLrOnPlateau::new(
            cfg.learning_rate,
            cfg.plateau_factor,
            cfg.plateau_patience,
            cfg.min_learning_rate,
        );
        let mut best: Option<LeafClassifier<B::InnerBackend>> = None;
        let mut epochs_run = 0;

        let mut indices: Vec<usize> = (0..train.len()).collect();
        for epoch in 1..=cfg.epochs {
            epochs_run = epoch;
            let lr = plateau.lr();
            indices.shuffle(&mut rng);

            let mut epoch_loss = 0.0;
            let mut batches = 0usize;
            for chunk in indices.chunks(batch_size) {
                let items = chunk
                    .iter()
                    .map(|&i| Sample {
                        image: self.augmentation.apply(&train[i].image, self.image_size, &mut rng),
                        label: train[i].label,
                    })
                    .collect();
                let ImageBatch { images, targets } = batcher.batch(items);

                let logits = model.forward(images);
                let loss = CrossEntropyLossConfig::new()
                    .init(&logits.device())
                    .forward(logits, targets);
                epoch_loss += loss.clone().into_scalar().elem::<f64>();
                batches += 1;

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optimizer.step(lr, model, grads);
            }
            let train_loss = epoch_loss / batches.max(1) as f64;

            let snapshot = model.valid();
            // no validation split on tiny datasets, so monitor the training loss
            let monitored = if val.is_empty() {
                Evaluation {
                    loss: train_loss,
                    accuracy: f64::NAN,
                }
            } else {
                evaluate(&snapshot, &val, &eval_batcher, batch_size)
            };
            info!(
                "Epoch {}/{}: loss = {:.4}, val_loss = {:.4}, val_acc = {:.2}%, lr = {:e}",
                epoch,
                cfg.epochs,
                train_loss,
                monitored.loss,
                monitored.accuracy * 100.0,
                lr
            );
            let monitored = monitored.loss;

            let verdict = stopping.observe(monitored);
            if verdict == Verdict::Improved {
                best = Some(snapshot);
            }
            if verdict == Verdict::Stop {
                info!("Early stopping after epoch {}", epoch);
                break;
            }

            let next_lr = plateau.observe(monitored);
            if next_lr < lr {
                info!("Reducing learning rate to {:e}", next_lr);
            }
        }

        let model = match best {
            Some(best) => {
                debug!("Restoring weights from the best epoch");
                best
            }
            None => model.valid(),
        };

        let test_eval = (!test.is_empty()).then(|| {
            let eval = evaluate(&model, &test, &eval_batcher, batch_size);
            info!("Test loss: {:.4}", eval.loss);
            info!("Test accuracy: {:.2}%", eval.accuracy * 100.0);
            eval
        });

        Ok(TrainedModel {
            model,
            summary: TrainingSummary {
                epochs_run,
                best_val_loss: stopping.best(),
                test_loss: test_eval.map(|e| e.loss),
                test_accuracy: test_eval.map(|e| e.accuracy),
                train_samples: train.len(),
                synthetic_data: synthetic,
            },
        })
    }

    fn build_model<B: AutodiffBackend>(&self, device: &B::Device) -> Result<LeafClassifier<B>> {
        let backbone = self.architecture.backbone.init::<B>(device);
        let backbone = match &self.config.backbone_weights {
            Some(path) => {
                info!("Loading feature extractor weights from {:?}", path);
                backbone
                    .load_file(path.clone(), &CompactRecorder::new(), device)
                    .map_err(Error::recorder)?
            }
            None => {
                warn!("No backbone_weights configured, feature extractor is randomly initialized");
                backbone
            }
        };

        Ok(self.architecture.init_with_backbone(backbone, device))
    }
}

/// Mean cross-entropy and accuracy of `model` over `samples`.
pub fn evaluate<B: Backend>(
    model: &LeafClassifier<B>,
    samples: &[Sample],
    batcher: &ImageBatcher<B>,
    batch_size: usize,
) -> Evaluation {
    let mut loss_sum = 0.0;
    let mut correct = 0usize;

    for chunk in samples.chunks(batch_size.max(1)) {
        let ImageBatch { images, targets } = batcher.batch(chunk.to_vec());
        let logits = model.forward(images);

        let loss: f64 = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets)
            .into_scalar()
            .elem();
        loss_sum += loss * chunk.len() as f64;

        let num_classes = logits.dims()[1];
        if let Ok(values) = logits.into_data().convert::<f32>().to_vec::<f32>() {
            correct += values
                .chunks(num_classes)
                .zip(chunk)
                .filter(|(row, sample)| argmax(row).map(|(i, _)| i) == Some(sample.label))
                .count();
        }
    }

    let total = samples.len().max(1) as f64;
    Evaluation {
        loss: loss_sum / total,
        accuracy: correct as f64 / total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InferenceBackend, TrainingBackend};
    use crate::training::dataset::synthetic_dataset;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SIZE: usize = 8;

    fn catalog() -> ClassCatalog {
        ClassCatalog::from_labels(["Apple___Black_rot", "Apple___healthy", "Grape___Esca"]).unwrap()
    }

    fn tiny_trainer(config: TrainingConfig) -> Trainer {
        let architecture = LeafClassifierConfig::new(3, FeatureExtractorConfig::new(vec![4, 8]))
            .with_dense1_units(8)
            .with_dense2_units(4);
        Trainer::new(config, catalog(), SIZE).with_architecture(architecture)
    }

    fn tiny_config(dir: &std::path::Path) -> TrainingConfig {
        TrainingConfig {
            dataset_dir: dir.join("missing"),
            epochs: 2,
            batch_size: 4,
            synthetic_samples: 20,
            learning_rate: 1e-3,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_fit_on_synthetic_data() {
        let dir = TempDir::new().unwrap();
        let trainer = tiny_trainer(tiny_config(dir.path()));
        let dataset = trainer.load_data();
        assert!(dataset.synthetic);

        let trained = trainer
            .fit::<TrainingBackend>(dataset, &Default::default())
            .unwrap();

        // 20 samples -> 2 test -> 18 -> 4 validation -> 14 train
        assert_eq!(trained.summary.train_samples, 14);
        assert!(trained.summary.epochs_run >= 1 && trained.summary.epochs_run <= 2);
        assert!(trained.summary.synthetic_data);
        assert!(trained.summary.best_val_loss.is_some_and(f64::is_finite));
        assert!(trained.summary.test_accuracy.is_some_and(|a| (0.0..=1.0).contains(&a)));
    }

    #[test]
    fn test_run_writes_loadable_artifact() {
        let dir = TempDir::new().unwrap();
        let mut config = tiny_config(dir.path());
        config.epochs = 1;
        let artifact = ModelArtifact::new(dir.path().join("crop_model"));

        let summary = tiny_trainer(config).run::<TrainingBackend>(&artifact).unwrap();
        assert_eq!(summary.epochs_run, 1);

        let (_, metadata) = artifact.load::<InferenceBackend>(&Default::default()).unwrap();
        assert_eq!(metadata.classes, catalog().labels());
        assert_eq!(metadata.image_size, SIZE);
        let saved = metadata.summary.unwrap();
        assert_eq!(saved.epochs_run, summary.epochs_run);
        assert_eq!(saved.train_samples, summary.train_samples);
        assert!(saved.synthetic_data);
    }

    #[test]
    fn test_backbone_weights_are_loaded() {
        let dir = TempDir::new().unwrap();
        let weights = dir.path().join("backbone");
        FeatureExtractorConfig::new(vec![4, 8])
            .init::<InferenceBackend>(&Default::default())
            .save_file(weights.clone(), &CompactRecorder::new())
            .unwrap();

        let mut config = tiny_config(dir.path());
        config.backbone_weights = Some(weights);
        let trainer = tiny_trainer(config);
        assert!(trainer.build_model::<TrainingBackend>(&Default::default()).is_ok());

        let mut config = tiny_config(dir.path());
        config.backbone_weights = Some(dir.path().join("nope"));
        let trainer = tiny_trainer(config);
        assert!(matches!(
            trainer.build_model::<TrainingBackend>(&Default::default()),
            Err(Error::Recorder(_))
        ));
    }

    #[test]
    fn test_evaluate_counts_correct_predictions() {
        let device = Default::default();
        let model = LeafClassifierConfig::new(3, FeatureExtractorConfig::new(vec![4]))
            .with_dense1_units(4)
            .with_dense2_units(4)
            .init::<InferenceBackend>(&device);
        let batcher = ImageBatcher::<InferenceBackend>::new(device, SIZE);
        let samples = synthetic_dataset(6, 3, SIZE, 3);

        let eval = evaluate(&model, &samples, &batcher, 4);
        assert!(eval.loss.is_finite() && eval.loss > 0.0);
        assert!((0.0..=1.0).contains(&eval.accuracy));
    }

    #[test]
    fn test_mismatched_image_size_is_rejected() {
        let dir = TempDir::new().unwrap();
        let trainer = tiny_trainer(tiny_config(dir.path()));
        let dataset = LoadedDataset {
            samples: synthetic_dataset(4, 3, 4, 1),
            image_size: 4,
            synthetic: true,
        };
        assert!(matches!(
            trainer.fit::<TrainingBackend>(dataset, &Default::default()),
            Err(Error::Training(_))
        ));
    }
}

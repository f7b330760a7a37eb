//! Offline transfer-learning pipeline producing a model artifact.

mod augment;
mod batcher;
mod dataset;
mod schedule;
mod split;
mod trainer;

pub use augment::{AffineParams, Augmentation, warp};
pub use batcher::{ImageBatch, ImageBatcher};
pub use dataset::{LoadedDataset, Sample, load_dataset, load_or_synthesize, synthetic_dataset};
pub use schedule::{EarlyStopping, ReduceLrOnPlateau, Verdict};
pub use split::split_holdout;
pub use trainer::{Evaluation, TrainedModel, Trainer, evaluate};

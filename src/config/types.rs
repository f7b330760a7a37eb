use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
    /// Scratch directory for uploads while they are being classified.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: PathBuf,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory holding `model.mpk` and `metadata.json`.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    #[serde(default = "default_image_size")]
    pub image_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_validation_split")]
    pub validation_split: f64,
    #[serde(default = "default_test_split")]
    pub test_split: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Sample count used when no real images could be loaded.
    #[serde(default = "default_synthetic_samples")]
    pub synthetic_samples: usize,
    /// Pretrained feature extractor record; random init when absent.
    #[serde(default)]
    pub backbone_weights: Option<PathBuf>,
    #[serde(default = "default_early_stopping_patience")]
    pub early_stopping_patience: usize,
    #[serde(default = "default_plateau_factor")]
    pub plateau_factor: f64,
    #[serde(default = "default_plateau_patience")]
    pub plateau_patience: usize,
    #[serde(default = "default_min_learning_rate")]
    pub min_learning_rate: f64,
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
            upload_dir: default_upload_dir(),
            frontend_dir: default_frontend_dir(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_dir: default_artifact_dir(),
            image_size: default_image_size(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            validation_split: default_validation_split(),
            test_split: default_test_split(),
            seed: default_seed(),
            synthetic_samples: default_synthetic_samples(),
            backbone_weights: None,
            early_stopping_patience: default_early_stopping_patience(),
            plateau_factor: default_plateau_factor(),
            plateau_patience: default_plateau_patience(),
            min_learning_rate: default_min_learning_rate(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from("./frontend")
}

fn default_max_upload_mb() -> usize {
    10
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./model/crop_model")
}

fn default_image_size() -> usize {
    224
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("./dataset")
}

fn default_epochs() -> usize {
    20
}

fn default_batch_size() -> usize {
    32
}

fn default_learning_rate() -> f64 {
    1e-4
}

fn default_validation_split() -> f64 {
    0.2
}

fn default_test_split() -> f64 {
    0.1
}

fn default_seed() -> u64 {
    42
}

fn default_synthetic_samples() -> usize {
    100
}

fn default_early_stopping_patience() -> usize {
    3
}

fn default_plateau_factor() -> f64 {
    0.5
}

fn default_plateau_patience() -> usize {
    2
}

fn default_min_learning_rate() -> f64 {
    1e-7
}

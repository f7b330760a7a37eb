mod types;

pub use types::*;

use crate::Result;
use std::{env, path::Path};
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(Path::new(&config_path)).await
}

/// Reads `config_path`, falling back to defaults when it does not exist.
pub async fn load_from(config_path: &Path) -> Result<Config> {
    debug!("Loading configuration from: {:?}", config_path);

    let mut config = if config_path.exists() {
        let config_str = tokio::fs::read_to_string(config_path).await?;
        parse(&config_str)?
    } else {
        // Logging is not up yet at this point
        eprintln!(
            "Configuration file '{}' not found, using defaults",
            config_path.display()
        );
        Config::default()
    };

    if let Ok(artifact_dir) = env::var("MODEL_ARTIFACT_DIR") {
        config.model.artifact_dir = artifact_dir.into();
    }

    Ok(config)
}

pub fn parse(config_str: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(config_str)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_upload_mb, 10);
        assert_eq!(config.server.max_upload_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.model.image_size, 224);
        assert_eq!(config.training.epochs, 20);
        assert_eq!(config.training.early_stopping_patience, 3);
        assert_eq!(config.training.plateau_patience, 2);
        assert!(config.training.backbone_weights.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let yaml = r#"
server:
  port: 8081
  logs:
    level: "debug"
model:
  artifact_dir: "/srv/models/leaf"
training:
  batch_size: 8
  backbone_weights: "weights/backbone.mpk"
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.logs.level, "debug");
        assert_eq!(config.model.artifact_dir, PathBuf::from("/srv/models/leaf"));
        assert_eq!(config.training.batch_size, 8);
        assert_eq!(config.training.learning_rate, 1e-4);
        assert_eq!(
            config.training.backbone_weights,
            Some(PathBuf::from("weights/backbone.mpk"))
        );
    }

    #[tokio::test]
    async fn test_load_from_file_and_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server:\n  max_upload_mb: 4\n").unwrap();

        let config = load_from(&path).await.unwrap();
        assert_eq!(config.server.max_upload_mb, 4);

        let config = load_from(&dir.path().join("absent.yaml")).await.unwrap();
        assert_eq!(config.server.max_upload_mb, 10);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = parse(include_str!("../../config.yaml")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.server.port, defaults.server.port);
        assert_eq!(config.model.artifact_dir, defaults.model.artifact_dir);
        assert_eq!(config.training.min_learning_rate, defaults.training.min_learning_rate);
        assert!(config.training.backbone_weights.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(parse("server: [unclosed").is_err());
    }
}

use anyhow::Result;
use crop_doctor::{config, logging, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (before logging setup)
    let config = match config::load().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Determine log level: environment variable overrides config
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.server.logs.level.clone());

    if let Err(e) = logging::validate_log_level(&log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    logging::init(&log_level)?;

    info!("Starting Crop Doctor API with log level: {}", log_level);
    info!("Model artifact: {}", config.model.artifact_dir.display());
    info!(
        "Max upload size: {} MB, port: {}",
        config.server.max_upload_mb, config.server.port
    );

    server::run(config).await?;

    Ok(())
}

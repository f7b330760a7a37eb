pub mod handlers;
pub mod types;

use crate::{
    Result,
    catalog::TreatmentGuide,
    config::{Config, ServerConfig},
    inference::Predictor,
    model::ArtifactLoader,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{MethodRouter, get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let predict: MethodRouter<AppState> = post(handlers::predict)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::enforce_upload_limit,
        ))
        .route_layer(DefaultBodyLimit::max(state.max_body_bytes()));

    let frontend = ServeDir::new(&config.frontend_dir)
        .append_index_html_on_directories(true)
        .not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .route("/predict", predict)
        .route_service("/", frontend.clone())
        .nest_service("/frontend", frontend)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run(config: Config) -> Result<()> {
    tokio::fs::create_dir_all(&config.server.upload_dir).await?;

    let loader = Arc::new(ArtifactLoader::new(&config.model.artifact_dir));
    let predictor = Arc::new(Predictor::new(
        loader,
        TreatmentGuide::builtin(),
        &config.server.upload_dir,
    ));

    if predictor.load().await {
        info!("Model loaded from {}", config.model.artifact_dir.display());
    } else {
        warn!(
            "Serving without a model; /predict will fail until {} exists",
            config.model.artifact_dir.display()
        );
    }

    let state = AppState {
        predictor,
        max_upload_mb: config.server.max_upload_mb,
    };
    let app = router(state, &config.server);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);
    info!("Upload directory: {}", config.server.upload_dir.display());
    info!("Frontend directory: {}", config.server.frontend_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

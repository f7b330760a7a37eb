use super::types::{HealthResponse, InfoResponse, PredictResponse};
use crate::{
    Error, Result,
    inference::{ALLOWED_EXTENSIONS, Predictor, Upload},
};
use axum::{
    extract::{
        Multipart, Request, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub max_upload_mb: usize,
}

/// Multipart framing overhead allowed on top of the file itself.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

impl AppState {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Largest request body that can still carry an in-limit file.
    pub fn max_body_bytes(&self) -> usize {
        self.max_upload_bytes() + MULTIPART_OVERHEAD
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    // picks up an artifact written after startup
    if let Err(e) = state.predictor.ensure_loaded().await {
        warn!("Health check without a model: {}", e);
    }

    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "API is running".to_string(),
        model_loaded: state.predictor.is_loaded(),
    })
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let classes = state.predictor.classes();
    Json(InfoResponse {
        total_classes: classes.len(),
        classes: classes.labels(),
        upload_size_limit_mb: state.max_upload_mb,
        supported_formats: ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>> {
    info!("Received prediction request");

    let model = state.predictor.ensure_loaded().await?;

    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart upload: {}", e);
        Error::validation("No file provided. Please upload an image.")
    })?;
    let upload = read_upload(&mut multipart, &state)
        .await?
        .ok_or_else(|| Error::validation("No file provided. Please upload an image."))?;

    let result = state.predictor.predict(model, upload).await?;
    Ok(Json(PredictResponse::new(result)))
}

/// Returns the first field named `file`, if any. The size limit applies to the
/// file content, not to the multipart framing around it.
async fn read_upload(multipart: &mut Multipart, state: &AppState) -> Result<Option<Upload>> {
    let max_upload_mb = state.max_upload_mb;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_mb))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_upload_mb))?;
        if bytes.len() > state.max_upload_bytes() {
            warn!("Rejected upload of {} bytes", bytes.len());
            return Err(Error::PayloadTooLarge { max_mb: max_upload_mb });
        }
        return Ok(Some(Upload::new(filename, bytes.to_vec())));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError, max_upload_mb: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded {} MB while streaming", max_upload_mb);
        Error::PayloadTooLarge {
            max_mb: max_upload_mb,
        }
    } else {
        Error::validation(format!("Malformed upload: {}", err.body_text()))
    }
}

/// Rejects requests whose declared length cannot fit an in-limit file before
/// the body is read. The file itself is measured in `read_upload`.
pub async fn enforce_upload_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > state.max_body_bytes() {
            warn!("Rejected request body of {} bytes", length);
            return Error::PayloadTooLarge {
                max_mb: state.max_upload_mb,
            }
            .into_response();
        }
    }

    next.run(request).await
}

pub async fn not_found() -> Error {
    Error::RouteNotFound
}

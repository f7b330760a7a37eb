use super::mocks::MockLoader;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use crop_doctor::{
    catalog::TreatmentGuide,
    config::ServerConfig,
    inference::Predictor,
    server::{handlers::AppState, router},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use std::{io::Cursor, path::Path, sync::Arc};
use tempfile::TempDir;

pub const BOUNDARY: &str = "crop-doctor-test-boundary";

/// A router wired to a mock loader, with its scratch directories.
pub struct TestApp {
    pub router: Router,
    pub predictor: Arc<Predictor>,
    pub loader: Arc<MockLoader>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn new(loader: MockLoader) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let config = ServerConfig {
            upload_dir: dir.path().join("uploads"),
            frontend_dir: dir.path().join("frontend"),
            ..ServerConfig::default()
        };
        std::fs::create_dir_all(&config.upload_dir).unwrap();
        std::fs::create_dir_all(&config.frontend_dir).unwrap();

        let loader = Arc::new(loader);
        let predictor = Arc::new(Predictor::new(
            loader.clone(),
            TreatmentGuide::builtin(),
            &config.upload_dir,
        ));
        let state = AppState {
            predictor: predictor.clone(),
            max_upload_mb: config.max_upload_mb,
        };

        Self {
            router: router(state, &config),
            predictor,
            loader,
            dir,
        }
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn frontend_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("frontend")
    }

    pub fn uploads_left(&self) -> usize {
        count_files(&self.upload_dir())
    }
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// A small valid PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 11) as u8, 90]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// A valid PNG followed by zero padding, `len` bytes in total.
pub fn padded_png(len: usize) -> Vec<u8> {
    let mut bytes = png_bytes(12, 12);
    assert!(bytes.len() <= len);
    bytes.resize(len, 0);
    bytes
}

/// Builds a multipart body with a single file field.
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn predict_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let body = multipart_body(field, filename, content);
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

/// Same as `predict_request` but streamed without a `Content-Length` header.
pub fn chunked_predict_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

//! HTTP surface of the coordinator.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use comms::specs::{
    coordinator::{ErrorResponse, RegisterWorkerRequest, RegisterWorkerResponse, UploadResponse},
    inference::AccuracyResponse,
};
use log::warn;
use tower_http::cors::CorsLayer;

use crate::coordinator::Coordinator;

/// Largest table accepted by `/upload-csv`.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Builds the coordinator's router.
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/register-worker", post(register_worker))
        .route("/upload-csv", post(upload_csv))
        .route("/check-accuracy", get(check_accuracy))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(coordinator)
}

async fn register_worker(
    State(coordinator): State<Arc<Coordinator>>,
    Json(req): Json<RegisterWorkerRequest>,
) -> Json<RegisterWorkerResponse> {
    Json(coordinator.register(&req.worker_url))
}

async fn upload_csv(
    State(coordinator): State<Arc<Coordinator>>,
    multipart: Multipart,
) -> Json<UploadResponse> {
    let result = match read_upload(multipart).await {
        Ok((raw, target)) => coordinator
            .submit_dataset(raw, &target)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e),
    };

    match result {
        Ok(summary) => Json(UploadResponse::Accepted(summary)),
        Err(error) => {
            warn!("upload refused: {error}");
            Json(UploadResponse::Failed(ErrorResponse { error }))
        }
    }
}

async fn check_accuracy(State(coordinator): State<Arc<Coordinator>>) -> Json<AccuracyResponse> {
    Json(coordinator.check_accuracy().await)
}

/// Pulls the `file` and `target` fields out of an upload form.
async fn read_upload(mut multipart: Multipart) -> Result<(Vec<u8>, String), String> {
    let mut file = None;
    let mut target = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => file = Some(field.bytes().await.map_err(|e| e.to_string())?.to_vec()),
            Some("target") => target = Some(field.text().await.map_err(|e| e.to_string())?),
            _ => {}
        }
    }

    let file = file.ok_or("Missing 'file' field")?;
    let target = target.ok_or("Missing 'target' field")?;
    Ok((file, target))
}

//! HTTP surface of the parameter server.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{delete, get, post},
};
use comms::{
    codec::{self, Artifact},
    specs::server::{
        ClearModelsQuery, ClearModelsResponse, ModelsResponse, PushModelRequest,
        PushModelResponse,
    },
};
use log::{debug, warn};

use crate::storage::{ModelPool, PoolErr};

/// Builds the parameter server's router over a shared pool.
pub fn router(pool: Arc<ModelPool>) -> Router {
    Router::new()
        .route("/push-model", post(push_model))
        .route("/get-models", get(get_models))
        .route("/clear-models", delete(clear_models))
        .with_state(pool)
}

async fn push_model(
    State(pool): State<Arc<ModelPool>>,
    Json(req): Json<PushModelRequest>,
) -> Json<PushModelResponse> {
    let payload = match codec::decode_payload(&req.model_b64) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(worker_id = req.worker_id.as_str(); "rejected model: {e}");
            return Json(PushModelResponse::error(PoolErr::Decode(e.to_string()).to_string()));
        }
    };

    let artifact = Artifact::new(req.worker_id, payload);
    let round = req.round;

    // Decoding the payload is CPU bound, keep it off the reactor.
    match tokio::task::spawn_blocking(move || pool.push(artifact, round)).await {
        Ok(Ok(total)) => Json(PushModelResponse::accepted(total)),
        Ok(Err(e)) => Json(PushModelResponse::error(e.to_string())),
        Err(e) => Json(PushModelResponse::error(format!("push task failed: {e}"))),
    }
}

async fn get_models(State(pool): State<Arc<ModelPool>>) -> Json<ModelsResponse> {
    let (artifacts, round) = pool.fetch_all();
    debug!(count = artifacts.len(); "serving model pool");

    Json(ModelsResponse {
        models_b64: codec::encode_bundle(&artifacts),
        count: artifacts.len(),
        round,
    })
}

async fn clear_models(
    State(pool): State<Arc<ModelPool>>,
    Query(query): Query<ClearModelsQuery>,
) -> Json<ClearModelsResponse> {
    let (deleted_count, round) = pool.reset(query.round);

    Json(ClearModelsResponse {
        status: "cleared".into(),
        deleted_count,
        round,
    })
}

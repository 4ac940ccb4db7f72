//! HTTP surface of a worker.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use comms::specs::worker::{TrainRequest, TrainResponse};
use log::warn;
use machine_learning::{Learner, Model};

use crate::{sink::ModelSink, worker::Worker};

/// Builds the worker's router.
pub fn router<L, S>(worker: Arc<Worker<L, S>>) -> Router
where
    L: Learner + Clone + Send + Sync + 'static,
    L::Output: Into<Model>,
    S: ModelSink + 'static,
{
    Router::new()
        .route("/train", post(train::<L, S>))
        .with_state(worker)
}

async fn train<L, S>(
    State(worker): State<Arc<Worker<L, S>>>,
    Json(req): Json<TrainRequest>,
) -> Json<TrainResponse>
where
    L: Learner + Clone + Send + Sync + 'static,
    L::Output: Into<Model>,
    S: ModelSink + 'static,
{
    let worker_id = req.worker_id.clone();
    match worker.train(req).await {
        Ok(_) => Json(TrainResponse::success()),
        Err(e) => {
            warn!(worker_id = worker_id.as_str(); "{e}");
            Json(TrainResponse::error(e.to_string()))
        }
    }
}

//! HTTP surface of the inference node.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use comms::specs::inference::{AccuracyResponse, PredictRequest};

use crate::{node::InferenceNode, source::ModelSource};

/// Builds the inference node's router.
pub fn router<S>(node: Arc<InferenceNode<S>>) -> Router
where
    S: ModelSource + 'static,
{
    Router::new()
        .route("/predict_accuracy", post(predict_accuracy::<S>))
        .with_state(node)
}

async fn predict_accuracy<S>(
    State(node): State<Arc<InferenceNode<S>>>,
    Json(req): Json<PredictRequest>,
) -> Json<AccuracyResponse>
where
    S: ModelSource + 'static,
{
    Json(node.predict_accuracy(req).await)
}

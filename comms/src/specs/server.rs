use serde::{Deserialize, Serialize};

use crate::RoundToken;

/// Body of `POST /push-model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushModelRequest {
    pub worker_id: String,
    pub model_b64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushModelResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_models: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PushModelResponse {
    pub fn accepted(total_models: usize) -> Self {
        Self {
            status: "accepted".into(),
            total_models: Some(total_models),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            total_models: None,
            message: Some(message.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == "accepted"
    }
}

/// Answer of `GET /get-models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models_b64: String,
    pub count: usize,
    #[serde(default)]
    pub round: RoundToken,
}

/// Query string of `DELETE /clear-models`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClearModelsQuery {
    #[serde(default)]
    pub round: Option<RoundToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearModelsResponse {
    pub status: String,
    pub deleted_count: usize,
    #[serde(default)]
    pub round: RoundToken,
}

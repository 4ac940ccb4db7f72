use serde::{Deserialize, Serialize};

use crate::RoundToken;

/// Body of `POST /train`: one shard of the training split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    pub worker_id: String,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TrainResponse {
    pub fn success() -> Self {
        Self {
            status: "success".into(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

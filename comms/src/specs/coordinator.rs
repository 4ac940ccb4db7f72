use serde::{Deserialize, Serialize};

use crate::RoundToken;

/// Body of `POST /register-worker`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterWorkerRequest {
    pub worker_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterWorkerResponse {
    pub status: String,
    pub total_workers: usize,
}

/// How a single shard delivery ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub worker_id: String,
    pub worker_url: String,
    pub rows: usize,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Successful answer of `POST /upload-csv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub info: String,
    pub active_workers: usize,
    pub columns_used: Vec<String>,
    pub target: String,
    pub round: RoundToken,
    pub train_rows: usize,
    pub eval_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
    pub dispatch: Vec<DispatchReport>,
}

/// Error envelope used by the coordinator's upload route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either shape `POST /upload-csv` can answer with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Accepted(UploadSummary),
    Failed(ErrorResponse),
}

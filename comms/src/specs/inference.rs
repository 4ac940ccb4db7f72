use serde::{Deserialize, Serialize};

/// Body of `POST /predict_accuracy`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<Vec<f64>>,
    #[serde(default)]
    pub targets: Vec<i64>,
}

/// Answer of `POST /predict_accuracy`, proxied as-is by `GET /check-accuracy`.
///
/// Failures keep `accuracy` at zero and explain themselves in `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResponse {
    pub accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_models_voting: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<Vec<Vec<u64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AccuracyResponse {
    pub fn report(accuracy: f64, total_models_voting: usize, confusion_matrix: Vec<Vec<u64>>) -> Self {
        Self {
            accuracy,
            total_models_voting: Some(total_models_voting),
            confusion_matrix: Some(confusion_matrix),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            accuracy: 0.0,
            total_models_voting: None,
            confusion_matrix: None,
            message: Some(message.into()),
        }
    }
}

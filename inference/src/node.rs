use comms::specs::inference::{AccuracyResponse, PredictRequest};
use log::{info, warn};

use crate::{Result, VoteErr, source::ModelSource, voting};

/// Scores the current model pool on request.
pub struct InferenceNode<S> {
    source: S,
}

impl<S: ModelSource> InferenceNode<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Votes the whole pool on the given rows.
    ///
    /// # Returns
    /// The accuracy report, or a zero accuracy with a message on failure.
    pub async fn predict_accuracy(&self, req: PredictRequest) -> AccuracyResponse {
        match self.score(req).await {
            Ok(verdict) => {
                info!(
                    accuracy = verdict.accuracy,
                    models_voting = verdict.valid_models;
                    "ensemble accuracy computed"
                );
                AccuracyResponse::report(verdict.accuracy, verdict.valid_models, verdict.confusion_matrix)
            }
            Err(e) => {
                warn!("no verdict: {e}");
                AccuracyResponse::failure(e.to_string())
            }
        }
    }

    async fn score(&self, req: PredictRequest) -> Result<voting::Verdict> {
        let models = self.source.fetch().await?;
        if models.is_empty() {
            return Err(VoteErr::NoModels);
        }

        // Prediction is CPU bound and fans out on rayon.
        tokio::task::spawn_blocking(move || voting::vote(&models, &req.features, &req.targets))
            .await
            .map_err(|e| VoteErr::Aborted(e.to_string()))?
    }
}

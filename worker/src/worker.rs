use comms::{PeerErr, codec, specs::worker::TrainRequest};
use log::{info, warn};
use machine_learning::{Learner, Model, dataset::matrix_from_rows};

use crate::{Result, error::WorkerErr, sink::ModelSink};

/// What happened to a fitted model after training.
#[derive(Debug)]
pub enum Delivery {
    /// The parameter server stored it; holds the pool size after the push.
    Accepted(usize),
    /// The parameter server answered but refused it.
    Refused(String),
    /// The parameter server could not be reached.
    Undelivered(PeerErr),
}

/// Shard training harness.
///
/// Stateless between requests: every shard is fitted from scratch and the
/// result is handed to the sink.
pub struct Worker<L, S> {
    learner: L,
    sink: S,
}

impl<L, S> Worker<L, S>
where
    L: Learner + Clone + Send + Sync + 'static,
    L::Output: Into<Model>,
    S: ModelSink,
{
    /// Creates a new `Worker`.
    ///
    /// # Arguments
    /// * `learner` - The training algorithm applied to every shard.
    /// * `sink` - Where fitted models are delivered.
    pub fn new(learner: L, sink: S) -> Self {
        Self { learner, sink }
    }

    /// Fits a model on one shard and pushes it.
    ///
    /// # Arguments
    /// * `req` - The shard and its dispatch metadata.
    ///
    /// # Returns
    /// How the delivery went. Delivery problems are logged, never returned
    /// as errors.
    ///
    /// # Errors
    /// Returns `WorkerErr` if the shard can't be fitted.
    pub async fn train(&self, req: TrainRequest) -> Result<Delivery> {
        let TrainRequest {
            worker_id,
            features,
            targets,
            round,
        } = req;

        info!(worker_id = worker_id.as_str(), rows = targets.len(); "received shard");

        let learner = self.learner.clone();
        let payload = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let x = matrix_from_rows(&features)?;
            let model: Model = learner.fit(x.view(), &targets)?.into();
            Ok(model.to_bytes()?)
        })
        .await
        .map_err(|e| WorkerErr::TrainingAborted(e.to_string()))??;

        let model_b64 = codec::encode_payload(&payload);
        let delivery = match self.sink.push(&worker_id, model_b64, round).await {
            Ok(res) if res.is_accepted() => {
                let total = res.total_models.unwrap_or_default();
                info!(worker_id = worker_id.as_str(), total = total; "model delivered to parameter server");
                Delivery::Accepted(total)
            }
            Ok(res) => {
                let reason = res.message.unwrap_or_else(|| res.status.clone());
                warn!(worker_id = worker_id.as_str(); "parameter server refused model: {reason}");
                Delivery::Refused(reason)
            }
            Err(e) => {
                warn!(worker_id = worker_id.as_str(); "failed to reach parameter server: {e}");
                Delivery::Undelivered(e)
            }
        };

        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use comms::{CallOutcome, RoundToken, specs::server::PushModelResponse};
    use machine_learning::forest::RandomForestLearner;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Vec<(String, String, Option<RoundToken>)>>,
    }

    #[async_trait::async_trait]
    impl ModelSink for RecordingSink {
        async fn push(
            &self,
            worker_id: &str,
            model_b64: String,
            round: Option<RoundToken>,
        ) -> CallOutcome<PushModelResponse> {
            let mut pushed = self.pushed.lock();
            pushed.push((worker_id.to_string(), model_b64, round));
            Ok(PushModelResponse::accepted(pushed.len()))
        }
    }

    struct DownSink;

    #[async_trait::async_trait]
    impl ModelSink for DownSink {
        async fn push(
            &self,
            _: &str,
            _: String,
            _: Option<RoundToken>,
        ) -> CallOutcome<PushModelResponse> {
            Err(PeerErr::Unreachable {
                url: "http://localhost:8001/push-model".into(),
                reason: "connection refused".into(),
            })
        }
    }

    fn shard(round: Option<RoundToken>) -> TrainRequest {
        TrainRequest {
            worker_id: "Worker-1".into(),
            features: vec![vec![0.0, 0.0], vec![0.1, 0.2], vec![4.0, 4.0], vec![4.2, 3.9]],
            targets: vec![0, 0, 1, 1],
            round,
        }
    }

    #[tokio::test]
    async fn pushes_a_decodable_model_with_the_shard_round() {
        let worker = Worker::new(RandomForestLearner::default(), RecordingSink::default());

        let delivery = worker.train(shard(Some(RoundToken::new(3)))).await.unwrap();
        assert!(matches!(delivery, Delivery::Accepted(1)));

        let pushed = worker.sink.pushed.lock();
        let (producer, model_b64, round) = &pushed[0];
        assert_eq!(producer, "Worker-1");
        assert_eq!(*round, Some(RoundToken::new(3)));

        let payload = codec::decode_payload(model_b64).unwrap();
        assert!(Model::from_bytes(&payload).is_ok());
    }

    #[tokio::test]
    async fn unreachable_server_is_not_a_training_failure() {
        let worker = Worker::new(RandomForestLearner::default(), DownSink);

        let delivery = worker.train(shard(None)).await.unwrap();
        assert!(matches!(delivery, Delivery::Undelivered(_)));
    }

    #[tokio::test]
    async fn empty_shard_is_an_error() {
        let worker = Worker::new(RandomForestLearner::default(), RecordingSink::default());
        let req = TrainRequest {
            features: vec![],
            targets: vec![],
            ..shard(None)
        };

        assert!(worker.train(req).await.is_err());
        assert!(worker.sink.pushed.lock().is_empty());
    }
}

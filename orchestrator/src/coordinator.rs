use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use comms::{
    PeerClient, RoundToken,
    specs::{
        coordinator::{RegisterWorkerResponse, UploadSummary},
        inference::{AccuracyResponse, PredictRequest},
        server::ClearModelsResponse,
        worker::TrainRequest,
    },
};
use log::{info, warn};
use parking_lot::Mutex;

use crate::{
    Config, IngestErr, Result,
    dispatch::{self, ShardJob},
    ingest::{Dataset, Table},
    partition,
    registry::WorkerRegistry,
};

/// Drives training rounds: owns the worker registry, the round counter and
/// the evaluation set of the last upload.
pub struct Coordinator {
    config: Config,
    client: PeerClient,
    registry: WorkerRegistry,
    round: AtomicU64,
    eval: Mutex<Option<Arc<PredictRequest>>>,
}

impl Coordinator {
    /// Creates a new `Coordinator` with an empty registry.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: PeerClient::new(),
            registry: WorkerRegistry::new(),
            round: AtomicU64::new(0),
            eval: Mutex::new(None),
        }
    }

    /// Registers a worker endpoint.
    pub fn register(&self, worker_url: &str) -> RegisterWorkerResponse {
        let (accepted, total_workers) = self.registry.register(worker_url.trim());
        info!(worker_url = worker_url, accepted = accepted, total_workers = total_workers; "worker registration");

        RegisterWorkerResponse {
            status: "registered".into(),
            total_workers,
        }
    }

    /// Starts a training round from an uploaded table.
    ///
    /// Opens a new round on the parameter server, keeps 20% of the rows as
    /// the evaluation set and sends one shard of the rest to every
    /// registered worker.
    ///
    /// # Arguments
    /// * `raw` - The uploaded table.
    /// * `target` - The name of the label column.
    ///
    /// # Returns
    /// The round summary, with one dispatch report per worker.
    ///
    /// # Errors
    /// Returns `IngestErr` if there are no workers or the table is unusable.
    pub async fn submit_dataset(&self, raw: Vec<u8>, target: &str) -> Result<UploadSummary> {
        if self.registry.is_empty() {
            return Err(IngestErr::NoWorkersAvailable);
        }

        let target = target.trim().to_string();
        let dataset = {
            let target = target.clone();
            tokio::task::spawn_blocking(move || Dataset::from_table(&Table::parse(&raw)?, &target))
                .await
                .map_err(|e| IngestErr::Parse(format!("ingestion task failed: {e}")))??
        };

        let (round, acked) = self.open_round().await;

        let split = partition::split(dataset.len(), self.config.split_seed);
        let pick = |rows: &[usize]| PredictRequest {
            features: rows.iter().map(|&i| dataset.features[i].clone()).collect(),
            targets: rows.iter().map(|&i| dataset.labels[i]).collect(),
        };
        let eval = pick(&split.eval);
        let train = pick(&split.train);

        let (train_rows, eval_rows) = (train.targets.len(), eval.targets.len());
        *self.eval.lock() = Some(Arc::new(eval));

        let workers = self.registry.snapshot();
        let ranges = partition::shard_ranges(train_rows, workers.len());

        let mut features = train.features.into_iter();
        let mut targets = train.targets.into_iter();
        let jobs = workers
            .into_iter()
            .zip(ranges)
            .map(|(worker, range)| ShardJob {
                request: TrainRequest {
                    worker_id: worker.id.clone(),
                    features: features.by_ref().take(range.len()).collect(),
                    targets: targets.by_ref().take(range.len()).collect(),
                    round: acked.then_some(round),
                },
                worker,
            })
            .collect::<Vec<_>>();

        let active_workers = jobs.len();
        info!(round = round.get(), workers = active_workers, train_rows = train_rows, eval_rows = eval_rows; "dispatching shards");

        let dispatch = dispatch::dispatch(&self.client, jobs, &self.config.dispatch).await;
        let delivered = dispatch.iter().filter(|r| r.outcome == "delivered").count();

        Ok(UploadSummary {
            info: format!("Training data sent to {delivered} of {active_workers} workers"),
            active_workers,
            columns_used: dataset.columns_used,
            target,
            round,
            train_rows,
            eval_rows,
            classes: dataset.classes,
            dispatch,
        })
    }

    /// Asks the inference node to score the pool against the held-out rows.
    ///
    /// # Returns
    /// The inference node's answer, or a zero accuracy with a message if
    /// nothing was uploaded yet or the node can't be reached.
    pub async fn check_accuracy(&self) -> AccuracyResponse {
        let eval = self.eval.lock().clone();
        let Some(eval) = eval else {
            return AccuracyResponse::failure("Upload data first");
        };

        let url = PeerClient::endpoint(&self.config.inference_url, "/predict_accuracy");
        match self
            .client
            .post_json(&url, eval.as_ref(), self.config.accuracy_timeout)
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("accuracy check failed: {e}");
                AccuracyResponse::failure(format!("Inference node unavailable: {e}"))
            }
        }
    }

    /// Moves to the next round and clears the parameter server's pool.
    ///
    /// # Returns
    /// The new round, and whether the parameter server acknowledged it.
    /// Shards of an unacknowledged round are sent without a round so the
    /// server still accepts their models.
    async fn open_round(&self) -> (RoundToken, bool) {
        let round = RoundToken::new(self.round.fetch_add(1, Ordering::SeqCst) + 1);
        let url = PeerClient::endpoint(
            &self.config.param_server_url,
            &format!("/clear-models?round={}", round.get()),
        );

        match self
            .client
            .delete_json::<ClearModelsResponse>(&url, self.config.reset_timeout)
            .await
        {
            Ok(ack) => {
                info!(round = ack.round.get(), deleted = ack.deleted_count; "parameter server pool reset");
                (round, ack.round == round)
            }
            Err(e) => {
                warn!(round = round.get(); "could not reset parameter server, continuing: {e}");
                (round, false)
            }
        }
    }
}

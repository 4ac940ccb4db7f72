use std::time::Duration;

use comms::{
    CallOutcome, PeerClient,
    specs::coordinator::{RegisterWorkerRequest, RegisterWorkerResponse},
};
use log::{info, warn};

/// Announces this worker to the coordinator.
///
/// Registration is best effort: a coordinator that isn't up yet only means
/// the worker has to be registered by hand later.
///
/// # Arguments
/// * `client` - The client to send the announcement with.
/// * `coordinator_url` - Base url of the coordinator.
/// * `worker_url` - The url the coordinator should dispatch shards to.
/// * `timeout` - Upper bound of the call.
///
/// # Returns
/// The coordinator's answer, already logged.
pub async fn register(
    client: &PeerClient,
    coordinator_url: &str,
    worker_url: &str,
    timeout: Duration,
) -> CallOutcome<RegisterWorkerResponse> {
    let url = PeerClient::endpoint(coordinator_url, "/register-worker");
    let req = RegisterWorkerRequest {
        worker_url: worker_url.to_string(),
    };

    let res: CallOutcome<RegisterWorkerResponse> = client.post_json(&url, &req, timeout).await;
    match &res {
        Ok(ack) => {
            info!(worker_url = worker_url, total_workers = ack.total_workers; "registered with coordinator");
        }
        Err(e) => {
            warn!(worker_url = worker_url; "could not register with coordinator: {e}");
        }
    }

    res
}

//! Concurrent shard delivery to the registered workers.

use std::time::Duration;

use comms::{
    PeerClient, PeerErr,
    specs::{
        coordinator::DispatchReport,
        worker::{TrainRequest, TrainResponse},
    },
};
use futures::{StreamExt, stream};
use log::{info, warn};

use crate::registry::WorkerHandle;

/// One shard addressed to one worker.
#[derive(Debug, Clone)]
pub struct ShardJob {
    pub worker: WorkerHandle,
    pub request: TrainRequest,
}

/// How a single shard delivery ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    TimedOut,
    Rejected(String),
    Unreachable(String),
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Delivered => "delivered",
            DispatchOutcome::TimedOut => "timed_out",
            DispatchOutcome::Rejected(_) => "rejected",
            DispatchOutcome::Unreachable(_) => "unreachable",
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            DispatchOutcome::Rejected(detail) | DispatchOutcome::Unreachable(detail) => {
                Some(detail.clone())
            }
            _ => None,
        }
    }
}

impl From<PeerErr> for DispatchOutcome {
    fn from(value: PeerErr) -> Self {
        match value {
            PeerErr::Timeout { .. } => Self::TimedOut,
            PeerErr::Unreachable { .. } => Self::Unreachable(value.to_string()),
            PeerErr::Rejected { .. } | PeerErr::InvalidResponse { .. } => {
                Self::Rejected(value.to_string())
            }
        }
    }
}

/// Limits of a dispatch round.
#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
    /// Upper bound of a single `/train` call.
    pub call_timeout: Duration,
    /// Upper bound of the whole round.
    pub round_deadline: Duration,
    /// How many `/train` calls may be in flight at once.
    pub max_in_flight: usize,
}

/// Sends every job and waits for the answers.
///
/// A failed delivery never stops the others. Jobs still pending when the
/// round deadline passes are reported as `timed_out`.
///
/// # Arguments
/// * `client` - The client to send the shards with.
/// * `jobs` - One job per worker.
/// * `policy` - Timeouts and concurrency of the round.
///
/// # Returns
/// One report per job, in job order.
pub async fn dispatch(
    client: &PeerClient,
    jobs: Vec<ShardJob>,
    policy: &DispatchPolicy,
) -> Vec<DispatchReport> {
    let mut reports: Vec<DispatchReport> = jobs
        .iter()
        .map(|job| DispatchReport {
            worker_id: job.worker.id.clone(),
            worker_url: job.worker.endpoint.clone(),
            rows: job.request.targets.len(),
            outcome: DispatchOutcome::TimedOut.as_str().into(),
            detail: None,
        })
        .collect();

    let mut sends = stream::iter(jobs.into_iter().enumerate())
        .map(|(i, job)| async move { (i, send(client, &job, policy.call_timeout).await) })
        .buffer_unordered(policy.max_in_flight.max(1));

    let collect = async {
        while let Some((i, outcome)) = sends.next().await {
            let report = &mut reports[i];
            match &outcome {
                DispatchOutcome::Delivered => {
                    info!(worker_id = report.worker_id.as_str(), rows = report.rows; "shard delivered");
                }
                other => {
                    warn!(
                        worker_id = report.worker_id.as_str(),
                        outcome = other.as_str();
                        "shard not delivered: {}",
                        other.detail().unwrap_or_default()
                    );
                }
            }
            report.outcome = outcome.as_str().into();
            report.detail = outcome.detail();
        }
    };

    if tokio::time::timeout(policy.round_deadline, collect).await.is_err() {
        warn!(deadline_ms = policy.round_deadline.as_millis() as u64; "round deadline passed with shards still pending");
    }

    reports
}

async fn send(client: &PeerClient, job: &ShardJob, timeout: Duration) -> DispatchOutcome {
    let url = PeerClient::endpoint(&job.worker.endpoint, "/train");

    match client
        .post_json::<_, TrainResponse>(&url, &job.request, timeout)
        .await
    {
        Ok(res) if res.is_success() => DispatchOutcome::Delivered,
        Ok(res) => DispatchOutcome::Rejected(res.message.unwrap_or(res.status)),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_errors_map_to_outcomes() {
        let timeout = DispatchOutcome::from(PeerErr::Timeout { url: "u".into() });
        assert_eq!(timeout, DispatchOutcome::TimedOut);
        assert_eq!(timeout.detail(), None);

        let refused = DispatchOutcome::from(PeerErr::Unreachable {
            url: "u".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(refused.as_str(), "unreachable");

        let invalid = DispatchOutcome::from(PeerErr::InvalidResponse {
            url: "u".into(),
            reason: "eof".into(),
        });
        assert_eq!(invalid.as_str(), "rejected");
        assert!(invalid.detail().is_some());
    }
}

use std::time::Duration;

use comms::{
    CallOutcome, PeerClient, RoundToken,
    specs::server::{PushModelRequest, PushModelResponse},
};

/// Where a worker delivers the models it fits.
#[async_trait::async_trait]
pub trait ModelSink: Send + Sync {
    /// Delivers one encoded model.
    ///
    /// # Arguments
    /// * `worker_id` - The producer recorded with the model.
    /// * `model_b64` - The textual form of the model's payload.
    /// * `round` - The round the shard was dispatched in, if known.
    async fn push(
        &self,
        worker_id: &str,
        model_b64: String,
        round: Option<RoundToken>,
    ) -> CallOutcome<PushModelResponse>;
}

/// Delivers models to the parameter server's `/push-model` route.
#[derive(Debug, Clone)]
pub struct HttpModelSink {
    client: PeerClient,
    url: String,
    timeout: Duration,
}

impl HttpModelSink {
    /// Creates a new `HttpModelSink`.
    ///
    /// # Arguments
    /// * `server_url` - Base url of the parameter server.
    /// * `timeout` - Upper bound of a single push.
    pub fn new(server_url: &str, timeout: Duration) -> Self {
        Self {
            client: PeerClient::new(),
            url: PeerClient::endpoint(server_url, "/push-model"),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ModelSink for HttpModelSink {
    async fn push(
        &self,
        worker_id: &str,
        model_b64: String,
        round: Option<RoundToken>,
    ) -> CallOutcome<PushModelResponse> {
        let req = PushModelRequest {
            worker_id: worker_id.to_string(),
            model_b64,
            round,
        };
        self.client.post_json(&self.url, &req, self.timeout).await
    }
}

use std::time::Duration;

use comms::{PeerClient, codec, specs::server::ModelsResponse};
use log::{debug, warn};
use machine_learning::Model;

use crate::Result;

/// Where the inference node gets the model pool from.
#[async_trait::async_trait]
pub trait ModelSource: Send + Sync {
    /// Fetches and decodes the whole pool.
    ///
    /// Artifacts that don't decode into a model are left out.
    async fn fetch(&self) -> Result<Vec<Model>>;
}

/// Reads the pool from the parameter server's `/get-models` route.
#[derive(Debug, Clone)]
pub struct HttpModelSource {
    client: PeerClient,
    url: String,
    timeout: Duration,
}

impl HttpModelSource {
    /// Creates a new `HttpModelSource`.
    ///
    /// # Arguments
    /// * `server_url` - Base url of the parameter server.
    /// * `timeout` - Upper bound of a single fetch.
    pub fn new(server_url: &str, timeout: Duration) -> Self {
        Self {
            client: PeerClient::new(),
            url: PeerClient::endpoint(server_url, "/get-models"),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ModelSource for HttpModelSource {
    async fn fetch(&self) -> Result<Vec<Model>> {
        let res: ModelsResponse = self.client.get_json(&self.url, self.timeout).await?;
        let artifacts = codec::decode_bundle(&res.models_b64)?;
        debug!(count = artifacts.len(), round = res.round.get(); "fetched model pool");

        let models = artifacts
            .into_iter()
            .filter_map(|artifact| match Model::from_bytes(&artifact.payload) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!(producer = artifact.producer.as_str(); "ignoring artifact: {e}");
                    None
                }
            })
            .collect();

        Ok(models)
    }
}

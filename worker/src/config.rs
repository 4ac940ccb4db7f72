use std::time::Duration;

use comms::env::{self, ConfigErr};
use machine_learning::forest::ForestParams;

/// Runtime configuration of a worker.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// The url this worker is reachable at, as announced to the coordinator.
    pub worker_url: String,
    pub coordinator_url: String,
    pub param_server_url: String,
    pub push_timeout: Duration,
    pub register_timeout: Duration,
    pub forest: ForestParams,
}

impl Config {
    /// Reads the worker's variables, defaulting to a local deployment.
    ///
    /// # Errors
    /// Returns `ConfigErr` if a variable is set to something unusable.
    pub fn from_env() -> Result<Self, ConfigErr> {
        let port = env::parse_or("PORT", 8002)?;
        let defaults = ForestParams::default();

        Ok(Self {
            host: env::var_or("HOST", "0.0.0.0"),
            port,
            worker_url: env::var_or("WORKER_URL", &format!("http://localhost:{port}")),
            coordinator_url: env::var_or("COORDINATOR_URL", "http://localhost:8000"),
            param_server_url: env::var_or("PARAM_SERVER_URL", "http://localhost:8001"),
            push_timeout: env::millis_or("PUSH_TIMEOUT_MS", 30_000)?,
            register_timeout: env::millis_or("REGISTER_TIMEOUT_MS", 5_000)?,
            forest: ForestParams {
                n_trees: env::parse_or("TREES_PER_SHARD", defaults.n_trees)?,
                seed: env::parse_or("FOREST_SEED", defaults.seed)?,
                ..defaults
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

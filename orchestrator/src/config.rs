use std::time::Duration;

use comms::env::{self, ConfigErr};

use crate::dispatch::DispatchPolicy;

/// Runtime configuration of the coordinator.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub param_server_url: String,
    pub inference_url: String,
    /// Upper bound of the best-effort pool reset.
    pub reset_timeout: Duration,
    /// Upper bound of the proxied accuracy check.
    pub accuracy_timeout: Duration,
    pub dispatch: DispatchPolicy,
    /// Seed of the train/evaluation split.
    pub split_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            param_server_url: "http://localhost:8001".into(),
            inference_url: "http://localhost:8004".into(),
            reset_timeout: Duration::from_millis(1_000),
            accuracy_timeout: Duration::from_millis(120_000),
            dispatch: DispatchPolicy {
                call_timeout: Duration::from_millis(60_000),
                round_deadline: Duration::from_millis(300_000),
                max_in_flight: 8,
            },
            split_seed: 42,
        }
    }
}

impl Config {
    /// Reads the coordinator's variables on top of the defaults.
    ///
    /// # Errors
    /// Returns `ConfigErr` if a variable is set to something unusable.
    pub fn from_env() -> Result<Self, ConfigErr> {
        let d = Self::default();

        Ok(Self {
            host: env::var_or("HOST", &d.host),
            port: env::parse_or("PORT", d.port)?,
            param_server_url: env::var_or("PARAM_SERVER_URL", &d.param_server_url),
            inference_url: env::var_or("INFERENCE_URL", &d.inference_url),
            reset_timeout: env::millis_or("RESET_TIMEOUT_MS", 1_000)?,
            accuracy_timeout: env::millis_or("ACCURACY_TIMEOUT_MS", 120_000)?,
            dispatch: DispatchPolicy {
                call_timeout: env::millis_or("DISPATCH_TIMEOUT_MS", 60_000)?,
                round_deadline: env::millis_or("ROUND_DEADLINE_MS", 300_000)?,
                max_in_flight: env::parse_or("MAX_IN_FLIGHT", d.dispatch.max_in_flight)?,
            },
            split_seed: env::parse_or("SPLIT_SEED", d.split_seed)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

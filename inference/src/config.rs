use std::time::Duration;

use comms::env::{self, ConfigErr};

/// Runtime configuration of the inference node.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub param_server_url: String,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Reads `HOST`, `PORT`, `PARAM_SERVER_URL` and `FETCH_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Ok(Self {
            host: env::var_or("HOST", "0.0.0.0"),
            port: env::parse_or("PORT", 8004)?,
            param_server_url: env::var_or("PARAM_SERVER_URL", "http://localhost:8001"),
            fetch_timeout: env::millis_or("FETCH_TIMEOUT_MS", 30_000)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

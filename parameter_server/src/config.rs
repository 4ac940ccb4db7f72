use comms::env::{self, ConfigErr};

/// Runtime configuration of the parameter server.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Reads `HOST` and `PORT`, defaulting to `0.0.0.0:8001`.
    pub fn from_env() -> Result<Self, ConfigErr> {
        Ok(Self {
            host: env::var_or("HOST", "0.0.0.0"),
            port: env::parse_or("PORT", 8001)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

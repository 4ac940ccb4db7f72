use std::time::Duration;

use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};

use crate::PeerErr;

/// The typed result of every outbound call between services.
///
/// Callers decide once, at their own boundary, whether an `Err` is ignored,
/// logged or surfaced.
pub type CallOutcome<T> = Result<T, PeerErr>;

/// A small JSON-over-HTTP client where every call carries its own timeout.
#[derive(Debug, Clone, Default)]
pub struct PeerClient {
    http: Client,
}

impl PeerClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Joins a peer's base url and a route path.
    ///
    /// # Arguments
    /// * `base` - The peer's base url, with or without a trailing slash.
    /// * `path` - The route path, with or without a leading slash.
    pub fn endpoint(base: &str, path: &str) -> String {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends `body` as JSON with a `POST` and decodes the JSON answer.
    ///
    /// # Arguments
    /// * `url` - The full route url.
    /// * `body` - The request body.
    /// * `timeout` - Upper bound for the whole exchange.
    pub async fn post_json<B, T>(&self, url: &str, body: &B, timeout: Duration) -> CallOutcome<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(url, self.http.post(url).json(body), timeout).await
    }

    /// Sends a `GET` and decodes the JSON answer.
    pub async fn get_json<T>(&self, url: &str, timeout: Duration) -> CallOutcome<T>
    where
        T: DeserializeOwned,
    {
        self.call(url, self.http.get(url), timeout).await
    }

    /// Sends a `DELETE` and decodes the JSON answer.
    pub async fn delete_json<T>(&self, url: &str, timeout: Duration) -> CallOutcome<T>
    where
        T: DeserializeOwned,
    {
        self.call(url, self.http.delete(url), timeout).await
    }

    async fn call<T>(&self, url: &str, req: RequestBuilder, timeout: Duration) -> CallOutcome<T>
    where
        T: DeserializeOwned,
    {
        debug!(url = url, timeout_ms = timeout.as_millis() as u64; "outbound call");

        let res = req
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(PeerErr::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = res.bytes().await.map_err(|e| classify(url, e))?;
        serde_json::from_slice(&bytes).map_err(|e| PeerErr::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn classify(url: &str, err: reqwest::Error) -> PeerErr {
    if err.is_timeout() {
        PeerErr::Timeout {
            url: url.to_string(),
        }
    } else {
        PeerErr::Unreachable {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

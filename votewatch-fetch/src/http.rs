//! Direct HTTP fetcher for upstreams that serve the JSON without scripts.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use votewatch_core::{FetchError, UpstreamUnavailable, VoteResult};

use crate::browser::DEFAULT_FETCH_TIMEOUT;
use crate::traits::RawFetcher;

/// [`RawFetcher`] backed by a plain `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, UpstreamUnavailable> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, UpstreamUnavailable> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("votewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamUnavailable::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::timeout(url, self.timeout)
        } else if let Some(status) = err.status() {
            FetchError::status(url, status.as_u16())
        } else {
            FetchError::navigation(url, err)
        }
    }
}

#[async_trait]
impl RawFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> VoteResult<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Upstream returned error status");
            return Err(FetchError::status(url, status.as_u16()).into());
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;
        debug!(url, bytes = body.len(), "Fetched upstream document");

        serde_json::from_str(&body).map_err(|e| {
            FetchError::invalid_json(url, e)
                .with_snapshot(&body)
                .into()
        })
    }

    fn kind(&self) -> &'static str {
        "http"
    }
}

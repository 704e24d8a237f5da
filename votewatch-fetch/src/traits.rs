//! The raw fetch seam.

use async_trait::async_trait;
use serde_json::Value;
use votewatch_core::VoteResult;

/// Retrieves the JSON document behind an upstream URL.
///
/// The rest of the system does not know how the document is obtained: a
/// headless browser, a plain HTTP request and a scripted fake are all
/// interchangeable behind this trait.
#[async_trait]
pub trait RawFetcher: Send + Sync {
    /// Fetch and parse the document for `url`.
    async fn fetch(&self, url: &str) -> VoteResult<Value>;

    /// Short name of the implementation, reported by health checks.
    fn kind(&self) -> &'static str;

    /// Release owned resources. Called once on shutdown.
    async fn shutdown(&self) {}
}

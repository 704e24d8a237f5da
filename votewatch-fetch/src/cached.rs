//! Raw document cache in front of a [`RawFetcher`].

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use votewatch_core::VoteResult;
use votewatch_storage::{CacheRead, CacheStats, Clock, SystemClock, TtlCache};

use crate::traits::RawFetcher;

/// Default lifetime of a cached raw document.
pub const DEFAULT_RAW_TTL: Duration = Duration::from_secs(15);

/// Caches successful fetches by URL. Failures always go back upstream on the
/// next call.
pub struct CachedFetcher {
    inner: Arc<dyn RawFetcher>,
    cache: TtlCache<String, Arc<Value>>,
}

impl CachedFetcher {
    pub fn new(inner: Arc<dyn RawFetcher>, ttl: Duration) -> Self {
        Self::with_clock(inner, ttl, SystemClock)
    }

    pub fn with_clock(inner: Arc<dyn RawFetcher>, ttl: Duration, clock: impl Clock + 'static) -> Self {
        Self {
            inner,
            cache: TtlCache::with_clock(ttl, clock),
        }
    }

    /// Return the document for `url`, from cache if still fresh.
    pub async fn get(&self, url: &str) -> VoteResult<CacheRead<Arc<Value>>> {
        if let Some(doc) = self.cache.get(url) {
            debug!(url, cache = "raw", "Cache hit");
            return Ok(CacheRead::from_cache(doc));
        }

        let doc = Arc::new(self.inner.fetch(url).await?);
        self.cache.set(url.to_string(), Arc::clone(&doc));
        Ok(CacheRead::from_source(doc))
    }

    /// Drop any cached document for `url`.
    pub fn invalidate(&self, url: &str) {
        self.cache.remove(url);
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    pub async fn shutdown(&self) {
        self.cache.clear();
        self.inner.shutdown().await;
    }
}

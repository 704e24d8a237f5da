//! Votes service: raw fetch, aggregation and the derived-list cache.
//!
//! Two cache layers sit in front of the upstream. Raw documents are cached
//! by URL inside [`CachedFetcher`]; candidate lists computed from them are
//! cached here under [`ListKey`]. Only successful results are stored.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::try_join;
use serde_json::Value;
use tracing::{debug, info};
use votewatch_core::{
    combine, extract_diaspora, extract_romania, Electorate, ListKey, ScopeResult, VoteResult,
};
use votewatch_fetch::{CachedFetcher, RawFetcher};
use votewatch_storage::{CacheStats, Clock, SystemClock, TtlCache};

use crate::telemetry::metrics::with_metrics;
use crate::types::VotesResponse;

/// Settings for [`VotesService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub romania_url: String,
    pub diaspora_url: String,
    pub raw_cache_ttl: Duration,
    pub derived_cache_ttl: Duration,
}

/// Hit/miss counters for both cache layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceCacheStats {
    pub raw: CacheStats,
    pub derived: CacheStats,
}

pub struct VotesService {
    fetcher: CachedFetcher,
    derived: TtlCache<ListKey, Arc<ScopeResult>>,
    romania_url: String,
    diaspora_url: String,
}

impl VotesService {
    pub fn new(fetcher: Arc<dyn RawFetcher>, config: ServiceConfig) -> Self {
        Self::with_clock(fetcher, config, SystemClock)
    }

    /// Build with an explicit time source shared by both cache layers.
    pub fn with_clock<C>(fetcher: Arc<dyn RawFetcher>, config: ServiceConfig, clock: C) -> Self
    where
        C: Clock + Clone + 'static,
    {
        Self {
            fetcher: CachedFetcher::with_clock(fetcher, config.raw_cache_ttl, clock.clone()),
            derived: TtlCache::with_clock(config.derived_cache_ttl, clock),
            romania_url: config.romania_url,
            diaspora_url: config.diaspora_url,
        }
    }

    pub fn url(&self, electorate: Electorate) -> &str {
        match electorate {
            Electorate::Romania => &self.romania_url,
            Electorate::Diaspora => &self.diaspora_url,
        }
    }

    /// Raw upstream document for `electorate`, through the raw cache.
    pub async fn raw(&self, electorate: Electorate) -> VoteResult<Arc<Value>> {
        let url = self.url(electorate);
        let started = Instant::now();

        match self.fetcher.get(url).await {
            Ok(read) => {
                let hit = read.was_cache_hit();
                with_metrics(|m| {
                    m.record_cache_lookup("raw", hit);
                    if !hit {
                        m.record_upstream_fetch(
                            electorate.as_str(),
                            "success",
                            started.elapsed().as_secs_f64(),
                        );
                    }
                });
                Ok(read.into_value())
            }
            Err(err) => {
                with_metrics(|m| {
                    m.record_cache_lookup("raw", false);
                    m.record_upstream_fetch(
                        electorate.as_str(),
                        err.kind(),
                        started.elapsed().as_secs_f64(),
                    );
                });
                Err(err)
            }
        }
    }

    /// Candidate list for one electorate, from the derived cache or freshly
    /// extracted.
    pub async fn list(&self, electorate: Electorate) -> VoteResult<Arc<ScopeResult>> {
        let key = electorate.list_key();
        if let Some(cached) = self.lookup(key) {
            return Ok(cached);
        }

        let doc = self.raw(electorate).await?;
        let list = match electorate {
            Electorate::Romania => extract_romania(&doc)?,
            Electorate::Diaspora => extract_diaspora(&doc)?,
        };
        debug!(
            electorate = %electorate,
            candidates = list.len(),
            total_votes = list.total_votes(),
            "Extracted candidate list"
        );

        let list = Arc::new(list);
        self.derived.set(key, Arc::clone(&list));
        Ok(list)
    }

    pub async fn romania(&self) -> VoteResult<Arc<ScopeResult>> {
        self.list(Electorate::Romania).await
    }

    pub async fn diaspora(&self) -> VoteResult<Arc<ScopeResult>> {
        self.list(Electorate::Diaspora).await
    }

    /// Combined list of both electorates.
    ///
    /// A cached combined list is returned while it is live, even when the
    /// arguments differ from the inputs it was computed from. Callers see
    /// one stable combined view per derived TTL window.
    pub fn combined(&self, romania: &ScopeResult, diaspora: &ScopeResult) -> Arc<ScopeResult> {
        if let Some(cached) = self.lookup(ListKey::Combined) {
            return cached;
        }

        let combined = Arc::new(combine(romania, diaspora));
        self.derived.set(ListKey::Combined, Arc::clone(&combined));
        combined
    }

    /// All three lists. Both electorates are fetched concurrently; any
    /// failure fails the whole call.
    pub async fn get_votes(&self) -> VoteResult<VotesResponse> {
        let started = Instant::now();
        let (romania, diaspora) = try_join(self.romania(), self.diaspora()).await?;
        let combined = self.combined(&romania, &diaspora);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            combined_candidates = combined.len(),
            "Votes assembled"
        );
        Ok(VotesResponse {
            romania,
            diaspora,
            combined,
        })
    }

    /// Live derived entry for `key`, if any. Counts as a cache lookup.
    pub fn cached(&self, key: ListKey) -> Option<Arc<ScopeResult>> {
        self.derived.get(&key)
    }

    pub fn cache_stats(&self) -> ServiceCacheStats {
        ServiceCacheStats {
            raw: self.fetcher.stats(),
            derived: self.derived.stats(),
        }
    }

    pub fn fetcher_kind(&self) -> &'static str {
        self.fetcher.kind()
    }

    /// Drop cached state and release the fetcher's resources.
    pub async fn shutdown(&self) {
        self.derived.clear();
        self.fetcher.shutdown().await;
    }

    fn lookup(&self, key: ListKey) -> Option<Arc<ScopeResult>> {
        let cached = self.derived.get(&key);
        with_metrics(|m| m.record_cache_lookup("derived", cached.is_some()));
        if cached.is_some() {
            debug!(cache = "derived", key = %key, "Cache hit");
        }
        cached
    }
}

//! Health Check Endpoints
//!
//! - /health/ping - plain `pong`
//! - /health/live - process is up, with uptime
//! - /health/ready - fetcher kind and both cache layers
//!
//! None of these touch the upstream; the first `/votes` request pays for the
//! initial fetch.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use votewatch_storage::CacheStats;

use crate::service::{ServiceCacheStats, VotesService};
use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Alive,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessReport {
    pub status: HealthState,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub status: HealthState,
    pub version: String,
    pub uptime_seconds: u64,
    /// `browser`, `http`, or a test double's name.
    pub fetcher: String,
    pub caches: CacheLayers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheLayers {
    pub raw: CacheSummary,
    pub derived: CacheSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSummary {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub entries: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheSummary {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            entries: stats.entry_count,
            hit_rate: stats.hit_rate(),
        }
    }
}

impl From<ServiceCacheStats> for CacheLayers {
    fn from(stats: ServiceCacheStats) -> Self {
        Self {
            raw: stats.raw.into(),
            derived: stats.derived.into(),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn liveness(State(start_time): State<Instant>) -> Json<LivenessReport> {
    Json(LivenessReport {
        status: HealthState::Alive,
        uptime_seconds: start_time.elapsed().as_secs(),
    })
}

pub async fn readiness(
    State(service): State<Arc<VotesService>>,
    State(start_time): State<Instant>,
) -> Json<ReadinessReport> {
    Json(ReadinessReport {
        status: HealthState::Ready,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        fetcher: service.fetcher_kind().to_string(),
        caches: service.cache_stats().into(),
    })
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_wire_shape() {
        let report = LivenessReport {
            status: HealthState::Alive,
            uptime_seconds: 12,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "alive", "uptime_seconds": 12 }));
    }

    #[test]
    fn test_cache_summary_from_stats() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            expirations: 1,
            entry_count: 2,
        };
        let summary = CacheSummary::from(stats);
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.hit_rate, 0.75);
    }
}

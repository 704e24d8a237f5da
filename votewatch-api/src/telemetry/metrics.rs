//! Prometheus Metrics Definitions
//!
//! Defines all VoteWatch metrics with their labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Upstream fetch latency buckets (seconds). Browser fetches take seconds.
const UPSTREAM_LATENCY_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 30.0];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<VoteMetrics>> = Lazy::new(VoteMetrics::new);

/// Run `f` against the global metrics, if they registered successfully.
pub fn with_metrics<F: FnOnce(&VoteMetrics)>(f: F) {
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

/// Container for all VoteWatch metrics.
#[derive(Clone)]
pub struct VoteMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Upstream fetch counter - labels: electorate, outcome
    pub upstream_fetches_total: CounterVec,

    /// Upstream fetch duration histogram - labels: electorate
    pub upstream_fetch_duration_seconds: HistogramVec,

    /// Cache lookup counter - labels: layer (raw/derived), result (hit/miss)
    pub cache_lookups_total: CounterVec,
}

impl VoteMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "votewatch_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "votewatch_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            upstream_fetches_total: register_counter_vec!(
                "votewatch_upstream_fetches_total",
                "Total number of upstream document fetches",
                &["electorate", "outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register upstream_fetches_total: {}", e)))?,

            upstream_fetch_duration_seconds: register_histogram_vec!(
                "votewatch_upstream_fetch_duration_seconds",
                "Upstream document fetch duration in seconds",
                &["electorate"],
                UPSTREAM_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register upstream_fetch_duration_seconds: {}", e)))?,

            cache_lookups_total: register_counter_vec!(
                "votewatch_cache_lookups_total",
                "Total number of cache lookups",
                &["layer", "result"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_lookups_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a fetch that went to the upstream. `outcome` is `success` or
    /// the error kind.
    pub fn record_upstream_fetch(&self, electorate: &str, outcome: &str, duration_secs: f64) {
        self.upstream_fetches_total
            .with_label_values(&[electorate, outcome])
            .inc();
        self.upstream_fetch_duration_seconds
            .with_label_values(&[electorate])
            .observe(duration_secs);
    }

    /// Record a cache lookup.
    pub fn record_cache_lookup(&self, layer: &str, hit: bool) {
        let result = if hit { "hit" } else { "miss" };
        self.cache_lookups_total
            .with_label_values(&[layer, result])
            .inc();
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    // Registration happens on first use; make sure the families exist even
    // before any request has been recorded.
    Lazy::force(&METRICS);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

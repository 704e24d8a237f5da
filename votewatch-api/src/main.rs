//! VoteWatch API Server Entry Point
//!
//! Loads configuration, starts the selected fetcher and serves the Axum
//! router until SIGINT or SIGTERM, then closes the browser.

use std::sync::Arc;

use votewatch_api::telemetry::{init_tracing, TelemetryConfig};
use votewatch_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, FetcherKind, VotesService,
};
use votewatch_fetch::{BrowserFetcher, ChromiumLauncher, HttpFetcher, RawFetcher};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::default())?;

    let config = ApiConfig::load()?;
    tracing::info!(
        romania_url = %config.romania_url,
        diaspora_url = %config.diaspora_url,
        fetcher = ?config.fetcher,
        derived_ttl_secs = config.derived_cache_ttl.as_secs(),
        raw_ttl_secs = config.raw_cache_ttl.as_secs(),
        "Configuration loaded"
    );

    let fetcher = build_fetcher(&config)?;
    let service = Arc::new(VotesService::new(fetcher, config.service_config()));
    let app = create_api_router(AppState::new(Arc::clone(&service)), &config);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(%addr, "Starting VoteWatch API server");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)));

    service.shutdown().await;
    tracing::info!("Shutdown complete");
    served
}

fn build_fetcher(config: &ApiConfig) -> ApiResult<Arc<dyn RawFetcher>> {
    match config.fetcher {
        FetcherKind::Browser => {
            let mut launcher = ChromiumLauncher::new()
                .with_headless(config.headless)
                .with_request_timeout(config.fetch_timeout);
            if let Some(path) = &config.chrome_executable {
                launcher = launcher.with_executable(path);
            }
            Ok(Arc::new(BrowserFetcher::with_timeout(launcher, config.fetch_timeout)))
        }
        FetcherKind::Http => Ok(Arc::new(HttpFetcher::with_timeout(config.fetch_timeout)?)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

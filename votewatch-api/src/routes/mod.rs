//! HTTP routes.
//!
//! - `GET /votes` - romania, diaspora and combined lists
//! - `GET /raw/{romania,diaspora}` - upstream passthrough
//! - `GET /health/*` - liveness and readiness
//! - `GET /metrics` - Prometheus exposition

pub mod health;
pub mod raw;
pub mod votes;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins any origin is allowed; otherwise only the
/// listed ones.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.restricts_origins() {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    } else {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    }
}

/// Create the complete API router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .route("/votes", get(votes::get_votes))
        .nest("/raw", raw::create_router())
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_both_modes() {
        let mut config = ApiConfig::default();
        let _ = build_cors_layer(&config);

        config.cors_origins = vec!["https://dash.example".to_string(), "bad\nvalue".to_string()];
        let _ = build_cors_layer(&config);
    }
}

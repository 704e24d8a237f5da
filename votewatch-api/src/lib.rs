//! VoteWatch API - Election Results over HTTP
//!
//! Fetches domestic and diaspora results through a [`RawFetcher`], aggregates
//! per-candidate votes and serves them from short-TTL caches:
//!
//! - `GET /votes` - `{ romania, diaspora, combined }` or `502 { error }`
//! - `GET /raw/romania`, `GET /raw/diaspora` - upstream documents
//! - `GET /health/*`, `GET /metrics`
//!
//! [`RawFetcher`]: votewatch_fetch::RawFetcher

pub mod config;
pub mod constants;
pub mod error;
pub mod macros;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;
pub mod types;

pub use config::{ApiConfig, ConfigError, FetcherKind};
pub use error::{ApiError, ApiResult, ErrorBody, ErrorCode};
pub use routes::create_api_router;
pub use service::{ServiceCacheStats, ServiceConfig, VotesService};
pub use state::AppState;
pub use types::VotesResponse;

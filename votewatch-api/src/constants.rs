//! Shared constants for the VoteWatch API.

/// Domestic presidential results page.
pub const DEFAULT_ROMANIA_URL: &str =
    "https://prezenta.roaep.ro/prezidentiale24112024/pv/romania/results";

/// Diaspora presidential results page.
pub const DEFAULT_DIASPORA_URL: &str =
    "https://prezenta.roaep.ro/prezidentiale24112024/pv/strainatate/results";

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Lifetime of derived candidate lists, in seconds.
pub const DEFAULT_DERIVED_CACHE_TTL_SECS: u64 = 30;

/// Lifetime of raw upstream documents, in seconds.
pub const DEFAULT_RAW_CACHE_TTL_SECS: u64 = 15;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// CORS preflight cache (24 hours).
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86_400;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "VOTEWATCH_CONFIG";

/// Default `tracing` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "votewatch_api=debug,votewatch_fetch=debug,tower_http=info,info";

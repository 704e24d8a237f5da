//! API Configuration Module
//!
//! Settings are layered: hardcoded defaults, then an optional TOML file
//! (`--config <path>` or `VOTEWATCH_CONFIG`), then environment variables.
//! The merged result is validated before the server starts.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_BIND, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_DERIVED_CACHE_TTL_SECS,
    DEFAULT_DIASPORA_URL, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_RAW_CACHE_TTL_SECS,
    DEFAULT_ROMANIA_URL,
};
use crate::service::ServiceConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// How raw upstream documents are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Headless browser capturing the page's own JSON request.
    Browser,
    /// Direct HTTP request to a URL that already serves JSON.
    Http,
}

impl FromStr for FetcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(FetcherKind::Browser),
            "http" => Ok(FetcherKind::Http),
            other => Err(format!("expected 'browser' or 'http', got '{}'", other)),
        }
    }
}

/// Optional file layer. Absent keys keep the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    romania_url: Option<String>,
    diaspora_url: Option<String>,
    bind: Option<String>,
    port: Option<u16>,
    derived_cache_ttl_secs: Option<u64>,
    raw_cache_ttl_secs: Option<u64>,
    fetch_timeout_secs: Option<u64>,
    fetcher: Option<FetcherKind>,
    chrome_executable: Option<PathBuf>,
    headless: Option<bool>,
    cors_origins: Option<Vec<String>>,
    cors_max_age_secs: Option<u64>,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub romania_url: String,
    pub diaspora_url: String,
    pub bind: String,
    pub port: u16,
    pub derived_cache_ttl: Duration,
    pub raw_cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub fetcher: FetcherKind,
    /// Browser binary; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    pub headless: bool,
    /// Allowed CORS origins. Empty means allow all origins.
    pub cors_origins: Vec<String>,
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            romania_url: DEFAULT_ROMANIA_URL.to_string(),
            diaspora_url: DEFAULT_DIASPORA_URL.to_string(),
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            derived_cache_ttl: Duration::from_secs(DEFAULT_DERIVED_CACHE_TTL_SECS),
            raw_cache_ttl: Duration::from_secs(DEFAULT_RAW_CACHE_TTL_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            fetcher: FetcherKind::Browser,
            chrome_executable: None,
            headless: true,
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

impl ApiConfig {
    /// Load from defaults, the optional config file and the process
    /// environment, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = config_path_from_args().or_else(config_path_from_env) {
            config.apply_file(&path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from a TOML file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        self.apply_toml(&contents)
    }

    /// Overlay values from TOML text.
    pub fn apply_toml(&mut self, contents: &str) -> Result<(), ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;

        if let Some(v) = file.romania_url {
            self.romania_url = v;
        }
        if let Some(v) = file.diaspora_url {
            self.diaspora_url = v;
        }
        if let Some(v) = file.bind {
            self.bind = v;
        }
        if let Some(v) = file.port {
            self.port = v;
        }
        if let Some(v) = file.derived_cache_ttl_secs {
            self.derived_cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = file.raw_cache_ttl_secs {
            self.raw_cache_ttl = Duration::from_secs(v);
        }
        if let Some(v) = file.fetch_timeout_secs {
            self.fetch_timeout = Duration::from_secs(v);
        }
        if let Some(v) = file.fetcher {
            self.fetcher = v;
        }
        if let Some(v) = file.chrome_executable {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = file.headless {
            self.headless = v;
        }
        if let Some(v) = file.cors_origins {
            self.cors_origins = v;
        }
        if let Some(v) = file.cors_max_age_secs {
            self.cors_max_age_secs = v;
        }
        Ok(())
    }

    /// Overlay values from environment variables, read through `lookup`.
    ///
    /// Environment variables:
    /// - `VOTEWATCH_ROMANIA_URL`, `VOTEWATCH_DIASPORA_URL`: upstream pages
    /// - `VOTEWATCH_BIND`: listen address (default: 0.0.0.0)
    /// - `PORT` or `VOTEWATCH_PORT`: listen port (default: 3000)
    /// - `VOTEWATCH_DERIVED_CACHE_TTL_SECS` (default: 30)
    /// - `VOTEWATCH_RAW_CACHE_TTL_SECS` (default: 15)
    /// - `VOTEWATCH_FETCH_TIMEOUT_SECS` (default: 15)
    /// - `VOTEWATCH_FETCHER`: "browser" or "http" (default: browser)
    /// - `VOTEWATCH_CHROME`: browser executable path
    /// - `VOTEWATCH_HEADLESS`: "true" or "false" (default: true)
    /// - `VOTEWATCH_CORS_ORIGINS`: comma-separated origins (empty = allow all)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VOTEWATCH_ROMANIA_URL") {
            self.romania_url = v;
        }
        if let Some(v) = lookup("VOTEWATCH_DIASPORA_URL") {
            self.diaspora_url = v;
        }
        if let Some(v) = lookup("VOTEWATCH_BIND") {
            self.bind = v;
        }
        if let Some(v) = lookup("PORT").or_else(|| lookup("VOTEWATCH_PORT")) {
            self.port = parse_value("port", &v)?;
        }
        if let Some(v) = lookup("VOTEWATCH_DERIVED_CACHE_TTL_SECS") {
            self.derived_cache_ttl = Duration::from_secs(parse_value("derived_cache_ttl_secs", &v)?);
        }
        if let Some(v) = lookup("VOTEWATCH_RAW_CACHE_TTL_SECS") {
            self.raw_cache_ttl = Duration::from_secs(parse_value("raw_cache_ttl_secs", &v)?);
        }
        if let Some(v) = lookup("VOTEWATCH_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout = Duration::from_secs(parse_value("fetch_timeout_secs", &v)?);
        }
        if let Some(v) = lookup("VOTEWATCH_FETCHER") {
            self.fetcher = parse_value("fetcher", &v)?;
        }
        if let Some(v) = lookup("VOTEWATCH_CHROME") {
            self.chrome_executable = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("VOTEWATCH_HEADLESS") {
            self.headless = parse_value("headless", &v.to_ascii_lowercase())?;
        }
        if let Some(v) = lookup("VOTEWATCH_CORS_ORIGINS") {
            self.cors_origins = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.romania_url.trim().is_empty() {
            return Err(invalid("romania_url", "must not be empty"));
        }
        if self.diaspora_url.trim().is_empty() {
            return Err(invalid("diaspora_url", "must not be empty"));
        }
        if self.derived_cache_ttl.is_zero() {
            return Err(invalid("derived_cache_ttl_secs", "must be > 0"));
        }
        if self.raw_cache_ttl.is_zero() {
            return Err(invalid("raw_cache_ttl_secs", "must be > 0"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(invalid("fetch_timeout_secs", "must be > 0"));
        }
        Ok(())
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| invalid("bind", format!("{}: {}", addr, e)))
    }

    /// Settings consumed by the votes service.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            romania_url: self.romania_url.clone(),
            diaspora_url: self.diaspora_url.clone(),
            raw_cache_ttl: self.raw_cache_ttl,
            derived_cache_ttl: self.derived_cache_ttl,
        }
    }

    /// Whether CORS is limited to an explicit origin list.
    pub fn restricts_origins(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn parse_value<T>(field: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(field, format!("'{}': {}", raw, e)))
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

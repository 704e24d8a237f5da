//! Configuration loading for the VoteWatch dashboard.
//!
//! Defaults, then an optional TOML file, then environment variables.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    /// Stop after this many polls. `None` polls until interrupted.
    pub max_polls: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    api_base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_polls: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_polls: None,
        }
    }
}

impl DashboardConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = config_path_from_args().or_else(config_path_from_env) {
            config.apply_file(&path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        self.apply_toml(&contents)
    }

    pub fn apply_toml(&mut self, contents: &str) -> Result<(), ConfigError> {
        let file: FileConfig = toml::from_str(contents)?;
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(secs) = file.poll_interval_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if file.max_polls.is_some() {
            self.max_polls = file.max_polls;
        }
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VOTEWATCH_API_URL") {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup("VOTEWATCH_POLL_INTERVAL_SECS") {
            self.poll_interval = Duration::from_secs(parse_u64("poll_interval_secs", &raw)?);
        }
        if let Some(raw) = lookup("VOTEWATCH_REQUEST_TIMEOUT_SECS") {
            self.request_timeout = Duration::from_secs(parse_u64("request_timeout_secs", &raw)?);
        }
        if let Some(raw) = lookup("VOTEWATCH_MAX_POLLS") {
            self.max_polls = Some(parse_u64("max_polls", &raw)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if reqwest::Url::parse(url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: format!("not a valid URL: {}", url),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be > 0".to_string(),
            });
        }
        if self.max_polls == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_polls",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL of the votes endpoint.
    pub fn votes_url(&self) -> String {
        format!("{}/votes", self.api_base_url.trim().trim_end_matches('/'))
    }
}

fn parse_u64(field: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        field,
        reason: format!("expected a non-negative integer, got {:?}", raw),
    })
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("VOTEWATCH_DASHBOARD_CONFIG").ok().map(PathBuf::from)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, Duration::from_secs(20));
        assert_eq!(config.votes_url(), "http://127.0.0.1:3000/votes");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = DashboardConfig::default();
        config
            .apply_toml("api_base_url = \"http://file:1/\"\npoll_interval_secs = 5\n")
            .unwrap();
        config
            .apply_env(env(&[("VOTEWATCH_POLL_INTERVAL_SECS", "7")]))
            .unwrap();

        assert_eq!(config.votes_url(), "http://file:1/votes");
        assert_eq!(config.poll_interval, Duration::from_secs(7));
    }

    #[test]
    fn test_unknown_file_key_rejected() {
        let mut config = DashboardConfig::default();
        let err = config.apply_toml("theme = \"dark\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = DashboardConfig::default();
        let err = config
            .apply_env(env(&[("VOTEWATCH_POLL_INTERVAL_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "poll_interval_secs", .. }));

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let config = DashboardConfig {
            api_base_url: "not a url".to_string(),
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

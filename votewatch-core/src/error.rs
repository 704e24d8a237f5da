//! Error types for VoteWatch operations

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Maximum number of characters of rendered page content kept on a
/// [`FetchError`] for diagnostics.
pub const PAGE_SNAPSHOT_LIMIT: usize = 2048;

/// What went wrong while retrieving a raw upstream document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchErrorKind {
    #[error("no qualifying JSON response within {0:?}")]
    Timeout(Duration),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("upstream answered with status {0}")]
    Status(u16),

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("browser error: {0}")]
    Browser(String),
}

/// Failure to retrieve a raw upstream document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Fetch of {url} failed: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
    /// Rendered page content at the time of failure, if it could be captured.
    pub page_snapshot: Option<String>,
}

impl FetchError {
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
            page_snapshot: None,
        }
    }

    pub fn timeout(url: impl Into<String>, after: Duration) -> Self {
        Self::new(url, FetchErrorKind::Timeout(after))
    }

    pub fn navigation(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::new(url, FetchErrorKind::Navigation(reason.to_string()))
    }

    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::new(url, FetchErrorKind::Status(status))
    }

    pub fn invalid_json(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::new(url, FetchErrorKind::InvalidJson(reason.to_string()))
    }

    pub fn browser(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::new(url, FetchErrorKind::Browser(reason.to_string()))
    }

    /// Attach a snapshot of the rendered page, truncated to
    /// [`PAGE_SNAPSHOT_LIMIT`] characters.
    pub fn with_snapshot(mut self, content: impl AsRef<str>) -> Self {
        let content = content.as_ref();
        let snapshot = match content.char_indices().nth(PAGE_SNAPSHOT_LIMIT) {
            Some((cut, _)) => content[..cut].to_string(),
            None => content.to_string(),
        };
        self.page_snapshot = Some(snapshot);
        self
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, FetchErrorKind::Timeout(_))
    }
}

/// The upstream document does not have the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Missing expected path in upstream document: {path}")]
    MissingPath { path: String },

    #[error("Unexpected type at {path}: expected {expected}")]
    UnexpectedType { path: String, expected: &'static str },

    #[error("Invalid candidate at {path}: {reason}")]
    InvalidCandidate { path: String, reason: String },
}

impl AggregationError {
    /// The dotted path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::MissingPath { path }
            | Self::UnexpectedType { path, .. }
            | Self::InvalidCandidate { path, .. } => path,
        }
    }
}

/// The browser resource could not be (re)created.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Upstream unavailable: {reason}")]
pub struct UpstreamUnavailable {
    pub reason: String,
}

impl UpstreamUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Master error type for all VoteWatch errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    UpstreamUnavailable(#[from] UpstreamUnavailable),
}

impl VoteError {
    /// Short machine-readable name of the error kind, used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Aggregation(_) => "aggregation",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }
}

/// Result type alias for VoteWatch operations.
pub type VoteResult<T> = Result<T, VoteError>;

//! Browser-backed fetching over a single shared browser process.
//!
//! The upstream page only requests its data file after client-side scripts
//! run, so the document is captured from the page's own network traffic.
//! One browser process is kept alive across calls; every call opens and
//! closes its own page. When the process goes away the next call launches
//! a new one.

#[cfg(feature = "chromium")]
pub mod chromium;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use votewatch_core::{FetchError, UpstreamUnavailable, VoteResult};

use crate::traits::RawFetcher;

/// Default window for navigation plus the JSON response.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// A running browser process.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Whether the process is still reachable.
    fn is_connected(&self) -> bool;

    /// Open a page, navigate to `url` and return the first 2xx `.json`
    /// response it loads. The page is closed before returning.
    ///
    /// [`BrowserFetcher`] runs each call on its own task, so a dropped caller
    /// does not interrupt the page teardown.
    async fn capture_json(&self, url: &str, timeout: Duration) -> Result<Value, FetchError>;

    /// Terminate the process. Best effort, and must finish in bounded time.
    async fn close(&self);
}

/// Starts browser processes.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession + 'static;

    async fn launch(&self) -> Result<Self::Session, UpstreamUnavailable>;
}

/// [`RawFetcher`] that drives a shared, lazily (re)launched browser.
pub struct BrowserFetcher<L: BrowserLauncher> {
    launcher: L,
    session: Mutex<Option<Arc<L::Session>>>,
    timeout: Duration,
}

impl<L: BrowserLauncher> BrowserFetcher<L> {
    pub fn new(launcher: L) -> Self {
        Self::with_timeout(launcher, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(launcher: L, timeout: Duration) -> Self {
        Self {
            launcher,
            session: Mutex::new(None),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Return the live session, launching one if there is none or the
    /// current one has disconnected.
    ///
    /// The slot stays locked during a launch, so concurrent callers wait for
    /// the same new process instead of starting their own.
    pub async fn session(&self) -> Result<Arc<L::Session>, UpstreamUnavailable> {
        let mut slot = self.session.lock().await;

        if let Some(session) = slot.as_ref() {
            if session.is_connected() {
                return Ok(Arc::clone(session));
            }
        }

        if let Some(stale) = slot.take() {
            warn!("Browser disconnected, relaunching");
            // Torn down off the slot: a hung process must not stall the relaunch.
            tokio::spawn(async move { stale.close().await });
        }

        let started = Instant::now();
        let session = Arc::new(self.launcher.launch().await?);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Browser ready"
        );
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Whether a live session is currently held.
    pub async fn is_connected(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| s.is_connected())
    }
}

#[async_trait]
impl<L: BrowserLauncher> RawFetcher for BrowserFetcher<L> {
    async fn fetch(&self, url: &str) -> VoteResult<Value> {
        let session = self.session().await?;
        let started = Instant::now();

        let owned_url = url.to_string();
        let timeout = self.timeout;
        let capture =
            tokio::spawn(async move { session.capture_json(&owned_url, timeout).await });
        let outcome = match capture.await {
            Ok(outcome) => outcome,
            Err(e) => Err(FetchError::browser(url, e)),
        };

        match outcome {
            Ok(doc) => {
                debug!(
                    url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Captured upstream document"
                );
                Ok(doc)
            }
            Err(err) => {
                warn!(
                    url,
                    error = %err,
                    has_snapshot = err.page_snapshot.is_some(),
                    "Browser fetch failed"
                );
                Err(err.into())
            }
        }
    }

    fn kind(&self) -> &'static str {
        "browser"
    }

    async fn shutdown(&self) {
        if let Some(session) = self.session.lock().await.take() {
            info!("Closing browser");
            session.close().await;
        }
    }
}

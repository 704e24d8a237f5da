//! Chromium session driven over the DevTools protocol.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use votewatch_core::{FetchError, UpstreamUnavailable};

use super::{BrowserLauncher, BrowserSession, DEFAULT_FETCH_TIMEOUT};

/// Upper bound on grabbing the rendered page for a failure snapshot.
const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(2);

/// Grace period for a clean browser exit before the process is killed.
const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Whether a network response is the data file the page is waiting on.
pub fn is_json_response(url: &str, status: i64) -> bool {
    (200..300).contains(&status)
        && reqwest::Url::parse(url)
            .map(|parsed| parsed.path().ends_with(".json"))
            .unwrap_or(false)
}

/// Launches Chromium with the configured options.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    headless: bool,
    request_timeout: Duration,
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            request_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific browser binary instead of auto-detection.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Timeout for individual DevTools commands.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession, UpstreamUnavailable> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout);
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| UpstreamUnavailable::new(format!("Invalid browser configuration: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| UpstreamUnavailable::new(format!("Failed to launch browser: {}", e)))?;

        let connected = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&connected);
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                match event {
                    Ok(()) => {}
                    Err(CdpError::Ws(e)) => {
                        warn!(error = %e, "Browser connection lost");
                        break;
                    }
                    Err(e) => debug!(error = %e, "Browser handler error"),
                }
            }
            flag.store(false, Ordering::SeqCst);
        });

        info!(headless = self.headless, "Browser launched");
        Ok(ChromiumSession {
            browser: Mutex::new(browser),
            connected,
            handler_task,
        })
    }
}

/// A running Chromium process.
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    connected: Arc<AtomicBool>,
    handler_task: JoinHandle<()>,
}

impl ChromiumSession {
    async fn open_page(&self, url: &str) -> Result<Page, FetchError> {
        let browser = self.browser.lock().await;
        browser.new_page("about:blank").await.map_err(|e| {
            // A browser that cannot open pages is treated as gone.
            self.connected.store(false, Ordering::SeqCst);
            FetchError::browser(url, e)
        })
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.handler_task.is_finished()
    }

    async fn capture_json(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        let page = self.open_page(url).await?;

        let result = match capture(&page, url, timeout).await {
            Ok(doc) => Ok(doc),
            Err(err) => match tokio::time::timeout(SNAPSHOT_TIMEOUT, page.content()).await {
                Ok(Ok(html)) => Err(err.with_snapshot(html)),
                _ => Err(err),
            },
        };

        if let Err(e) = page.close().await {
            debug!(url, error = %e, "Failed to close page");
        }
        result
    }

    async fn close(&self) {
        let mut browser = self.browser.lock().await;
        let exited = tokio::time::timeout(EXIT_TIMEOUT, async {
            if let Err(e) = browser.close().await {
                debug!(error = %e, "Browser close command failed");
            }
            browser.wait().await
        })
        .await;

        match exited {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!(error = %e, "Waiting for browser exit failed"),
            Err(_) => {
                warn!("Browser did not exit, killing it");
                if let Some(Err(e)) = browser.kill().await {
                    debug!(error = %e, "Failed to kill browser");
                }
            }
        }
        self.handler_task.abort();
        self.connected.store(false, Ordering::SeqCst);
    }
}

async fn capture(page: &Page, url: &str, timeout: Duration) -> Result<Value, FetchError> {
    // Listeners go in before navigation so no early response is missed.
    let mut responses = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(|e| FetchError::browser(url, e))?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(|e| FetchError::browser(url, e))?;

    // Navigation and the response wait share one window: the data file may
    // arrive before `goto` settles, or `goto` may never settle at all.
    let body = tokio::time::timeout(timeout, async {
        let navigation = page.goto(url);
        tokio::pin!(navigation);
        let mut navigated = false;
        let mut pending: HashSet<RequestId> = HashSet::new();
        let mut loaded: HashSet<RequestId> = HashSet::new();
        loop {
            tokio::select! {
                result = &mut navigation, if !navigated => {
                    navigated = true;
                    if let Err(e) = result {
                        return Err(FetchError::navigation(url, e));
                    }
                }
                Some(event) = responses.next() => {
                    if !is_json_response(&event.response.url, event.response.status) {
                        continue;
                    }
                    debug!(url, data_url = %event.response.url, "Matched JSON response");
                    if loaded.contains(&event.request_id) {
                        return read_body(page, url, event.request_id.clone()).await;
                    }
                    pending.insert(event.request_id.clone());
                }
                Some(event) = finished.next() => {
                    if pending.contains(&event.request_id) {
                        return read_body(page, url, event.request_id.clone()).await;
                    }
                    loaded.insert(event.request_id.clone());
                }
                else => return Err(FetchError::browser(url, "page event streams closed")),
            }
        }
    })
    .await
    .map_err(|_| FetchError::timeout(url, timeout))??;

    serde_json::from_slice(&body).map_err(|e| FetchError::invalid_json(url, e))
}

async fn read_body(page: &Page, url: &str, request_id: RequestId) -> Result<Vec<u8>, FetchError> {
    let response = page
        .execute(GetResponseBodyParams::new(request_id))
        .await
        .map_err(|e| FetchError::browser(url, e))?;
    let body = &response.result;

    if body.base64_encoded {
        STANDARD
            .decode(body.body.as_bytes())
            .map_err(|e| FetchError::invalid_json(url, e))
    } else {
        Ok(body.body.clone().into_bytes())
    }
}

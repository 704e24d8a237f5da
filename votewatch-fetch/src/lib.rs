//! VoteWatch Fetch - Raw Upstream Documents
//!
//! The upstream results pages only surface their data endpoint after
//! client-side scripts run. [`BrowserFetcher`] drives a headless browser to
//! capture that response; [`HttpFetcher`] requests the document directly
//! where that is possible. [`CachedFetcher`] adds the raw-document cache on
//! top of either.

pub mod browser;
pub mod cached;
pub mod http;
pub mod traits;

pub use browser::{BrowserFetcher, BrowserLauncher, BrowserSession, DEFAULT_FETCH_TIMEOUT};
#[cfg(feature = "chromium")]
pub use browser::chromium::{is_json_response, ChromiumLauncher, ChromiumSession};
pub use cached::{CachedFetcher, DEFAULT_RAW_TTL};
pub use http::HttpFetcher;
pub use traits::RawFetcher;

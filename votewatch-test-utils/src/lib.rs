//! VoteWatch Test Utilities
//!
//! Shared test infrastructure for the VoteWatch workspace:
//! - Scripted fetchers and fake browsers
//! - Proptest generators for candidates and candidate lists
//! - Upstream document fixtures
//! - Assertions on VoteWatch results

pub use votewatch_core::{
    Candidate, Electorate, FetchError, FetchErrorKind, ScopeResult, UpstreamUnavailable,
    VoteError, VoteResult,
};
pub use votewatch_storage::ManualClock;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use votewatch_fetch::{BrowserLauncher, BrowserSession, RawFetcher};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// SCRIPTED FETCHER
// ============================================================================

#[derive(Debug, Clone)]
enum Scripted {
    Document(Value),
    Failure(FetchError),
    Unavailable(String),
}

/// [`RawFetcher`] answering from a per-URL script and counting calls.
///
/// URLs without a script fail with a navigation error.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    script: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
    shut_down: AtomicBool,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, url: impl Into<String>, doc: Value) -> Self {
        self.set_document(url, doc);
        self
    }

    pub fn with_error(self, url: impl Into<String>, err: FetchError) -> Self {
        self.set_error(url, err);
        self
    }

    /// Every fetch sleeps this long before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.delay) = Some(delay);
        self
    }

    pub fn set_document(&self, url: impl Into<String>, doc: Value) {
        lock(&self.script).insert(url.into(), Scripted::Document(doc));
    }

    pub fn set_error(&self, url: impl Into<String>, err: FetchError) {
        lock(&self.script).insert(url.into(), Scripted::Failure(err));
    }

    pub fn set_unavailable(&self, url: impl Into<String>, reason: impl Into<String>) {
        lock(&self.script).insert(url.into(), Scripted::Unavailable(reason.into()));
    }

    /// Number of fetches issued for `url`.
    pub fn calls(&self, url: &str) -> usize {
        lock(&self.calls).get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    pub fn was_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RawFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> VoteResult<Value> {
        *lock(&self.calls).entry(url.to_string()).or_insert(0) += 1;

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = lock(&self.script).get(url).cloned();
        match scripted {
            Some(Scripted::Document(doc)) => Ok(doc),
            Some(Scripted::Failure(err)) => Err(err.into()),
            Some(Scripted::Unavailable(reason)) => Err(UpstreamUnavailable::new(reason).into()),
            None => Err(FetchError::navigation(url, "no scripted response").into()),
        }
    }

    fn kind(&self) -> &'static str {
        "scripted"
    }

    async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// FAKE BROWSER
// ============================================================================

#[derive(Debug, Default)]
struct FakeBrowserState {
    documents: Mutex<HashMap<String, Value>>,
    launches: AtomicUsize,
    closes: AtomicUsize,
    pages_open: AtomicUsize,
    pages_opened: AtomicUsize,
    page_delay: Mutex<Option<Duration>>,
    fail_launch: AtomicBool,
    hang_on_close: AtomicBool,
    current: Mutex<Option<Arc<AtomicBool>>>,
}

/// In-memory [`BrowserLauncher`] whose sessions can be disconnected on demand.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// fetcher.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    state: Arc<FakeBrowserState>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, url: impl Into<String>, doc: Value) -> Self {
        lock(&self.state.documents).insert(url.into(), doc);
        self
    }

    /// Simulate the browser process going away.
    pub fn disconnect(&self) {
        if let Some(flag) = lock(&self.state.current).as_ref() {
            flag.store(false, Ordering::SeqCst);
        }
    }

    pub fn set_fail_launch(&self, fail: bool) {
        self.state.fail_launch.store(fail, Ordering::SeqCst);
    }

    /// Pages stay open this long before answering, bounded by the caller's
    /// timeout.
    pub fn set_page_delay(&self, delay: Duration) {
        *lock(&self.state.page_delay) = Some(delay);
    }

    /// Make `close` on every session never complete, like a wedged process.
    pub fn set_hang_on_close(&self, hang: bool) {
        self.state.hang_on_close.store(hang, Ordering::SeqCst);
    }

    pub fn launches(&self) -> usize {
        self.state.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Pages opened and not yet closed.
    pub fn pages_open(&self) -> usize {
        self.state.pages_open.load(Ordering::SeqCst)
    }

    /// Pages opened over the launcher's lifetime.
    pub fn pages_opened(&self) -> usize {
        self.state.pages_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self) -> Result<FakeSession, UpstreamUnavailable> {
        if self.state.fail_launch.load(Ordering::SeqCst) {
            return Err(UpstreamUnavailable::new("browser executable not found"));
        }
        self.state.launches.fetch_add(1, Ordering::SeqCst);

        let connected = Arc::new(AtomicBool::new(true));
        *lock(&self.state.current) = Some(Arc::clone(&connected));
        Ok(FakeSession {
            state: Arc::clone(&self.state),
            connected,
        })
    }
}

/// Session produced by [`FakeLauncher`].
#[derive(Debug)]
pub struct FakeSession {
    state: Arc<FakeBrowserState>,
    connected: Arc<AtomicBool>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn capture_json(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        if !self.is_connected() {
            return Err(FetchError::browser(url, "Target closed"));
        }

        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        self.state.pages_open.fetch_add(1, Ordering::SeqCst);
        let result = self.load(url, timeout).await;
        self.state.pages_open.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn close(&self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        if self.state.hang_on_close.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl FakeSession {
    async fn load(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        let loading = || {
            FetchError::timeout(url, timeout).with_snapshot("<html><body>Loading...</body></html>")
        };

        let delay = *lock(&self.state.page_delay);
        if let Some(delay) = delay {
            tokio::time::timeout(timeout, tokio::time::sleep(delay))
                .await
                .map_err(|_| loading())?;
        }
        lock(&self.state.documents).get(url).cloned().ok_or_else(loading)
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for candidates and candidate lists.

    use super::*;
    use proptest::prelude::*;

    /// Ids drawn from a small pool so generated lists overlap.
    pub fn arb_candidate_id() -> impl Strategy<Value = String> {
        "[A-H]"
    }

    pub fn arb_votes() -> impl Strategy<Value = u64> {
        0u64..1_000_000
    }

    pub fn arb_candidate() -> impl Strategy<Value = Candidate> {
        (
            arb_candidate_id(),
            "[a-z]{3,10}",
            proptest::option::of("[A-Z]{2,4}"),
            arb_votes(),
        )
            .prop_map(|(id, name, party, votes)| Candidate {
                id,
                name,
                party,
                votes,
            })
    }

    /// A raw candidate list as upstream might publish it, duplicates included.
    pub fn arb_candidate_list() -> impl Strategy<Value = Vec<Candidate>> {
        prop::collection::vec(arb_candidate(), 0..12)
    }

    /// A valid list with unique ids.
    pub fn arb_scope_result() -> impl Strategy<Value = ScopeResult> {
        arb_candidate_list().prop_map(|candidates| ScopeResult::dedup_first(candidates).0)
    }

    /// Diaspora regions as `(region code, raw list)` pairs with unique codes.
    pub fn arb_regions() -> impl Strategy<Value = Vec<(String, Vec<Candidate>)>> {
        prop::collection::btree_map("[A-Z]{2}", arb_candidate_list(), 0..6)
            .prop_map(|regions| regions.into_iter().collect())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Upstream documents and common scenarios.

    use super::*;
    use serde_json::{json, Map};

    pub const ROMANIA_URL: &str = "https://results.test/romania/data/results.json";
    pub const DIASPORA_URL: &str = "https://results.test/diaspora/data/results.json";

    /// Candidate named after its id, with no party.
    pub fn candidate(id: &str, votes: u64) -> Candidate {
        Candidate::new(id, format!("Candidate {}", id), votes)
    }

    /// Upstream wire form of a candidate.
    pub fn upstream_candidate(candidate: &Candidate) -> Value {
        json!({
            "id": candidate.id,
            "candidate": candidate.name,
            "party": candidate.party,
            "votes": candidate.votes,
        })
    }

    fn presidential(candidates: &[Candidate]) -> Value {
        let list: Vec<Value> = candidates.iter().map(upstream_candidate).collect();
        json!({ "PRSD": { "candidates": list } })
    }

    /// Domestic results document.
    pub fn romania_doc(candidates: &[Candidate]) -> Value {
        json!({ "scopes": { "CNTRY": presidential(candidates) } })
    }

    /// Diaspora results document with one sub-scope per region.
    pub fn diaspora_doc<S: AsRef<str>>(regions: &[(S, Vec<Candidate>)]) -> Value {
        let mut country = Map::new();
        for (code, candidates) in regions {
            country.insert(code.as_ref().to_string(), presidential(candidates));
        }
        json!({ "scopes": { "CNTRY": Value::Object(country) } })
    }

    /// Romania `[A:100, B:50]`, diaspora regions `[A:5]` and `[A:3, C:2]`.
    pub fn end_to_end_docs() -> (Value, Value) {
        let romania = romania_doc(&[candidate("A", 100), candidate("B", 50)]);
        let diaspora = diaspora_doc(&[
            ("US", vec![candidate("A", 5)]),
            ("UK", vec![candidate("A", 3), candidate("C", 2)]),
        ]);
        (romania, diaspora)
    }

    /// Fetcher serving [`end_to_end_docs`] at [`ROMANIA_URL`] and [`DIASPORA_URL`].
    pub fn end_to_end_fetcher() -> ScriptedFetcher {
        let (romania, diaspora) = end_to_end_docs();
        ScriptedFetcher::new()
            .with_document(ROMANIA_URL, romania)
            .with_document(DIASPORA_URL, diaspora)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on VoteWatch results.

    use super::*;

    /// Assert that a VoteResult is a Fetch error.
    #[track_caller]
    pub fn assert_fetch_error<T: std::fmt::Debug>(result: &VoteResult<T>) {
        match result {
            Err(VoteError::Fetch(_)) => {}
            other => panic!("Expected Fetch error, got: {:?}", other),
        }
    }

    /// Assert that a VoteResult is a Fetch timeout.
    #[track_caller]
    pub fn assert_fetch_timeout<T: std::fmt::Debug>(result: &VoteResult<T>) {
        match result {
            Err(VoteError::Fetch(err)) if err.is_timeout() => {}
            other => panic!("Expected Fetch timeout, got: {:?}", other),
        }
    }

    /// Assert that a VoteResult is an UpstreamUnavailable error.
    #[track_caller]
    pub fn assert_upstream_unavailable<T: std::fmt::Debug>(result: &VoteResult<T>) {
        match result {
            Err(VoteError::UpstreamUnavailable(_)) => {}
            other => panic!("Expected UpstreamUnavailable error, got: {:?}", other),
        }
    }

    /// Assert that a VoteResult is an Aggregation error.
    #[track_caller]
    pub fn assert_aggregation_error<T: std::fmt::Debug>(result: &VoteResult<T>) {
        match result {
            Err(VoteError::Aggregation(_)) => {}
            other => panic!("Expected Aggregation error, got: {:?}", other),
        }
    }

    /// Assert a list holds exactly these `(id, votes)` pairs, in order.
    #[track_caller]
    pub fn assert_votes(result: &ScopeResult, expected: &[(&str, u64)]) {
        let actual: Vec<(&str, u64)> = result.iter().map(|c| (c.id.as_str(), c.votes)).collect();
        assert_eq!(actual, expected, "Unexpected candidate votes");
    }

    /// Assert no id appears twice.
    #[track_caller]
    pub fn assert_unique_ids(result: &ScopeResult) {
        let mut seen = std::collections::HashSet::new();
        for id in result.ids() {
            assert!(seen.insert(id), "Duplicate candidate id {:?}", id);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! BrowserFetcher lifecycle against a fake browser.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use votewatch_fetch::{BrowserFetcher, RawFetcher};
use votewatch_test_utils::assertions::{assert_fetch_timeout, assert_upstream_unavailable};
use votewatch_test_utils::{FakeLauncher, FetchError, VoteError};

const URL: &str = "https://results.test/romania/data/results.json";
const MISSING_URL: &str = "https://results.test/empty";

fn fetcher() -> (FakeLauncher, BrowserFetcher<FakeLauncher>) {
    fetcher_with_timeout(Duration::from_secs(1))
}

fn fetcher_with_timeout(timeout: Duration) -> (FakeLauncher, BrowserFetcher<FakeLauncher>) {
    let launcher = FakeLauncher::new().with_document(URL, json!({ "scopes": {} }));
    let fetcher = BrowserFetcher::with_timeout(launcher.clone(), timeout);
    (launcher, fetcher)
}

/// Wait for background teardown to reach `condition`.
async fn eventually(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test]
async fn test_browser_launched_lazily_and_reused() {
    let (launcher, fetcher) = fetcher();
    assert_eq!(launcher.launches(), 0);
    assert!(!fetcher.is_connected().await);

    fetcher.fetch(URL).await.unwrap();
    fetcher.fetch(URL).await.unwrap();

    assert_eq!(launcher.launches(), 1);
    assert!(fetcher.is_connected().await);
    assert_eq!(launcher.pages_open(), 0);
}

#[tokio::test]
async fn test_relaunch_after_disconnect() {
    let (launcher, fetcher) = fetcher();
    fetcher.fetch(URL).await.unwrap();

    launcher.disconnect();
    let doc = fetcher.fetch(URL).await.unwrap();

    assert_eq!(doc, json!({ "scopes": {} }));
    assert_eq!(launcher.launches(), 2);
    eventually("stale session close", || launcher.closes() == 1).await;
}

#[tokio::test]
async fn test_hung_browser_does_not_block_relaunch() {
    let (launcher, fetcher) = fetcher();
    launcher.set_hang_on_close(true);
    fetcher.fetch(URL).await.unwrap();

    launcher.disconnect();
    let doc = tokio::time::timeout(Duration::from_secs(2), fetcher.fetch(URL))
        .await
        .expect("relaunch waited on the stale browser")
        .unwrap();

    assert_eq!(doc, json!({ "scopes": {} }));
    assert_eq!(launcher.launches(), 2);
    assert!(fetcher.is_connected().await);
    eventually("stale session close", || launcher.closes() == 1).await;
}

#[tokio::test]
async fn test_launch_failure_is_upstream_unavailable() {
    let (launcher, fetcher) = fetcher();
    launcher.set_fail_launch(true);

    let result = fetcher.fetch(URL).await;
    assert_upstream_unavailable(&result);

    launcher.set_fail_launch(false);
    assert!(fetcher.fetch(URL).await.is_ok());
    assert_eq!(launcher.launches(), 1);
}

#[tokio::test]
async fn test_missing_json_response_times_out_with_snapshot() {
    let (_launcher, fetcher) = fetcher();

    let result = fetcher.fetch(MISSING_URL).await;
    assert_fetch_timeout(&result);
    match result {
        Err(VoteError::Fetch(err)) => {
            assert_eq!(err.url, MISSING_URL);
            assert!(err.page_snapshot.is_some());
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_page_closed_after_failure() {
    let (launcher, fetcher) = fetcher();

    assert!(fetcher.fetch(MISSING_URL).await.is_err());

    assert_eq!(launcher.pages_opened(), 1);
    assert_eq!(launcher.pages_open(), 0);
}

#[tokio::test]
async fn test_page_closed_after_timeout() {
    let (launcher, fetcher) = fetcher_with_timeout(Duration::from_millis(50));
    launcher.set_page_delay(Duration::from_millis(500));

    let result = fetcher.fetch(URL).await;

    assert_fetch_timeout(&result);
    assert_eq!(launcher.pages_opened(), 1);
    assert_eq!(launcher.pages_open(), 0);
}

#[tokio::test]
async fn test_page_closed_when_caller_is_dropped() {
    let (launcher, fetcher) = fetcher();
    launcher.set_page_delay(Duration::from_millis(200));

    let abandoned = tokio::time::timeout(Duration::from_millis(20), fetcher.fetch(URL)).await;
    assert!(abandoned.is_err());
    assert_eq!(launcher.pages_opened(), 1);

    eventually("abandoned page to close", || launcher.pages_open() == 0).await;
}

#[tokio::test]
async fn test_sibling_failure_does_not_leak_page() {
    let (launcher, fetcher) = fetcher();
    launcher.set_page_delay(Duration::from_millis(200));

    let joined = tokio::try_join!(fetcher.fetch(URL), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Err::<(), VoteError>(FetchError::status(MISSING_URL, 503).into())
    });
    assert!(joined.is_err());
    assert_eq!(launcher.pages_opened(), 1);

    eventually("in-flight page to close", || launcher.pages_open() == 0).await;
}

#[tokio::test]
async fn test_concurrent_fetches_share_one_launch() {
    let (launcher, fetcher) = fetcher();
    let fetcher = Arc::new(fetcher);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.fetch(URL).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(launcher.launches(), 1);
}

#[tokio::test]
async fn test_shutdown_closes_browser() {
    let (launcher, fetcher) = fetcher();
    fetcher.fetch(URL).await.unwrap();

    fetcher.shutdown().await;

    assert_eq!(launcher.closes(), 1);
    assert!(!fetcher.is_connected().await);
    assert_eq!(fetcher.kind(), "browser");
}

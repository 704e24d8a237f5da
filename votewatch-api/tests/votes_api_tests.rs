//! End-to-end tests of the HTTP surface against scripted upstreams.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use votewatch_api::{
    create_api_router, ApiConfig, AppState, ServiceConfig, VotesResponse, VotesService,
};
use votewatch_core::{ListKey, ScopeResult};
use votewatch_test_utils::assertions::{assert_aggregation_error, assert_votes};
use votewatch_test_utils::fixtures::{
    candidate, end_to_end_docs, end_to_end_fetcher, DIASPORA_URL, ROMANIA_URL,
};
use votewatch_test_utils::{FetchError, ManualClock, ScriptedFetcher};

const DERIVED_TTL: Duration = Duration::from_secs(30);
const RAW_TTL: Duration = Duration::from_secs(15);

struct Harness {
    fetcher: Arc<ScriptedFetcher>,
    clock: ManualClock,
    service: Arc<VotesService>,
    app: Router,
}

fn harness(fetcher: ScriptedFetcher) -> Harness {
    let fetcher = Arc::new(fetcher);
    let clock = ManualClock::new();
    let config = ServiceConfig {
        romania_url: ROMANIA_URL.to_string(),
        diaspora_url: DIASPORA_URL.to_string(),
        raw_cache_ttl: RAW_TTL,
        derived_cache_ttl: DERIVED_TTL,
    };
    let service = Arc::new(VotesService::with_clock(
        fetcher.clone(),
        config,
        clock.clone(),
    ));
    let app = create_api_router(AppState::new(Arc::clone(&service)), &ApiConfig::default());
    Harness {
        fetcher,
        clock,
        service,
        app,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_votes_end_to_end() {
    let h = harness(end_to_end_fetcher());

    let (status, body) = get(&h.app, "/votes").await;
    assert_eq!(status, StatusCode::OK);

    let votes: VotesResponse = serde_json::from_value(body.clone()).unwrap();
    assert_votes(&votes.romania, &[("A", 100), ("B", 50)]);
    assert_votes(&votes.combined, &[("A", 108), ("B", 50), ("C", 2)]);
    assert_eq!(votes.diaspora.len(), 2);
    assert_eq!(votes.diaspora.votes("A"), 8);
    assert_eq!(votes.diaspora.votes("C"), 2);

    assert_eq!(
        body["romania"][0],
        json!({ "id": "A", "candidate": "Candidate A", "party": null, "votes": 100 })
    );
}

#[tokio::test]
async fn test_votes_served_from_cache_within_ttl() {
    let h = harness(end_to_end_fetcher());

    get(&h.app, "/votes").await;
    h.clock.advance(DERIVED_TTL - Duration::from_millis(1));
    let (status, _) = get(&h.app, "/votes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.fetcher.calls(ROMANIA_URL), 1);
    assert_eq!(h.fetcher.calls(DIASPORA_URL), 1);

    h.clock.advance(Duration::from_millis(1));
    get(&h.app, "/votes").await;
    assert_eq!(h.fetcher.calls(ROMANIA_URL), 2);
}

#[tokio::test]
async fn test_diaspora_timeout_returns_bad_gateway() {
    let (romania, diaspora) = end_to_end_docs();
    let fetcher = ScriptedFetcher::new()
        .with_document(ROMANIA_URL, romania)
        .with_error(
            DIASPORA_URL,
            FetchError::timeout(DIASPORA_URL, Duration::from_secs(15)),
        );
    let h = harness(fetcher);

    let (status, body) = get(&h.app, "/votes").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains(DIASPORA_URL));
    assert_eq!(body.as_object().unwrap().len(), 1);

    // The failed electorate and the combined view are not cached.
    assert!(h.service.cached(ListKey::Diaspora).is_none());
    assert!(h.service.cached(ListKey::Combined).is_none());

    // Recovery goes straight back to the upstream.
    h.fetcher.set_document(DIASPORA_URL, diaspora);
    let (status, body) = get(&h.app, "/votes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["combined"][0]["votes"], 108);
    assert_eq!(h.fetcher.calls(DIASPORA_URL), 2);
}

#[tokio::test]
async fn test_malformed_upstream_returns_bad_gateway() {
    let (_, diaspora) = end_to_end_docs();
    let fetcher = ScriptedFetcher::new()
        .with_document(ROMANIA_URL, json!({ "scopes": { "CNTRY": {} } }))
        .with_document(DIASPORA_URL, diaspora);
    let h = harness(fetcher);

    let (status, body) = get(&h.app, "/votes").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("scopes.CNTRY.PRSD"));
    assert!(h.service.cached(ListKey::Romania).is_none());
    assert_aggregation_error(&h.service.romania().await);
}

#[tokio::test]
async fn test_browser_unavailable_returns_bad_gateway() {
    let fetcher = end_to_end_fetcher();
    fetcher.set_unavailable(ROMANIA_URL, "browser executable not found");
    let h = harness(fetcher);

    let (status, body) = get(&h.app, "/votes").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("browser executable not found"));
}

#[tokio::test]
async fn test_combined_view_is_stable_within_ttl() {
    let h = harness(end_to_end_fetcher());

    let first_inputs: ScopeResult = vec![candidate("A", 1)].into_iter().collect();
    let other_inputs: ScopeResult = vec![candidate("Z", 9)].into_iter().collect();

    let first = h.service.combined(&first_inputs, &ScopeResult::new());
    let second = h.service.combined(&other_inputs, &other_inputs);
    assert!(Arc::ptr_eq(&first, &second));
    assert_votes(&second, &[("A", 1)]);

    h.clock.advance(DERIVED_TTL);
    let third = h.service.combined(&other_inputs, &other_inputs);
    assert_votes(&third, &[("Z", 18)]);
}

#[tokio::test]
async fn test_raw_passthrough() {
    let h = harness(end_to_end_fetcher());
    let (romania, diaspora) = end_to_end_docs();

    let (status, body) = get(&h.app, "/raw/romania").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, romania);

    let (status, body) = get(&h.app, "/raw/diaspora").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, diaspora);

    // Served from the raw cache on repeat, and shared with /votes.
    get(&h.app, "/raw/romania").await;
    get(&h.app, "/votes").await;
    assert_eq!(h.fetcher.calls(ROMANIA_URL), 1);
}

#[tokio::test]
async fn test_raw_passthrough_failure() {
    let h = harness(ScriptedFetcher::new().with_error(
        ROMANIA_URL,
        FetchError::status(ROMANIA_URL, 503),
    ));

    let (status, body) = get(&h.app, "/raw/romania").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let h = harness(end_to_end_fetcher());

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/health/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"pong");

    let (status, body) = get(&h.app, "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    get(&h.app, "/votes").await;
    get(&h.app, "/votes").await;
    let (status, body) = get(&h.app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["fetcher"], "scripted");
    assert_eq!(body["caches"]["raw"]["entries"], 2);
    assert_eq!(body["caches"]["derived"]["entries"], 3);
    assert!(body["caches"]["derived"]["hits"].as_u64().unwrap() >= 3);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let h = harness(end_to_end_fetcher());
    get(&h.app, "/votes").await;

    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("votewatch_upstream_fetches_total"));
    assert!(text.contains("votewatch_cache_lookups_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let h = harness(end_to_end_fetcher());
    let (status, _) = get(&h.app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// tests/metrics.rs
//
// The Prometheus recorder is process-global, so this suite lives in its own
// test binary and installs it once.

mod common;

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt as _;

use common::{service, CountingSource, FailingSource};
use news_credibility_analyzer::config::PipelineSettings;
use news_credibility_analyzer::metrics::Metrics;

async fn scrape(m: &Metrics) -> String {
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .expect("build GET /metrics");
    let resp = m.router().oneshot(req).await.expect("oneshot /metrics");
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn pipeline_outcomes_and_search_errors_are_exported() {
    let m = Metrics::init(&PipelineSettings::default()).expect("recorder");
    // a second init reuses the installed recorder
    let again = Metrics::init(&PipelineSettings::default()).expect("recorder reuse");

    service(Arc::new(FailingSource), None)
        .deep_analyze("City council approves transit budget")
        .await
        .unwrap();
    service(Arc::new(CountingSource::new(Vec::new())), None)
        .deep_analyze("City council approves transit budget")
        .await
        .unwrap();

    let text = scrape(&again).await;
    assert!(text.contains("pipeline_deep_total"), "{text}");
    assert!(text.contains("outcome=\"upstream_unavailable\""));
    assert!(text.contains("outcome=\"no_sources\""));
    assert!(text.contains("ingest_search_errors_total"));
    assert!(text.contains("geo_cache_ttl_secs"));
    assert!(!scrape(&m).await.is_empty());
}

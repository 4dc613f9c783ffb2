mod utils;
#[allow(unused)]
use utils::*;

use fanbench::{
    Aggregator, HttpFacetSource, PooledAggregator, ReactiveAggregator, ScopedAggregator,
    WorkerPool,
};
use fanbench_core::BenchError;
use mock_service::MockConfig;
use std::sync::Arc;
use std::time::Duration;

fn all_strategies(
    source: Arc<HttpFacetSource>,
    pool: Arc<WorkerPool>,
) -> Vec<Arc<dyn Aggregator>> {
    vec![
        Arc::new(PooledAggregator::new(Arc::clone(&source), pool)),
        Arc::new(ReactiveAggregator::new(Arc::clone(&source))),
        Arc::new(ScopedAggregator::new(source)),
    ]
}

#[tokio::test(flavor = "multi_thread")]
async fn strategies_agree_over_http() {
    let base_url = spawn_mock(MockConfig::instant()).await;
    let source = Arc::new(HttpFacetSource::new(&base_url));
    let pool = Arc::new(WorkerPool::new(2));

    let mut records = Vec::new();
    for strategy in all_strategies(source, Arc::clone(&pool)) {
        let record = strategy
            .aggregate(7)
            .await
            .unwrap_or_else(|err| panic!("{} failed: {err}", strategy.name()));
        records.push(record);
    }

    assert_eq!(records[0], records[1]);
    assert_eq!(records[1], records[2]);
    assert_eq!(records[0].product_id, 7);
    assert_eq!(records[0].stock_count, 259);

    pool.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn one_failing_facet_fails_every_strategy() {
    let mut config = MockConfig::instant();
    config.fail_pricing.insert(42);
    let base_url = spawn_mock(config).await;

    let source = Arc::new(HttpFacetSource::new(&base_url));
    let pool = Arc::new(WorkerPool::new(2));

    for strategy in all_strategies(source, Arc::clone(&pool)) {
        let err = strategy
            .aggregate(42)
            .await
            .expect_err(strategy.name());
        match err {
            BenchError::PartialFailure { facet, .. } => assert_eq!(facet, "pricing"),
            other => panic!("{}: unexpected error {other}", strategy.name()),
        }

        // Untargeted ids keep working.
        assert!(strategy.aggregate(43).await.is_ok(), "{}", strategy.name());
    }

    pool.shutdown();
}

#[tokio::test(flavor = "multi_thread")]
async fn health_probe_reports_readiness() {
    let base_url = spawn_mock(MockConfig::default()).await;
    fanbench::wait_until_healthy(&base_url, Duration::from_secs(2))
        .await
        .expect("spawned service never became healthy");

    // Nothing listens here; the probe gives up at the deadline.
    let err = fanbench::wait_until_healthy("http://127.0.0.1:1", Duration::from_millis(200))
        .await
        .expect_err("probe against a closed port");
    assert!(matches!(err, BenchError::CallFailure(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_can_be_injected_at_runtime() {
    let base_url = spawn_mock(MockConfig::instant()).await;
    let source = Arc::new(HttpFacetSource::new(&base_url));
    let strategy = ReactiveAggregator::new(Arc::clone(&source));

    assert!(strategy.aggregate(9).await.is_ok());

    let client = reqwest::Client::new();
    let status = client
        .post(format!("{base_url}/api/config/fail/reviews/9"))
        .send()
        .await
        .expect("config call failed")
        .status();
    assert!(status.is_success());

    match strategy.aggregate(9).await {
        Err(BenchError::PartialFailure { facet, .. }) => assert_eq!(facet, "reviews"),
        other => panic!("expected reviews failure, got {other:?}"),
    }
}

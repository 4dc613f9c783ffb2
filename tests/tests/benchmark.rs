mod utils;
#[allow(unused)]
use utils::*;

use fanbench::{BenchmarkRunner, RunOptions, ScenarioSelection};
use fanbench_core::ScenarioConfig;
use mock_service::MockConfig;

#[tokio::test(flavor = "multi_thread")]
async fn full_comparison_run_against_the_mock() {
    let base_url = spawn_mock(MockConfig::instant()).await;

    let runner = BenchmarkRunner::new(RunOptions {
        config: ScenarioConfig::new(60, 8),
        selection: ScenarioSelection::All,
        base_url,
        pool_size: 4,
        seed: true,
        seed_count: 10,
    });

    let results = runner.run().await.expect("comparison run failed");

    // Three systems times two scenarios.
    assert_eq!(results.len(), 6);

    for result in &results {
        assert!(result.operations_per_second > 0.0, "{}", result.scenario);
        assert!(result.p50_latency <= result.p95_latency);
        assert!(result.p95_latency <= result.p99_latency);
        assert!(result.peak_concurrency >= 1);
        assert!(result.peak_concurrency <= 8);

        if result.scenario.starts_with("aggregation") {
            // Facet payloads are deterministic, so nothing should fail.
            assert_eq!(result.completed_operations, 60);
            assert_eq!(result.failed_operations(), 0);
        } else {
            // Reads of unseeded ids 404 and count as failures.
            assert_eq!(
                result.completed_operations + result.failed_operations(),
                60
            );
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn aggregation_only_selection_skips_db() {
    let base_url = spawn_mock(MockConfig::instant()).await;

    let runner = BenchmarkRunner::new(RunOptions {
        config: ScenarioConfig::new(30, 4),
        selection: ScenarioSelection::Aggregation,
        base_url,
        pool_size: 2,
        seed: false,
        seed_count: 0,
    });

    let results = runner.run().await.expect("run failed");
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.scenario.starts_with("aggregation")));
}

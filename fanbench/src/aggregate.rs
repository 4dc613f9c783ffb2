//! Fan-out aggregation: one contract, three scheduling strategies.
//!
//! Every strategy issues the same three independent downstream calls for an
//! entity and combines them into one [`AggregateRecord`], or fails the whole
//! operation. From the caller's point of view the strategies are equivalent;
//! only the scheduling (and sibling-cancellation) mechanics differ.

mod pool;
mod reactive;
mod scoped;

pub use pool::{PooledAggregator, WorkerPool};
pub use reactive::ReactiveAggregator;
pub use scoped::ScopedAggregator;

use async_trait::async_trait;
use fanbench_core::{
    AggregateRecord, BenchError, InventoryResponse, PricingResponse, ReviewsResponse,
};

/// Read side of the three downstream facets. Implementations pick the
/// transport: HTTP against the mock service in the harness, stubs in tests.
#[async_trait]
pub trait FacetSource: Send + Sync + 'static {
    async fn inventory(&self, product_id: u64) -> Result<InventoryResponse, BenchError>;
    async fn pricing(&self, product_id: u64) -> Result<PricingResponse, BenchError>;
    async fn reviews(&self, product_id: u64) -> Result<ReviewsResponse, BenchError>;
}

/// Shared contract for the three concurrency strategies.
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Issues the three facet calls concurrently and combines the results.
    ///
    /// Fails with [`BenchError::PartialFailure`] if any facet call fails and
    /// with [`BenchError::Timeout`] if the slowest call does not complete
    /// within the operation bound. On success the record carries all six
    /// facet fields; no strategy substitutes defaults for a failed facet.
    async fn aggregate(&self, product_id: u64) -> Result<AggregateRecord, BenchError>;

    /// Whether a failing facet call cancels its in-flight siblings.
    ///
    /// Pooled futures run to completion regardless; reactive and scoped
    /// fan-outs cancel best-effort. Callers may only rely on the combined
    /// result, never on cancellation mechanics.
    fn cancels_siblings(&self) -> bool;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Deterministic in-process facet source with per-facet failure
    /// injection and a call counter per facet.
    #[derive(Default)]
    struct StubSource {
        fail_inventory: HashSet<u64>,
        fail_pricing: HashSet<u64>,
        fail_reviews: HashSet<u64>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn failing_pricing(ids: &[u64]) -> Self {
            Self {
                fail_pricing: ids.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FacetSource for StubSource {
        async fn inventory(&self, product_id: u64) -> Result<InventoryResponse, BenchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail_inventory.contains(&product_id) {
                return Err(BenchError::CallFailure("injected".into()));
            }
            Ok(InventoryResponse {
                product_id,
                stock_count: (product_id * 37 % 1000) as u32,
                warehouse_location: format!("Warehouse-{product_id}"),
            })
        }

        async fn pricing(&self, product_id: u64) -> Result<PricingResponse, BenchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail_pricing.contains(&product_id) {
                return Err(BenchError::CallFailure("injected".into()));
            }
            Ok(PricingResponse {
                product_id,
                current_price: product_id as f64 * 1.5,
                discount_percent: (product_id % 30) as f64,
            })
        }

        async fn reviews(&self, product_id: u64) -> Result<ReviewsResponse, BenchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail_reviews.contains(&product_id) {
                return Err(BenchError::CallFailure("injected".into()));
            }
            Ok(ReviewsResponse {
                product_id,
                average_rating: 1.0 + (product_id % 40) as f64 / 10.0,
                review_count: (product_id * 13 % 5000) as u32,
            })
        }
    }

    fn strategies(source: Arc<StubSource>) -> Vec<Box<dyn Aggregator>> {
        let pool = Arc::new(WorkerPool::new(4));
        vec![
            Box::new(PooledAggregator::new(Arc::clone(&source), pool)),
            Box::new(ReactiveAggregator::new(Arc::clone(&source))),
            Box::new(ScopedAggregator::new(source)),
        ]
    }

    #[tokio::test]
    async fn all_strategies_build_the_same_record() {
        let source = Arc::new(StubSource::default());
        let mut records = Vec::new();
        for strategy in strategies(Arc::clone(&source)) {
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
    }

    #[tokio::test]
    async fn one_failed_facet_fails_every_strategy() {
        let source = Arc::new(StubSource::failing_pricing(&[42]));
        for strategy in strategies(Arc::clone(&source)) {
            let err = strategy
                .aggregate(42)
                .await
                .expect_err(strategy.name());
            assert!(
                matches!(err, BenchError::PartialFailure { facet: "pricing", .. }),
                "{}: unexpected error {err:?}",
                strategy.name()
            );

            // A different entity on the same strategy still succeeds whole.
            let record = strategy.aggregate(43).await.unwrap();
            assert_eq!(record.product_id, 43);
        }
    }

    #[tokio::test]
    async fn pooled_siblings_run_to_completion_on_failure() {
        let source = Arc::new(StubSource::failing_pricing(&[42]));
        let pool = Arc::new(WorkerPool::new(4));
        let pooled = PooledAggregator::new(Arc::clone(&source), pool);

        let err = pooled.aggregate(42).await.expect_err("pooled");
        assert!(matches!(err, BenchError::PartialFailure { .. }));
        // join (not try_join): all three facet calls were issued and ran.
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn capability_flags_document_the_asymmetry() {
        let source = Arc::new(StubSource::default());
        let flags: Vec<_> = strategies(source)
            .iter()
            .map(|s| (s.name(), s.cancels_siblings()))
            .collect();
        assert_eq!(
            flags,
            vec![("pooled", false), ("reactive", true), ("scoped", true)]
        );
    }

    #[tokio::test]
    async fn pool_handles_many_concurrent_aggregations() {
        let source = Arc::new(StubSource {
            delay: Duration::from_millis(2),
            ..StubSource::default()
        });
        let pool = Arc::new(WorkerPool::new(2));
        let pooled = Arc::new(PooledAggregator::new(Arc::clone(&source), pool));

        // More aggregations than workers: work queues, nothing deadlocks.
        let mut handles = Vec::new();
        for id in 1..=20 {
            let pooled = Arc::clone(&pooled);
            handles.push(tokio::spawn(async move { pooled.aggregate(id).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(source.calls(), 60);
    }
}

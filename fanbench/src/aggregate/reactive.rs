use super::{Aggregator, FacetSource};
use async_trait::async_trait;
use fanbench_core::constants::OPERATION_TIMEOUT;
use fanbench_core::{AggregateRecord, BenchError};
use std::sync::Arc;

/// Strategy B: non-blocking reactive composition.
///
/// The three facet futures are polled concurrently on the caller's own task;
/// no carrier thread blocks. The first error resolves the join and drops the
/// in-flight siblings. Cancellation is advisory: a request already on the
/// wire is not recalled.
pub struct ReactiveAggregator<S> {
    source: Arc<S>,
}

impl<S: FacetSource> ReactiveAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: FacetSource> Aggregator for ReactiveAggregator<S> {
    async fn aggregate(&self, product_id: u64) -> Result<AggregateRecord, BenchError> {
        let source = &self.source;
        let joined = async {
            futures::try_join!(
                async {
                    source
                        .inventory(product_id)
                        .await
                        .map_err(|e| BenchError::partial("inventory", e))
                },
                async {
                    source
                        .pricing(product_id)
                        .await
                        .map_err(|e| BenchError::partial("pricing", e))
                },
                async {
                    source
                        .reviews(product_id)
                        .await
                        .map_err(|e| BenchError::partial("reviews", e))
                },
            )
        };

        let (inventory, pricing, reviews) = tokio::time::timeout(OPERATION_TIMEOUT, joined)
            .await
            .map_err(|_| BenchError::Timeout)??;

        Ok(AggregateRecord::combine(
            product_id, inventory, pricing, reviews,
        ))
    }

    fn cancels_siblings(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "reactive"
    }
}

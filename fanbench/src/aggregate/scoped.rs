use super::{Aggregator, FacetSource};
use async_trait::async_trait;
use fanbench_core::constants::OPERATION_TIMEOUT;
use fanbench_core::{
    AggregateRecord, BenchError, InventoryResponse, PricingResponse, ReviewsResponse,
};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Strategy C: structured cooperative fan-out.
///
/// Three tasks are forked into one scope; joining the scope waits for all of
/// them. The first task failure aborts the remaining siblings and
/// propagates. Tasks are cheap enough that one per facet call needs no
/// shared pool sizing.
pub struct ScopedAggregator<S> {
    source: Arc<S>,
}

impl<S: FacetSource> ScopedAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }
}

enum Facet {
    Inventory(InventoryResponse),
    Pricing(PricingResponse),
    Reviews(ReviewsResponse),
}

#[async_trait]
impl<S: FacetSource> Aggregator for ScopedAggregator<S> {
    async fn aggregate(&self, product_id: u64) -> Result<AggregateRecord, BenchError> {
        let mut scope: JoinSet<Result<Facet, BenchError>> = JoinSet::new();
        {
            let source = Arc::clone(&self.source);
            scope.spawn(async move {
                source
                    .inventory(product_id)
                    .await
                    .map(Facet::Inventory)
                    .map_err(|e| BenchError::partial("inventory", e))
            });
        }
        {
            let source = Arc::clone(&self.source);
            scope.spawn(async move {
                source
                    .pricing(product_id)
                    .await
                    .map(Facet::Pricing)
                    .map_err(|e| BenchError::partial("pricing", e))
            });
        }
        {
            let source = Arc::clone(&self.source);
            scope.spawn(async move {
                source
                    .reviews(product_id)
                    .await
                    .map(Facet::Reviews)
                    .map_err(|e| BenchError::partial("reviews", e))
            });
        }

        let mut inventory = None;
        let mut pricing = None;
        let mut reviews = None;

        let collect = async {
            while let Some(joined) = scope.join_next().await {
                match joined {
                    Ok(Ok(Facet::Inventory(value))) => inventory = Some(value),
                    Ok(Ok(Facet::Pricing(value))) => pricing = Some(value),
                    Ok(Ok(Facet::Reviews(value))) => reviews = Some(value),
                    Ok(Err(err)) => {
                        // First failure cancels the remaining siblings.
                        scope.abort_all();
                        return Err(err);
                    }
                    // Siblings we just aborted surface as cancelled joins.
                    Err(join_err) if join_err.is_cancelled() => {}
                    Err(join_err) => {
                        scope.abort_all();
                        return Err(BenchError::CallFailure(format!(
                            "facet task panicked: {join_err}"
                        )));
                    }
                }
            }
            Ok(())
        };

        // Dropping the scope on timeout aborts whatever is still running.
        tokio::time::timeout(OPERATION_TIMEOUT, collect)
            .await
            .map_err(|_| BenchError::Timeout)??;

        match (inventory, pricing, reviews) {
            (Some(inventory), Some(pricing), Some(reviews)) => Ok(AggregateRecord::combine(
                product_id, inventory, pricing, reviews,
            )),
            // Only reachable if a task was cancelled from outside the scope;
            // still a whole-operation failure, never a partial record.
            _ => Err(BenchError::CallFailure("facet task cancelled".into())),
        }
    }

    fn cancels_siblings(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "scoped"
    }
}

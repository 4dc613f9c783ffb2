use super::{Aggregator, FacetSource};
use async_trait::async_trait;
use fanbench_core::constants::OPERATION_TIMEOUT;
use fanbench_core::{AggregateRecord, BenchError};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Job = BoxFuture<'static, ()>;

/// Fixed-size pool of worker tasks, shared by every pooled aggregation in
/// flight.
///
/// The pool is created and shut down by whoever orchestrates the run and is
/// passed into [`PooledAggregator`] explicitly, so sizing and lifecycle stay
/// out of global state. Workers only ever run leaf facet calls, never
/// aggregations, so a saturated pool queues work but cannot deadlock on
/// itself.
pub struct WorkerPool {
    queue: async_channel::Sender<Job>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let (queue, jobs) = async_channel::unbounded::<Job>();
        let workers = (0..size.max(1))
            .map(|worker| {
                let jobs = jobs.clone();
                tokio::spawn(async move {
                    debug!(worker, "pool worker started");
                    while let Ok(job) = jobs.recv().await {
                        job.await;
                    }
                    debug!(worker, "pool worker stopped");
                })
            })
            .collect();
        Self { queue, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Runs `fut` on a pool worker and hands the result back through a
    /// oneshot. The job keeps running even if the receiver loses interest;
    /// pool work is never proactively cancelled.
    fn submit<T, F>(&self, fut: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let _ = tx.send(fut.await);
        });
        if self.queue.try_send(job).is_err() {
            warn!("worker pool is shut down; job dropped");
        }
        rx
    }

    /// Closes the queue. Workers finish queued jobs and exit.
    pub fn shutdown(&self) {
        self.queue.close();
    }
}

/// Strategy A: bounded worker pool plus futures.
///
/// The three facet calls are submitted to the shared pool and the caller
/// waits until all three complete before combining. A failing call does NOT
/// cancel its siblings; all three always run to completion (or their own
/// timeout). Only the combined outcome is part of the cross-strategy
/// contract, so callers must tolerate this asymmetry.
pub struct PooledAggregator<S> {
    source: Arc<S>,
    pool: Arc<WorkerPool>,
}

impl<S: FacetSource> PooledAggregator<S> {
    pub fn new(source: Arc<S>, pool: Arc<WorkerPool>) -> Self {
        Self { source, pool }
    }
}

#[async_trait]
impl<S: FacetSource> Aggregator for PooledAggregator<S> {
    async fn aggregate(&self, product_id: u64) -> Result<AggregateRecord, BenchError> {
        let inventory = {
            let source = Arc::clone(&self.source);
            self.pool
                .submit(async move { source.inventory(product_id).await })
        };
        let pricing = {
            let source = Arc::clone(&self.source);
            self.pool
                .submit(async move { source.pricing(product_id).await })
        };
        let reviews = {
            let source = Arc::clone(&self.source);
            self.pool
                .submit(async move { source.reviews(product_id).await })
        };

        // join, not try_join: every result is collected so a fast failure
        // cannot tear down its pool siblings.
        let joined = futures::future::join3(inventory, pricing, reviews);
        let (inventory, pricing, reviews) = tokio::time::timeout(OPERATION_TIMEOUT, joined)
            .await
            .map_err(|_| BenchError::Timeout)?;

        let inventory = delivered(inventory).map_err(|e| BenchError::partial("inventory", e))?;
        let pricing = delivered(pricing).map_err(|e| BenchError::partial("pricing", e))?;
        let reviews = delivered(reviews).map_err(|e| BenchError::partial("reviews", e))?;

        Ok(AggregateRecord::combine(
            product_id, inventory, pricing, reviews,
        ))
    }

    fn cancels_siblings(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "pooled"
    }
}

/// Unwraps a pool delivery; a dropped worker counts as a failed call.
fn delivered<T>(
    result: Result<Result<T, BenchError>, oneshot::error::RecvError>,
) -> Result<T, BenchError> {
    match result {
        Ok(inner) => inner,
        Err(_) => Err(BenchError::CallFailure(
            "pool worker dropped the call".into(),
        )),
    }
}

use crate::recorder::LatencyRecorder;
use crate::resources::ResourceSampler;
use fanbench_core::constants::{ENTITY_UNIVERSE, OPERATION_TIMEOUT, PEAK_SAMPLE_EVERY};
use fanbench_core::{BenchError, BenchmarkResult, ScenarioConfig};
use rand::Rng;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Drives N operations at a bounded concurrency against one target
/// operation and assembles the resulting metrics.
///
/// Dispatch always uses worker-pool semantics (a semaphore caps how many
/// operations are in flight) regardless of which aggregation strategy the
/// driven operation uses internally. Per-operation failures and timeouts
/// are counted and dropped; they never abort the run.
pub struct LoadGenerator {
    config: ScenarioConfig,
}

impl LoadGenerator {
    pub fn new(config: ScenarioConfig) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs the warm-up / snapshot / measure / snapshot sequence for one
    /// (system, scenario) pair. `op` receives an entity id drawn uniformly
    /// from the fixed universe.
    #[instrument(name = "load", skip_all, fields(system = system, scenario = scenario))]
    pub async fn run<O, F>(&self, system: &str, scenario: &str, op: O) -> BenchmarkResult
    where
        O: Fn(u64) -> F + Send + Sync + 'static,
        F: Future<Output = Result<(), BenchError>> + Send + 'static,
    {
        let op = Arc::new(op);

        self.warmup(&op).await;

        let mut sampler = ResourceSampler::new();
        let before = sampler.settle_and_snapshot().await;

        let recorder = Arc::new(LatencyRecorder::new());
        let limiter = Arc::new(Semaphore::new(self.config.concurrency));
        let failed = Arc::new(AtomicU64::new(0));
        let peak = AtomicUsize::new(0);

        let mut tasks = JoinSet::new();
        let start = Instant::now();

        for submitted in 0..self.config.total_operations {
            let entity = rand::thread_rng().gen_range(1..=ENTITY_UNIVERSE);
            let permit = Arc::clone(&limiter)
                .acquire_owned()
                .await
                .expect("dispatch semaphore closed");

            // Sampled while this submission's permit is still held locally,
            // so the gauge reads at least 1.
            if submitted % PEAK_SAMPLE_EVERY == 0 {
                let in_flight = self.config.concurrency - limiter.available_permits();
                peak.fetch_max(in_flight, Ordering::Relaxed);
            }

            let op = Arc::clone(&op);
            let recorder = Arc::clone(&recorder);
            let failed = Arc::clone(&failed);
            tasks.spawn(async move {
                let _permit = permit;
                let begin = Instant::now();
                let outcome = tokio::time::timeout(OPERATION_TIMEOUT, op(entity)).await;
                let elapsed = begin.elapsed();
                match outcome {
                    Ok(Ok(())) => {
                        recorder.record(elapsed);
                        #[cfg(feature = "metrics")]
                        {
                            metrics::histogram!("fanbench.operation.latency")
                                .record(elapsed.as_nanos() as f64);
                            metrics::counter!("fanbench.operation.success").increment(1);
                        }
                    }
                    Ok(Err(err)) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        debug!(entity, %err, "operation failed");
                        #[cfg(feature = "metrics")]
                        metrics::counter!("fanbench.operation.error").increment(1);
                    }
                    Err(_) => {
                        failed.fetch_add(1, Ordering::Relaxed);
                        warn!(entity, "operation exceeded its time bound");
                        #[cfg(feature = "metrics")]
                        metrics::counter!("fanbench.operation.error").increment(1);
                    }
                }
            });
        }

        // Every submitted operation reaches a terminal state before the end
        // timestamp is taken.
        while tasks.join_next().await.is_some() {}
        let total_duration = start.elapsed();

        let after = sampler.snapshot();

        let summary = recorder.finalize();
        let completed = summary.count() as u64;
        let failed = failed.load(Ordering::Relaxed);
        let secs = total_duration.as_secs_f64();
        let operations_per_second = if secs > 0.0 { completed as f64 / secs } else { 0.0 };

        let mut extra_metrics = BTreeMap::new();
        extra_metrics.insert("failed_ops".to_string(), failed as f64);
        extra_metrics.insert(
            "warmup_ops".to_string(),
            self.config.warmup_count() as f64,
        );
        extra_metrics.insert("tasks_before".to_string(), before.live_tasks as f64);
        extra_metrics.insert("tasks_after".to_string(), after.live_tasks as f64);

        info!(system, scenario, completed, failed, "run complete");

        BenchmarkResult {
            system: system.to_string(),
            scenario: scenario.to_string(),
            total_duration,
            completed_operations: completed,
            operations_per_second,
            average_latency: summary.average(),
            p50_latency: summary.percentile(50.0),
            p95_latency: summary.percentile(95.0),
            p99_latency: summary.percentile(99.0),
            heap_before: before.heap_used_bytes,
            heap_after: after.heap_used_bytes,
            heap_delta: after.heap_used_bytes as i64 - before.heap_used_bytes as i64,
            peak_concurrency: peak.load(Ordering::Relaxed),
            extra_metrics,
        }
    }

    /// Primes connections and caches with a small fraction of real calls.
    /// Warm-up samples are discarded and warm-up failures ignored.
    async fn warmup<O, F>(&self, op: &Arc<O>)
    where
        O: Fn(u64) -> F + Send + Sync + 'static,
        F: Future<Output = Result<(), BenchError>> + Send + 'static,
    {
        let count = self.config.warmup_count();
        if count == 0 {
            return;
        }
        debug!(count, "warming up");
        for _ in 0..count {
            let entity = rand::thread_rng().gen_range(1..=ENTITY_UNIVERSE);
            if let Err(err) = op(entity).await {
                debug!(entity, %err, "warm-up call failed");
            }
        }
    }
}

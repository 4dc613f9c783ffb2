use std::collections::BTreeMap;
use std::time::Duration;

/// Process-wide gauges captured at a single point in time.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceSnapshot {
    /// In-use memory of this process, in bytes. Best effort; zero when the
    /// platform reading is unavailable.
    pub heap_used_bytes: u64,
    /// Live task (or thread) count at capture time.
    pub live_tasks: usize,
}

/// Immutable record of one (system, scenario) run.
///
/// Built once by the load generator when the run completes; percentiles are
/// computed over successful samples only, and the completed count never
/// exceeds the requested total.
#[derive(Clone, Debug)]
pub struct BenchmarkResult {
    pub system: String,
    pub scenario: String,

    pub total_duration: Duration,
    /// Operations that completed successfully within their time bound.
    pub completed_operations: u64,
    /// completed_operations / wall-clock seconds.
    pub operations_per_second: f64,

    pub average_latency: Duration,
    pub p50_latency: Duration,
    pub p95_latency: Duration,
    pub p99_latency: Duration,

    pub heap_before: u64,
    pub heap_after: u64,
    /// Signed: a run may shrink resident memory, and that is reported as-is.
    pub heap_delta: i64,
    pub peak_concurrency: usize,

    /// Free-form metrics; carries at least `failed_ops`.
    pub extra_metrics: BTreeMap<String, f64>,
}

impl BenchmarkResult {
    pub fn failed_operations(&self) -> u64 {
        self.extra_metrics
            .get("failed_ops")
            .copied()
            .unwrap_or(0.0) as u64
    }
}

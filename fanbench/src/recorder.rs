use std::sync::Mutex;
use std::time::Duration;

/// Append-only collector of per-operation elapsed times.
///
/// Workers push samples concurrently during a run; the set is sorted once at
/// finalization, before percentile extraction. Percentiles use the
/// nearest-rank method (no interpolation between adjacent ranks), matching
/// conventional load-test tooling: the element at rank
/// `ceil(p/100 * n) - 1`, clamped to the sample range.
#[derive(Debug, Default)]
pub struct LatencyRecorder {
    samples: Mutex<Vec<Duration>>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one sample. Safe under concurrent callers.
    pub fn record(&self, sample: Duration) {
        self.samples
            .lock()
            .expect("latency recorder lock poisoned")
            .push(sample);
    }

    /// Sorts the collected samples and returns an immutable summary.
    pub fn finalize(&self) -> LatencySummary {
        let mut samples = self
            .samples
            .lock()
            .expect("latency recorder lock poisoned")
            .clone();
        samples.sort_unstable();
        LatencySummary { samples }
    }
}

/// Sorted sample set ready for rank extraction.
#[derive(Clone, Debug)]
pub struct LatencySummary {
    samples: Vec<Duration>,
}

impl LatencySummary {
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Arithmetic mean, zero for an empty set.
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Nearest-rank percentile. Zero for an empty set; that is an explicit
    /// edge case, not an error.
    pub fn percentile(&self, p: f64) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let n = self.samples.len();
        let rank = (p / 100.0 * n as f64).ceil() as isize - 1;
        let index = rank.clamp(0, n as isize - 1) as usize;
        self.samples[index]
    }
}

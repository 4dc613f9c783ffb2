use thiserror::Error;

/// Failure taxonomy for the harness.
///
/// Per-operation failures are contained by the load generator and excluded
/// from metrics; they never abort a run. There are no automatic retries
/// anywhere, so the failure count itself stays an observable metric.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A downstream call errored or returned a non-success status.
    #[error("downstream call failed: {0}")]
    CallFailure(String),

    /// The operation exceeded its time bound.
    #[error("operation timed out")]
    Timeout,

    /// At least one of the three fan-out facets failed. The whole aggregate
    /// fails; callers never see a record with missing facets.
    #[error("aggregation failed on the {facet} facet: {source}")]
    PartialFailure {
        facet: &'static str,
        #[source]
        source: Box<BenchError>,
    },

    /// Seeding problems are warnings; the benchmark proceeds without data.
    #[error("seeding failed: {0}")]
    Seeding(String),

    #[error("invalid scenario configuration: {0}")]
    InvalidConfig(String),
}

impl BenchError {
    /// Wraps a facet-call failure into a whole-aggregate failure.
    pub fn partial(facet: &'static str, source: BenchError) -> Self {
        BenchError::PartialFailure {
            facet,
            source: Box::new(source),
        }
    }
}

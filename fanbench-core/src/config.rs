use crate::constants::WARMUP_CAP;
use crate::error::BenchError;

/// Scenario families driven against every system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Fan-out aggregation of the three downstream facets.
    Aggregation,
    /// Mixed create/read load against the product CRUD surface.
    Db,
}

impl Scenario {
    pub fn family(self) -> &'static str {
        match self {
            Scenario::Aggregation => "aggregation",
            Scenario::Db => "db",
        }
    }
}

/// Per-run knobs, validated once at run start.
#[derive(Clone, Debug)]
pub struct ScenarioConfig {
    pub total_operations: usize,
    pub concurrency: usize,
}

impl ScenarioConfig {
    pub fn new(total_operations: usize, concurrency: usize) -> Self {
        Self {
            total_operations,
            concurrency,
        }
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        if self.total_operations == 0 {
            return Err(BenchError::InvalidConfig(
                "total_operations must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(BenchError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Warm-up calls issued (and discarded) before measurement begins.
    pub fn warmup_count(&self) -> usize {
        (self.total_operations / 10).min(WARMUP_CAP)
    }
}

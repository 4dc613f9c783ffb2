use std::time::Duration;

/// Upper bound on a single benchmark operation. Exceeding it marks that one
/// operation failed without affecting the rest of the run.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed universe of entity identifiers the load generator draws from.
pub const ENTITY_UNIVERSE: u64 = 100;

/// Warm-up issues roughly 10% of the requested operations, capped at this.
pub const WARMUP_CAP: usize = 50;

/// Settle pause taken before the "before" resource snapshot.
pub const SNAPSHOT_SETTLE: Duration = Duration::from_millis(500);

/// The in-flight gauge is sampled on every Nth submission.
pub const PEAK_SAMPLE_EVERY: usize = 100;

/// One in every N DB-scenario operations is a create, the rest are reads.
pub const DB_WRITE_RATIO: u64 = 5;

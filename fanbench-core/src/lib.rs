//! Shared data model for the fanbench harness: scenario configuration,
//! wire records, benchmark results, and the error taxonomy.

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod stats;

pub use config::{Scenario, ScenarioConfig};
pub use data::{
    AggregateRecord, InventoryResponse, NewProduct, PricingResponse, Product, ReviewsResponse,
};
pub use error::BenchError;
pub use stats::{BenchmarkResult, ResourceSnapshot};

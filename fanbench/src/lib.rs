//! fanbench drives a fan-out aggregation workload through three
//! interchangeable concurrency strategies and measures how each behaves
//! under load: throughput, latency distribution, and resource deltas.
//!
//! The pieces compose bottom-up: a [`recorder::LatencyRecorder`] collects
//! per-operation samples, a [`resources::ResourceSampler`] brackets the run,
//! the [`aggregate`] module holds the three strategies behind one
//! [`aggregate::Aggregator`] contract, the [`generator::LoadGenerator`]
//! dispatches operations at a bounded concurrency, and [`runner`] sequences
//! systems and scenarios into a final comparison.

pub mod aggregate;
pub mod client;
pub mod generator;
pub mod recorder;
pub mod report;
pub mod resources;
pub mod runner;

pub use aggregate::{
    Aggregator, FacetSource, PooledAggregator, ReactiveAggregator, ScopedAggregator, WorkerPool,
};
pub use client::{wait_until_healthy, HttpFacetSource, ProductClient};
pub use generator::LoadGenerator;
pub use recorder::{LatencyRecorder, LatencySummary};
pub use resources::ResourceSampler;
pub use runner::{BenchmarkRunner, RunOptions, ScenarioSelection};

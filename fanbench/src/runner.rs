use crate::aggregate::{
    Aggregator, PooledAggregator, ReactiveAggregator, ScopedAggregator, WorkerPool,
};
use crate::client::{HttpFacetSource, ProductClient};
use crate::generator::LoadGenerator;
use crate::report;
use fanbench_core::constants::DB_WRITE_RATIO;
use fanbench_core::{BenchError, BenchmarkResult, NewProduct, Scenario, ScenarioConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Scenario selector from the command surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioSelection {
    Aggregation,
    Db,
    All,
}

impl ScenarioSelection {
    pub fn scenarios(self) -> &'static [Scenario] {
        match self {
            ScenarioSelection::Aggregation => &[Scenario::Aggregation],
            ScenarioSelection::Db => &[Scenario::Db],
            ScenarioSelection::All => &[Scenario::Aggregation, Scenario::Db],
        }
    }
}

/// Everything one full comparison run needs.
pub struct RunOptions {
    pub config: ScenarioConfig,
    pub selection: ScenarioSelection,
    pub base_url: String,
    pub pool_size: usize,
    pub seed: bool,
    pub seed_count: usize,
}

/// Sequences warm-up, measurement, and reporting for each system and each
/// scenario, then ranks the systems by throughput.
pub struct BenchmarkRunner {
    options: RunOptions,
}

impl BenchmarkRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Runs every system through the selected scenarios.
    ///
    /// Individual benchmark failures surface in the report, not as errors;
    /// only an invalid configuration aborts the comparison.
    pub async fn run(&self) -> Result<Vec<BenchmarkResult>, BenchError> {
        self.options.config.validate()?;

        let source = Arc::new(HttpFacetSource::new(&self.options.base_url));
        let products = Arc::new(ProductClient::new(&self.options.base_url));
        let pool = Arc::new(WorkerPool::new(self.options.pool_size));
        info!(pool_size = pool.size(), "worker pool up");

        let systems: Vec<Arc<dyn Aggregator>> = vec![
            Arc::new(PooledAggregator::new(Arc::clone(&source), Arc::clone(&pool))),
            Arc::new(ReactiveAggregator::new(Arc::clone(&source))),
            Arc::new(ScopedAggregator::new(Arc::clone(&source))),
        ];

        let mut results = Vec::new();
        for system in &systems {
            report::print_system_banner(system.name(), &self.options.base_url);

            if self.options.seed {
                if let Err(err) = products.seed(self.options.seed_count).await {
                    warn!(%err, "seeding failed; continuing without seeded data");
                }
            }

            for &scenario in self.options.selection.scenarios() {
                let result = match scenario {
                    Scenario::Aggregation => self.run_aggregation(system).await?,
                    Scenario::Db => self.run_db(system.name(), &products).await?,
                };
                report::print_summary(&result);
                results.push(result);
            }
        }

        pool.shutdown();
        report::print_comparison(&results);
        Ok(results)
    }

    async fn run_aggregation(
        &self,
        system: &Arc<dyn Aggregator>,
    ) -> Result<BenchmarkResult, BenchError> {
        let generator = LoadGenerator::new(self.options.config.clone())?;
        let scenario = format!(
            "aggregation-{}-concurrent",
            self.options.config.concurrency
        );
        let aggregator = Arc::clone(system);
        Ok(generator
            .run(system.name(), &scenario, move |entity| {
                let aggregator = Arc::clone(&aggregator);
                async move { aggregator.aggregate(entity).await.map(|_| ()) }
            })
            .await)
    }

    /// Mixed load against the CRUD surface: one create for every
    /// `DB_WRITE_RATIO` operations, reads for the rest. Reads of ids that
    /// were never seeded fail and are counted, which is expected.
    async fn run_db(
        &self,
        system_name: &str,
        products: &Arc<ProductClient>,
    ) -> Result<BenchmarkResult, BenchError> {
        let generator = LoadGenerator::new(self.options.config.clone())?;
        let scenario = format!("db-ops-{}-concurrent", self.options.config.concurrency);
        let products = Arc::clone(products);
        let issued = Arc::new(AtomicU64::new(0));

        Ok(generator
            .run(system_name, &scenario, move |entity| {
                let products = Arc::clone(&products);
                let index = issued.fetch_add(1, Ordering::Relaxed);
                async move {
                    if index % DB_WRITE_RATIO == 0 {
                        let product = NewProduct {
                            name: format!("BenchProduct-{index}"),
                            description: "benchmark test product".to_string(),
                            price: 1.0 + entity as f64 * 0.97,
                        };
                        products.create(&product).await.map(|_| ())
                    } else {
                        products.get(entity).await.map(|_| ())
                    }
                }
            })
            .await)
    }
}

use clap::Parser;
use fanbench::{BenchmarkRunner, RunOptions, ScenarioSelection};
use fanbench_core::ScenarioConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compares three concurrency strategies against the same fan-out workload.
#[derive(Parser, Debug)]
#[command(name = "fanbench", version)]
struct Args {
    /// Measured operations per (system, scenario) pair.
    #[arg(short, long, default_value_t = 1000)]
    requests: usize,

    /// Maximum operations in flight at once.
    #[arg(short, long, default_value_t = 100)]
    concurrency: usize,

    /// Scenario family to run: aggregation, db, or all.
    #[arg(short, long, default_value = "all")]
    scenario: String,

    /// Base URL of the downstream service.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Worker pool size for the pooled strategy. 0 derives it from the
    /// available parallelism.
    #[arg(long, default_value_t = 0)]
    pool_size: usize,

    /// Also start an in-process mock service on this address.
    #[arg(long)]
    spawn_mock: Option<SocketAddr>,

    /// Seed baseline products before each system's run.
    #[arg(long, default_value_t = true)]
    seed: bool,

    /// How many products to seed.
    #[arg(long, default_value_t = 100)]
    seed_count: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let selection = match args.scenario.as_str() {
        "aggregation" => ScenarioSelection::Aggregation,
        "db" => ScenarioSelection::Db,
        "all" => ScenarioSelection::All,
        other => anyhow::bail!("unknown scenario {other:?}; expected aggregation, db, or all"),
    };

    let pool_size = if args.pool_size > 0 {
        args.pool_size
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get() * 2)
            .unwrap_or(8)
    };

    let base_url = if let Some(addr) = args.spawn_mock {
        tokio::spawn(mock_service::run(addr));
        let base_url = format!("http://{addr}");
        fanbench::wait_until_healthy(&base_url, Duration::from_secs(5)).await?;
        info!(%addr, "started in-process mock service");
        base_url
    } else {
        args.base_url.clone()
    };

    let runner = BenchmarkRunner::new(RunOptions {
        config: ScenarioConfig::new(args.requests, args.concurrency),
        selection,
        base_url,
        pool_size,
        seed: args.seed,
        seed_count: args.seed_count,
    });

    let results = runner.run().await?;
    info!(runs = results.len(), "benchmark complete");
    Ok(())
}

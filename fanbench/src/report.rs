//! Human-readable run summaries and the final cross-system comparison.
//! Report output goes to stdout; diagnostics go through tracing.

use fanbench_core::{BenchmarkResult, Scenario};
use std::time::Duration;

pub fn print_system_banner(name: &str, base_url: &str) {
    println!();
    println!("{}", "=".repeat(64));
    println!("Testing system: {name} ({base_url})");
    println!("{}", "=".repeat(64));
}

pub fn print_summary(result: &BenchmarkResult) {
    println!("{}", "-".repeat(64));
    println!("System: {} | Scenario: {}", result.system, result.scenario);
    println!("  duration:     {:.2} s", result.total_duration.as_secs_f64());
    println!("  operations:   {}", result.completed_operations);
    println!("  failed:       {}", result.failed_operations());
    println!("  throughput:   {:.2} ops/sec", result.operations_per_second);
    println!(
        "  latency:      avg={:.2}ms p50={:.2}ms p95={:.2}ms p99={:.2}ms",
        millis(result.average_latency),
        millis(result.p50_latency),
        millis(result.p95_latency),
        millis(result.p99_latency),
    );
    println!(
        "  heap:         before={} KiB after={} KiB delta={} KiB",
        result.heap_before / 1024,
        result.heap_after / 1024,
        result.heap_delta / 1024,
    );
    println!("  peak tasks:   {}", result.peak_concurrency);
    println!("{}", "-".repeat(64));
}

pub fn print_comparison(results: &[BenchmarkResult]) {
    println!();
    println!("{}", "=".repeat(78));
    println!("COMPARISON SUMMARY");
    println!("{}", "=".repeat(78));
    println!(
        "{:<10} | {:<26} | {:>12} | {:>9} | {:>9}",
        "System", "Scenario", "Ops/sec", "P95 (ms)", "Heap KiB"
    );
    println!("{}", "-".repeat(78));
    for result in results {
        println!(
            "{:<10} | {:<26} | {:>12.1} | {:>9.2} | {:>9}",
            result.system,
            truncate(&result.scenario, 26),
            result.operations_per_second,
            millis(result.p95_latency),
            result.heap_delta / 1024,
        );
    }
    println!("{}", "=".repeat(78));

    println!();
    println!("Winners by throughput:");
    for family in [Scenario::Aggregation, Scenario::Db].map(Scenario::family) {
        if let Some(best) = winner(results, family) {
            println!(
                "  {:<12} {} ({:.1} ops/sec)",
                format!("{family}:"),
                best.system,
                best.operations_per_second
            );
        }
    }
}

/// Highest throughput within one scenario family. Strict comparison while
/// scanning in run order, so the first system encountered wins ties.
fn winner<'a>(results: &'a [BenchmarkResult], family: &str) -> Option<&'a BenchmarkResult> {
    let mut best: Option<&BenchmarkResult> = None;
    for result in results.iter().filter(|r| r.scenario.starts_with(family)) {
        if best.map_or(true, |b| result.operations_per_second > b.operations_per_second) {
            best = Some(result);
        }
    }
    best
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

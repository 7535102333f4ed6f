//! Full EMI campaign over the stock automotive catalogs, rendered as a
//! console report.
//!
//! ```bash
//! cargo run --example emi_report            # text report
//! cargo run --example emi_report -- --json  # JSON export
//! RUST_LOG=debug cargo run --example emi_report
//! ```

use emclab_sim::suite::{
    default_scenarios, default_sweep, EmiTestSuite, SuiteConfig, SuiteReport,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut suite = EmiTestSuite::new(SuiteConfig::default())?;
    let scenarios = default_scenarios();
    let sweep = default_sweep();

    suite.run_baseline()?;
    suite.run_scenarios(&scenarios)?;
    suite.run_immunity_sweep(&sweep)?;

    let report = SuiteReport::derive(&suite);

    if std::env::args().any(|arg| arg == "--json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("EMI Interference Test Report");
    println!("============================\n");

    println!(
        "{:<10} {:>14} {:>14} {:>14} {:>12}",
        "Protocol", "Baseline BER", "Max BER", "Mean BER", "Degradation"
    );
    println!("{}", "-".repeat(68));
    for summary in &report.summaries {
        println!(
            "{:<10} {:>14.2e} {:>14.2e} {:>14.2e} {:>11.2}x",
            summary.protocol,
            summary.baseline_ber,
            summary.max_scenario_ber,
            summary.mean_scenario_ber,
            summary.degradation,
        );
    }

    println!("\nScenario Detail");
    println!("---------------");
    for record in suite.results().scenarios() {
        println!("\n{}:", record.scenario);
        for measurement in &record.measurements {
            let status = if measurement.report.bit_error_rate < 1e-6 { "PASS" } else { "FAIL" };
            println!(
                "  {:<10} BER={:.2e}  FER={:.2e}  [{status}]",
                measurement.protocol,
                measurement.report.bit_error_rate,
                measurement.report.frame_error_rate,
            );
        }
    }

    println!("\nImmunity Thresholds");
    println!("-------------------");
    let max_level = sweep.levels.last().copied().unwrap_or(0.0);
    for summary in &report.summaries {
        match summary.immunity_threshold {
            Some(level) => println!("  {:<10} {level} V", summary.protocol),
            None => println!("  {:<10} > {max_level} V (robust over the tested range)", summary.protocol),
        }
    }

    println!("\nRanking (most robust first)");
    println!("---------------------------");
    for (i, protocol) in report.ranking.iter().enumerate() {
        println!("  {}. {protocol}", i + 1);
    }

    Ok(())
}

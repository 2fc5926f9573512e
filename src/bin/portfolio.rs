//! Mitigation portfolio sweep.
//!
//! Runs many seeded 30-trial sessions per portfolio and prints aggregate
//! cost, savings, and ROI figures so portfolios can be compared.
//!
//! ## Usage
//! ```bash
//! cargo run --bin portfolio --release
//! ```

use chainrisk_simulation::config::SimulationParams;
use chainrisk_simulation::engine::{aggregate_outcomes, run_session, SessionOutcome};
use chainrisk_simulation::mitigation::ControlId;

const RUNS_PER_PORTFOLIO: u64 = 500;

fn portfolios() -> Vec<(&'static str, Vec<ControlId>)> {
    vec![
        ("None", vec![]),
        ("Cyber (backup + firewall)", vec![ControlId::Backup, ControlId::Firewall]),
        ("Supply (buffer + dual)", vec![ControlId::Buffer, ControlId::Dual]),
        (
            "Equipment (maintenance + redundancy)",
            vec![ControlId::Maintenance, ControlId::Redundancy],
        ),
        ("All six", ControlId::all().to_vec()),
    ]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("=======================================================");
    println!("  Mitigation Portfolio Sweep");
    println!("  {RUNS_PER_PORTFOLIO} seeded sessions per portfolio");
    println!("=======================================================");
    println!();

    let params = SimulationParams::default();

    for (label, portfolio) in portfolios() {
        println!("Portfolio: {label}");
        println!("{}", "-".repeat(50));

        let outcomes: Vec<SessionOutcome> = (0..RUNS_PER_PORTFOLIO)
            .map(|seed| run_session(params, &portfolio, seed))
            .collect();
        aggregate_outcomes(&outcomes).print();
        println!();
    }

    print_summary_table(params);
}

fn print_summary_table(params: SimulationParams) {
    println!("| Portfolio                            | Integrated | Savings  | ROI    |");
    println!("|--------------------------------------|------------|----------|--------|");

    for (label, portfolio) in portfolios() {
        let outcomes: Vec<SessionOutcome> = (0..RUNS_PER_PORTFOLIO)
            .map(|seed| run_session(params, &portfolio, seed))
            .collect();
        let agg = aggregate_outcomes(&outcomes);
        println!(
            "| {:36} | ${:9.0} | ${:7.0} | {:5.0}% |",
            label, agg.avg_integrated_cost, agg.avg_savings, agg.avg_roi_pct,
        );
    }
}

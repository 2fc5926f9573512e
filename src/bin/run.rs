//! Single-session runner.
//!
//! Runs one seeded 30-trial session twice — once without mitigations and once
//! with the ransomware controls active — and prints both ledgers plus the
//! comparison summary and export snapshot.
//!
//! ## Usage
//! ```bash
//! cargo run --bin run --release [seed]
//! ```

use chainrisk_simulation::config::SimulationParams;
use chainrisk_simulation::engine::SimulationEngine;
use chainrisk_simulation::mitigation::ControlId;
use chainrisk_simulation::net::derive_arcs;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    println!("=======================================================");
    println!("  Supply Chain Cascade Simulation (seed {seed})");
    println!("=======================================================");
    println!();

    let params = SimulationParams::default();
    println!("Parameters:");
    println!(
        "  Hazard probabilities: ransomware {:.1}%, equipment {:.1}%, supplier {:.1}%",
        params.ransomware_prob * 100.0,
        params.equipment_prob * 100.0,
        params.supplier_prob * 100.0,
    );
    println!("  Cascade delay: {} ms", params.cascade_delay_ms);
    println!();

    run_once(params, &[], seed, "No mitigations");
    run_once(
        params,
        &[ControlId::Backup, ControlId::Firewall],
        seed,
        "Backup + Firewall",
    );
}

fn run_once(params: SimulationParams, portfolio: &[ControlId], seed: u64, label: &str) {
    println!("Session: {label}");
    println!("{}", "-".repeat(50));

    let mut engine = SimulationEngine::new(params, seed);
    for &control in portfolio {
        engine.toggle_mitigation(control);
    }
    engine.start();
    engine.run_to_completion();

    let ledger = engine.ledger();
    let comparison = engine.compare();
    println!("  Trials:            {}", engine.trials_run());
    println!("  Cascades:          {}", ledger.cascades);
    println!("  Standard cost:     ${:.0}", ledger.standard_cost);
    println!("  Integrated cost:   ${:.0}", ledger.integrated_cost);
    println!("  Mitigated cost:    ${:.0}", ledger.mitigated_cost);
    println!("  Savings:           ${:.0}", ledger.savings);
    println!("  Cost delta:        {:+.1}%", comparison.cost_delta_pct);
    println!("  ROI:               {:.0}%", comparison.roi_pct);
    println!(
        "  Mitigated net arcs: {}",
        derive_arcs(
            chainrisk_simulation::net::NetVariant::Mitigated,
            engine.mitigations().active()
        )
        .len()
    );

    match serde_json::to_string_pretty(&engine.snapshot()) {
        Ok(json) => println!("\nSnapshot:\n{json}"),
        Err(err) => eprintln!("snapshot serialization failed: {err}"),
    }
    println!();
}

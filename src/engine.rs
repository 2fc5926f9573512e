//! Simulation engine: session state, clock, and cascade execution.
//!
//! One `SimulationEngine` owns the three nets, the mitigation registry, the
//! cost ledger, and the timed event queue. All mutation happens through its
//! API on discrete ticks; callers drive engine time forward with
//! [`SimulationEngine::advance_to`], and each due task runs to completion
//! before the next is popped.

use chrono::Utc;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{validate_speed, ConfigError, SimulationParams};
use crate::hazard::{fire_hazard, FiringReport, HazardKind};
use crate::ledger::{Comparison, CostLedger};
use crate::mitigation::{ControlId, MitigationRegistry};
use crate::net::NetBank;
use crate::scheduler::{CascadeStage, EventQueue, Task};

/// Length of one automated run.
pub const TRIALS_PER_RUN: u32 = 30;

/// Unscaled interval between trials.
pub const TRIAL_INTERVAL_MS: u64 = 1_000;

pub struct SimulationEngine {
    params: SimulationParams,
    speed: f64,
    nets: NetBank,
    controls: MitigationRegistry,
    ledger: CostLedger,
    queue: EventQueue,
    now_ms: u64,
    running: bool,
    trials_run: u32,
    last_fta_prob: f64,
    last_comparison: Option<Comparison>,
    rng: ChaCha8Rng,
}

impl SimulationEngine {
    /// New session at the all-normal baseline, with a seeded RNG so the same
    /// seed reproduces the same run.
    pub fn new(params: SimulationParams, seed: u64) -> Self {
        Self {
            params,
            speed: 1.0,
            nets: NetBank::new(),
            controls: MitigationRegistry::new(),
            ledger: CostLedger::new(),
            queue: EventQueue::new(),
            now_ms: 0,
            running: false,
            trials_run: 0,
            last_fta_prob: 0.0,
            last_comparison: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    // --- configuration ---------------------------------------------------

    pub fn set_hazard_probability(
        &mut self,
        kind: HazardKind,
        prob: f64,
    ) -> Result<(), ConfigError> {
        self.params.set_hazard_prob(kind, prob)
    }

    pub fn set_cascade_delay_ms(&mut self, delay_ms: u64) -> Result<(), ConfigError> {
        self.params.set_cascade_delay_ms(delay_ms)
    }

    pub fn set_cost_multiplier(&mut self, multiplier: f64) -> Result<(), ConfigError> {
        self.params.set_cost_multiplier(multiplier)
    }

    pub fn set_recovery_factor(&mut self, factor: u32) {
        self.params.set_recovery_factor(factor);
    }

    /// Speed multiplier scales trial interval and cascade delay inversely.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), ConfigError> {
        self.speed = validate_speed(speed)?;
        Ok(())
    }

    fn step_interval_ms(&self) -> u64 {
        ((TRIAL_INTERVAL_MS as f64 / self.speed).round() as u64).max(1)
    }

    fn stage_delay_ms(&self) -> u64 {
        ((self.params.cascade_delay_ms as f64 / self.speed).round() as u64).max(1)
    }

    // --- mitigation commands ----------------------------------------------

    /// Toggle a control and resync the mitigated net's mitigation places, so
    /// the arc derivation and the probability adjustment always see the same
    /// active set.
    pub fn toggle_mitigation(&mut self, id: ControlId) {
        self.controls.toggle(id);
        self.controls.sync_places(&mut self.nets.mitigated);
    }

    /// Toggle by external name; unknown names are a no-op.
    pub fn toggle_mitigation_named(&mut self, name: &str) {
        if let Some(id) = ControlId::parse(name) {
            self.toggle_mitigation(id);
        }
    }

    // --- simulation commands ----------------------------------------------

    /// Start a 30-trial run, or stop the one in progress (toggle semantics).
    pub fn start(&mut self) {
        if self.running {
            self.stop();
            return;
        }
        self.running = true;
        self.trials_run = 0;
        self.last_comparison = None;
        let due = self.now_ms + self.step_interval_ms();
        self.queue.schedule(due, Task::Trial);
        info!(interval_ms = self.step_interval_ms(), "run started");
    }

    /// Idempotent. Cancels the pending trial tick; in-flight cascade stages
    /// from the just-completed trial run to completion.
    pub fn stop(&mut self) {
        self.running = false;
        self.queue.cancel_trials();
        info!(trials = self.trials_run, "run stopped");
    }

    /// Manually sample one trial, outside any run.
    pub fn step(&mut self) -> Option<HazardKind> {
        self.sample_trial()
    }

    /// Manually fire one hazard, bypassing the probability draw.
    pub fn trigger(&mut self, kind: HazardKind) -> FiringReport {
        self.fire(kind)
    }

    /// Full state restore: nets to baseline, ledger zeroed, queue drained.
    /// The active mitigation set survives; its places are resynced and the
    /// buffer window refills.
    pub fn reset(&mut self) {
        self.nets.reset_all();
        self.controls.restore_buffer();
        self.controls.sync_places(&mut self.nets.mitigated);
        self.ledger.reset();
        self.queue.clear();
        self.running = false;
        self.trials_run = 0;
        self.last_fta_prob = 0.0;
        self.last_comparison = None;
    }

    /// Comparison summary over the current ledger.
    pub fn compare(&self) -> Comparison {
        self.ledger.compare(self.controls.total_cost())
    }

    // --- time -------------------------------------------------------------

    /// Advance engine time, executing every due task in order. Tasks spawned
    /// by other tasks (cascade stage 2, the next trial tick) execute in the
    /// same call when their due time falls inside the window.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((key, task)) = self.queue.pop_due(now_ms) {
            self.now_ms = key.due_ms;
            match task {
                Task::Trial => self.run_trial(),
                Task::Cascade(stage) => self.run_cascade_stage(stage),
            }
        }
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Advance by a delta, convenience over [`Self::advance_to`].
    pub fn advance(&mut self, delta_ms: u64) {
        self.advance_to(self.now_ms + delta_ms);
    }

    /// Drain the queue, jumping straight to each due time. Terminates once
    /// the run has finished and all in-flight cascades have landed.
    pub fn run_to_completion(&mut self) {
        while let Some(due) = self.queue.next_due_ms() {
            self.advance_to(due);
        }
    }

    // --- internals ----------------------------------------------------------

    /// One categorical draw per trial: at most one hazard fires.
    fn sample_trial(&mut self) -> Option<HazardKind> {
        let roll: f64 = self.rng.gen();
        let ransomware = self.params.ransomware_prob;
        let equipment = ransomware + self.params.equipment_prob;
        let supplier = equipment + self.params.supplier_prob;

        let kind = if roll < ransomware {
            Some(HazardKind::Ransomware)
        } else if roll < equipment {
            Some(HazardKind::Equipment)
        } else if roll < supplier {
            Some(HazardKind::Supplier)
        } else {
            None
        };

        if let Some(kind) = kind {
            self.fire(kind);
        }
        kind
    }

    fn run_trial(&mut self) {
        self.sample_trial();
        self.trials_run += 1;
        if !self.running {
            return;
        }
        if self.trials_run >= TRIALS_PER_RUN {
            self.running = false;
            self.last_comparison = Some(self.compare());
            info!(trials = self.trials_run, "run complete");
        } else {
            let due = self.now_ms + self.step_interval_ms();
            self.queue.schedule(due, Task::Trial);
        }
    }

    fn fire(&mut self, kind: HazardKind) -> FiringReport {
        let report = fire_hazard(
            kind,
            self.params.hazard_prob(kind),
            self.params.cost_multiplier,
            &mut self.nets,
            &mut self.controls,
            &mut self.ledger,
        );
        self.last_fta_prob = report.effective_probability;
        if report.starts_cascade {
            let due = self.now_ms + self.stage_delay_ms();
            self.queue.schedule(due, Task::Cascade(CascadeStage::Distributor));
        }
        report
    }

    /// Stage 1 schedules stage 2 only once its own delay has elapsed, never
    /// concurrently; each stage counts once toward the cascade counter.
    fn run_cascade_stage(&mut self, stage: CascadeStage) {
        match stage {
            CascadeStage::Distributor => {
                for net in self.nets.cyber_aware_mut() {
                    net.mark_fired("T4");
                    net.transfer("P4", "P5");
                }
                self.ledger.record_cascade_stage();
                let due = self.now_ms + self.stage_delay_ms();
                self.queue.schedule(due, Task::Cascade(CascadeStage::Customer));
                debug!(at_ms = self.now_ms, "cascade stage: distributor impact");
            }
            CascadeStage::Customer => {
                for net in self.nets.cyber_aware_mut() {
                    net.mark_fired("T5");
                    net.transfer("P7", "P8");
                }
                self.ledger.record_cascade_stage();
                info!(
                    at_ms = self.now_ms,
                    cascades = self.ledger.cascades,
                    "cascade complete"
                );
            }
        }
    }

    // --- observable surface -------------------------------------------------

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn standard_net(&self) -> &crate::net::PetriNet {
        &self.nets.standard
    }

    pub fn integrated_net(&self) -> &crate::net::PetriNet {
        &self.nets.integrated
    }

    pub fn mitigated_net(&self) -> &crate::net::PetriNet {
        &self.nets.mitigated
    }

    pub fn mitigations(&self) -> &MitigationRegistry {
        &self.controls
    }

    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    /// Effective probability of the most recent hazard firing, display only.
    pub fn last_fta_probability(&self) -> f64 {
        self.last_fta_prob
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn trials_run(&self) -> u32 {
        self.trials_run
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Summary produced when the last run completed, if any.
    pub fn last_comparison(&self) -> Option<Comparison> {
        self.last_comparison
    }

    /// Export artifact: configuration, result totals, timestamp.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            parameters: self.params,
            results: SnapshotResults {
                cascades: self.ledger.cascades,
                standard_cost: self.ledger.standard_cost,
                integrated_cost: self.ledger.integrated_cost,
                mitigated_cost: self.ledger.mitigated_cost,
                fta_probability: self.last_fta_prob,
                mitigation_savings: self.ledger.savings,
            },
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub parameters: SimulationParams,
    pub results: SnapshotResults,
    pub timestamp: String,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SnapshotResults {
    pub cascades: u32,
    pub standard_cost: f64,
    pub integrated_cost: f64,
    pub mitigated_cost: f64,
    pub fta_probability: f64,
    pub mitigation_savings: f64,
}

/// Outcome of one full seeded session, for portfolio sweeps.
#[derive(Clone, Copy, Debug)]
pub struct SessionOutcome {
    pub standard_cost: f64,
    pub integrated_cost: f64,
    pub mitigated_cost: f64,
    pub savings: f64,
    pub cascades: u32,
    pub cost_delta_pct: f64,
    pub roi_pct: f64,
}

/// Run one seeded 30-trial session with the given mitigation portfolio.
pub fn run_session(
    params: SimulationParams,
    portfolio: &[ControlId],
    seed: u64,
) -> SessionOutcome {
    let mut engine = SimulationEngine::new(params, seed);
    for &control in portfolio {
        engine.toggle_mitigation(control);
    }
    engine.start();
    engine.run_to_completion();

    let ledger = *engine.ledger();
    let comparison = engine.compare();
    SessionOutcome {
        standard_cost: ledger.standard_cost,
        integrated_cost: ledger.integrated_cost,
        mitigated_cost: ledger.mitigated_cost,
        savings: ledger.savings,
        cascades: ledger.cascades,
        cost_delta_pct: comparison.cost_delta_pct,
        roi_pct: comparison.roi_pct,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AggregatedOutcome {
    pub runs: usize,
    pub avg_standard_cost: f64,
    pub avg_integrated_cost: f64,
    pub avg_savings: f64,
    pub avg_cascades: f64,
    pub avg_cost_delta_pct: f64,
    pub avg_roi_pct: f64,
}

pub fn aggregate_outcomes(outcomes: &[SessionOutcome]) -> AggregatedOutcome {
    let n = outcomes.len() as f64;
    AggregatedOutcome {
        runs: outcomes.len(),
        avg_standard_cost: outcomes.iter().map(|o| o.standard_cost).sum::<f64>() / n,
        avg_integrated_cost: outcomes.iter().map(|o| o.integrated_cost).sum::<f64>() / n,
        avg_savings: outcomes.iter().map(|o| o.savings).sum::<f64>() / n,
        avg_cascades: outcomes.iter().map(|o| o.cascades as f64).sum::<f64>() / n,
        avg_cost_delta_pct: outcomes.iter().map(|o| o.cost_delta_pct).sum::<f64>() / n,
        avg_roi_pct: outcomes.iter().map(|o| o.roi_pct).sum::<f64>() / n,
    }
}

impl AggregatedOutcome {
    pub fn print(&self) {
        println!("  Runs:                  {}", self.runs);
        println!("  Avg standard cost:     ${:.0}", self.avg_standard_cost);
        println!("  Avg integrated cost:   ${:.0}", self.avg_integrated_cost);
        println!("  Avg savings:           ${:.0}", self.avg_savings);
        println!("  Avg cascades:          {:.1}", self.avg_cascades);
        println!("  Avg cost delta:        {:+.1}%", self.avg_cost_delta_pct);
        println!("  Avg ROI:               {:.0}%", self.avg_roi_pct);
    }
}

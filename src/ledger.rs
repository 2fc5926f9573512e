//! Running cost totals for the three models.
//!
//! All figures are monotonically non-decreasing between resets. The standard
//! total accrues the unadjusted base cost; the integrated and mitigated
//! totals accrue the mitigation-adjusted cost computed by the hazard trigger.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CostLedger {
    pub standard_cost: f64,
    pub integrated_cost: f64,
    pub mitigated_cost: f64,
    pub savings: f64,
    /// Secondary/tertiary propagation steps, never primary firings.
    pub cascades: u32,
}

/// Comparison statistics over the ledger, display metrics only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparison {
    /// Percentage cost delta of integrated vs standard. Zero when the
    /// standard total is zero.
    pub cost_delta_pct: f64,
    /// Savings over mitigation acquisition cost, as a percentage. Zero when
    /// nothing was acquired.
    pub roi_pct: f64,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge one hazard firing. The integrated and mitigated models accrue
    /// the same adjusted amount; they differ only in topology.
    pub fn accrue(&mut self, standard: f64, integrated: f64, saved: f64) {
        self.standard_cost += standard;
        self.integrated_cost += integrated;
        self.mitigated_cost += integrated;
        self.savings += saved;
    }

    pub fn record_cascade_stage(&mut self) {
        self.cascades += 1;
    }

    pub fn compare(&self, acquisition_cost: f64) -> Comparison {
        let cost_delta_pct = if self.standard_cost > 0.0 {
            (self.integrated_cost - self.standard_cost) / self.standard_cost * 100.0
        } else {
            0.0
        };
        let roi_pct = if acquisition_cost > 0.0 {
            self.savings / acquisition_cost * 100.0
        } else {
            0.0
        };
        Comparison {
            cost_delta_pct,
            roi_pct,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accrue_keeps_totals_monotone() {
        let mut ledger = CostLedger::new();
        let mut previous = ledger;
        for _ in 0..5 {
            ledger.accrue(50_000.0, 19_500.0, 30_500.0);
            ledger.record_cascade_stage();
            assert!(ledger.standard_cost >= previous.standard_cost);
            assert!(ledger.integrated_cost >= previous.integrated_cost);
            assert!(ledger.mitigated_cost >= previous.mitigated_cost);
            assert!(ledger.savings >= previous.savings);
            assert!(ledger.cascades >= previous.cascades);
            previous = ledger;
        }
    }

    #[test]
    fn test_compare_zero_guards() {
        let ledger = CostLedger::new();
        let comparison = ledger.compare(0.0);
        assert_eq!(comparison.cost_delta_pct, 0.0);
        assert_eq!(comparison.roi_pct, 0.0);
    }

    #[test]
    fn test_compare_delta_and_roi() {
        let mut ledger = CostLedger::new();
        ledger.accrue(50_000.0, 19_500.0, 30_500.0);

        let comparison = ledger.compare(8_000.0);
        assert!((comparison.cost_delta_pct - (-61.0)).abs() < 1e-9);
        assert!((comparison.roi_pct - 381.25).abs() < 1e-9);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut ledger = CostLedger::new();
        ledger.accrue(1.0, 2.0, 3.0);
        ledger.record_cascade_stage();

        ledger.reset();
        assert_eq!(ledger, CostLedger::default());
    }
}

//! Hazard kinds and the firing path.
//!
//! A hazard firing is the primary disruption event: it moves tokens in all
//! three nets, marks the hazard's transition, and charges the cost ledger.
//! The decision *whether* a hazard fires this trial is made centrally by the
//! simulation clock; this module only executes the consequences.

use tracing::info;

use crate::ledger::CostLedger;
use crate::mitigation::MitigationRegistry;
use crate::net::NetBank;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HazardKind {
    Ransomware,
    Equipment,
    Supplier,
}

impl HazardKind {
    pub fn all() -> Vec<Self> {
        vec![Self::Ransomware, Self::Equipment, Self::Supplier]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ransomware => "Ransomware",
            Self::Equipment => "Equipment Failure",
            Self::Supplier => "Supplier Disruption",
        }
    }

    /// Base incident cost before the global cost multiplier.
    pub fn base_cost(&self) -> f64 {
        match self {
            Self::Ransomware => 50_000.0,
            Self::Equipment => 30_000.0,
            Self::Supplier => 20_000.0,
        }
    }

    /// Indirect-disruption multiplier applied to the mitigated cost in the
    /// cyber-aware ledgers. Calibration constants, not derived values.
    pub fn tier_multiplier(&self) -> f64 {
        match self {
            Self::Ransomware => 1.0,
            Self::Equipment => 1.5,
            Self::Supplier => 1.75,
        }
    }

    /// Fixed combined cost charged to the cyber-aware ledgers when no
    /// mitigation is active at all.
    pub fn unmitigated_combined_cost(&self) -> f64 {
        match self {
            Self::Ransomware => 100_000.0,
            Self::Equipment => 45_000.0,
            Self::Supplier => 35_000.0,
        }
    }

    /// The fault-tree transition this hazard marks as fired.
    pub fn transition_id(&self) -> &'static str {
        match self {
            Self::Ransomware => "T1",
            Self::Equipment => "T2",
            Self::Supplier => "T3",
        }
    }
}

/// What a single firing did, for display and for follow-up scheduling.
#[derive(Clone, Copy, Debug)]
pub struct FiringReport {
    pub kind: HazardKind,
    /// Mitigation-adjusted per-step probability, display only.
    pub effective_probability: f64,
    pub charged_standard: f64,
    pub charged_integrated: f64,
    pub saved: f64,
    /// True when the firing must be followed by the two-stage cascade.
    pub starts_cascade: bool,
}

/// Fire one hazard across all three nets and charge the ledger.
///
/// `base_probability` and `cost_multiplier` come from the live parameter set.
/// Supplier firings consume one unit of the buffer window when the buffer
/// control contributed a reduction.
pub fn fire_hazard(
    kind: HazardKind,
    base_probability: f64,
    cost_multiplier: f64,
    nets: &mut NetBank,
    controls: &mut MitigationRegistry,
    ledger: &mut CostLedger,
) -> FiringReport {
    let base_cost = kind.base_cost();
    let effective_probability = base_probability * controls.reduction(kind);
    let mitigated_cost = base_cost * controls.cost_reduction(kind);
    if kind == HazardKind::Supplier {
        controls.deplete_buffer();
    }

    match kind {
        HazardKind::Ransomware => {
            nets.standard.transfer("P1", "P2");
            for net in [&mut nets.integrated, &mut nets.mitigated] {
                net.transfer("P10", "P2");
                net.transfer("P1", "P2");
            }
        }
        HazardKind::Equipment => {
            nets.standard.transfer("P4", "P5");
            for net in [&mut nets.integrated, &mut nets.mitigated] {
                net.transfer("P11", "P5");
                net.transfer("P4", "P5");
            }
        }
        HazardKind::Supplier => {
            for net in nets.all_mut() {
                net.transfer("P1", "P2");
            }
        }
    }

    for net in nets.all_mut() {
        net.mark_fired(kind.transition_id());
    }

    let tier = kind.tier_multiplier();
    let charged_standard = base_cost * cost_multiplier;
    let (charged_integrated, saved) = if controls.any_active() {
        (
            mitigated_cost * tier * cost_multiplier,
            (base_cost * tier - mitigated_cost * tier) * cost_multiplier,
        )
    } else {
        (kind.unmitigated_combined_cost() * cost_multiplier, 0.0)
    };
    ledger.accrue(charged_standard, charged_integrated, saved);

    info!(
        hazard = kind.name(),
        effective_probability,
        charged_standard,
        charged_integrated,
        saved,
        "hazard fired"
    );

    FiringReport {
        kind,
        effective_probability,
        charged_standard,
        charged_integrated,
        saved,
        starts_cascade: kind == HazardKind::Ransomware,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mitigation::ControlId;

    fn parts() -> (NetBank, MitigationRegistry, CostLedger) {
        (NetBank::new(), MitigationRegistry::new(), CostLedger::new())
    }

    #[test]
    fn test_ransomware_moves_cyber_and_physical_tokens() {
        let (mut nets, mut controls, mut ledger) = parts();
        let report = fire_hazard(
            HazardKind::Ransomware,
            0.02,
            1.0,
            &mut nets,
            &mut controls,
            &mut ledger,
        );

        assert!(report.starts_cascade);
        assert_eq!(nets.standard.tokens("P1"), 0);
        assert_eq!(nets.standard.tokens("P2"), 1);
        assert_eq!(nets.integrated.tokens("P10"), 0);
        assert_eq!(nets.integrated.tokens("P2"), 1);
        assert_eq!(nets.mitigated.tokens("P10"), 0);
        assert!(nets.standard.transition("T1").unwrap().enabled);
        assert!(nets.integrated.transition("T1").unwrap().enabled);
    }

    #[test]
    fn test_unmitigated_firing_charges_fixed_combined_cost() {
        let (mut nets, mut controls, mut ledger) = parts();
        fire_hazard(
            HazardKind::Equipment,
            0.05,
            1.0,
            &mut nets,
            &mut controls,
            &mut ledger,
        );

        assert_eq!(ledger.standard_cost, 30_000.0);
        assert_eq!(ledger.integrated_cost, 45_000.0);
        assert_eq!(ledger.mitigated_cost, 45_000.0);
        assert_eq!(ledger.savings, 0.0);
    }

    #[test]
    fn test_mitigated_supplier_firing_uses_tier_multiplier() {
        let (mut nets, mut controls, mut ledger) = parts();
        controls.toggle(ControlId::Dual);
        fire_hazard(
            HazardKind::Supplier,
            0.01,
            1.0,
            &mut nets,
            &mut controls,
            &mut ledger,
        );

        // 20000 * (1 - 0.5) = 10000, charged at the 1.75x supplier tier.
        assert_eq!(ledger.integrated_cost, 17_500.0);
        assert_eq!(ledger.savings, 35_000.0 - 17_500.0);
        assert_eq!(ledger.standard_cost, 20_000.0);
    }

    #[test]
    fn test_cost_multiplier_scales_every_ledger_term() {
        let (mut nets, mut controls, mut ledger) = parts();
        controls.toggle(ControlId::Backup);
        fire_hazard(
            HazardKind::Ransomware,
            0.02,
            2.0,
            &mut nets,
            &mut controls,
            &mut ledger,
        );

        assert_eq!(ledger.standard_cost, 100_000.0);
        assert_eq!(ledger.integrated_cost, 50_000.0 * 0.6 * 2.0);
        assert_eq!(ledger.savings, (50_000.0 - 30_000.0) * 2.0);
    }

    #[test]
    fn test_unrelated_control_still_switches_cost_branch() {
        // Any active control selects the mitigated-cost branch, even when it
        // reduces a different hazard.
        let (mut nets, mut controls, mut ledger) = parts();
        controls.toggle(ControlId::Firewall);
        fire_hazard(
            HazardKind::Equipment,
            0.05,
            1.0,
            &mut nets,
            &mut controls,
            &mut ledger,
        );

        // Firewall does not reduce equipment cost, so the full base cost is
        // charged at the tier, and the savings term is zero.
        assert_eq!(ledger.integrated_cost, 45_000.0);
        assert_eq!(ledger.savings, 0.0);
    }
}

//! Mitigation control catalog and the active-control registry.
//!
//! Each control reduces one hazard kind's firing probability and incident
//! cost by the same fraction. Multiple active controls compound
//! multiplicatively: each fraction applies to the already-reduced value, so
//! backup (0.40) plus firewall (0.35) leaves a 0.39 multiplier, not 0.25.

use std::collections::BTreeSet;

use tracing::debug;

use crate::hazard::HazardKind;
use crate::net::{PetriNet, PlaceKind};

/// Trial-units of supplier protection the buffer control holds when activated.
pub const BUFFER_WINDOW: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlId {
    Backup,
    Firewall,
    Buffer,
    Dual,
    Maintenance,
    Redundancy,
}

impl ControlId {
    pub fn all() -> [Self; 6] {
        [
            Self::Backup,
            Self::Firewall,
            Self::Buffer,
            Self::Dual,
            Self::Maintenance,
            Self::Redundancy,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Firewall => "firewall",
            Self::Buffer => "buffer",
            Self::Dual => "dual",
            Self::Maintenance => "maintenance",
            Self::Redundancy => "redundancy",
        }
    }

    /// Map an external control name to an id. Unknown names are a
    /// configuration error on the caller's side, so they map to `None` and
    /// the toggle becomes a no-op.
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.name() == name)
    }

    /// The mitigation place this control lights up in the mitigated net.
    pub fn place_id(&self) -> &'static str {
        match self {
            Self::Backup => "M1",
            Self::Firewall => "M2",
            Self::Buffer => "M3",
            Self::Dual => "M4",
            Self::Maintenance => "M5",
            Self::Redundancy => "M6",
        }
    }

    pub fn acquisition_cost(&self) -> f64 {
        match self {
            Self::Backup => 5_000.0,
            Self::Firewall => 3_000.0,
            Self::Buffer => 15_000.0,
            Self::Dual => 4_000.0,
            Self::Maintenance => 6_000.0,
            Self::Redundancy => 25_000.0,
        }
    }

    /// The hazard this control protects against, and by which fraction.
    pub fn reduces(&self) -> (HazardKind, f64) {
        match self {
            Self::Backup => (HazardKind::Ransomware, 0.40),
            Self::Firewall => (HazardKind::Ransomware, 0.35),
            Self::Buffer => (HazardKind::Supplier, 0.80),
            Self::Dual => (HazardKind::Supplier, 0.50),
            Self::Maintenance => (HazardKind::Equipment, 0.70),
            Self::Redundancy => (HazardKind::Equipment, 0.80),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MitigationRegistry {
    active: BTreeSet<ControlId>,
    buffer_remaining: u32,
}

impl MitigationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a control's membership. Activating the buffer refills its
    /// depletion window; deactivating it zeroes the window.
    pub fn toggle(&mut self, id: ControlId) {
        if self.active.remove(&id) {
            if id == ControlId::Buffer {
                self.buffer_remaining = 0;
            }
            debug!(control = id.name(), "mitigation deactivated");
        } else {
            self.active.insert(id);
            if id == ControlId::Buffer {
                self.buffer_remaining = BUFFER_WINDOW;
            }
            debug!(control = id.name(), "mitigation activated");
        }
    }

    pub fn is_active(&self, id: ControlId) -> bool {
        self.active.contains(&id)
    }

    pub fn any_active(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn active(&self) -> &BTreeSet<ControlId> {
        &self.active
    }

    pub fn buffer_remaining(&self) -> u32 {
        self.buffer_remaining
    }

    fn contributes(&self, id: ControlId, kind: HazardKind) -> bool {
        if !self.active.contains(&id) {
            return false;
        }
        let (reduced_kind, _) = id.reduces();
        if reduced_kind != kind {
            return false;
        }
        // An exhausted buffer stays listed active but no longer contributes.
        id != ControlId::Buffer || self.buffer_remaining > 0
    }

    /// Compounded probability multiplier for a hazard kind:
    /// product of (1 - fraction) over contributing active controls.
    pub fn reduction(&self, kind: HazardKind) -> f64 {
        ControlId::all()
            .into_iter()
            .filter(|&id| self.contributes(id, kind))
            .map(|id| 1.0 - id.reduces().1)
            .product()
    }

    /// Compounded incident-cost multiplier. Same compounding rule as the
    /// probability reduction.
    pub fn cost_reduction(&self, kind: HazardKind) -> f64 {
        self.reduction(kind)
    }

    /// Consume one trial-unit of buffer protection after a supplier firing
    /// that used it. Clamped at zero.
    pub fn deplete_buffer(&mut self) {
        if self.is_active(ControlId::Buffer) && self.buffer_remaining > 0 {
            self.buffer_remaining -= 1;
            if self.buffer_remaining == 0 {
                debug!("buffer stock exhausted");
            }
        }
    }

    /// Refill the buffer window on session reset, if the control is active.
    pub fn restore_buffer(&mut self) {
        self.buffer_remaining = if self.is_active(ControlId::Buffer) {
            BUFFER_WINDOW
        } else {
            0
        };
    }

    /// Sum of acquisition costs of the active controls.
    pub fn total_cost(&self) -> f64 {
        self.active.iter().map(|c| c.acquisition_cost()).sum()
    }

    /// Write each mitigation place's token from the active set. Must run
    /// after every toggle and after every reset.
    pub fn sync_places(&self, net: &mut PetriNet) {
        for id in ControlId::all() {
            let tokens = u8::from(self.active.contains(&id));
            net.set_tokens(id.place_id(), tokens);
        }
        debug_assert!(net
            .places
            .iter()
            .filter(|p| p.kind == PlaceKind::Mitigation)
            .all(|p| p.tokens <= 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compounding_reduction() {
        let mut registry = MitigationRegistry::new();
        registry.toggle(ControlId::Backup);
        registry.toggle(ControlId::Firewall);

        let multiplier = registry.reduction(HazardKind::Ransomware);
        assert!((multiplier - 0.39).abs() < 1e-12);
        assert!((0.02 * multiplier - 0.0078).abs() < 1e-12);
    }

    #[test]
    fn test_reduction_ignores_other_hazards() {
        let mut registry = MitigationRegistry::new();
        registry.toggle(ControlId::Maintenance);

        assert_eq!(registry.reduction(HazardKind::Ransomware), 1.0);
        assert!((registry.reduction(HazardKind::Equipment) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_toggle_buffer_manages_window() {
        let mut registry = MitigationRegistry::new();
        registry.toggle(ControlId::Buffer);
        assert_eq!(registry.buffer_remaining(), BUFFER_WINDOW);

        registry.toggle(ControlId::Buffer);
        assert_eq!(registry.buffer_remaining(), 0);
        assert!(!registry.any_active());

        // Reactivation refills the full window.
        registry.toggle(ControlId::Buffer);
        assert_eq!(registry.buffer_remaining(), BUFFER_WINDOW);
    }

    #[test]
    fn test_exhausted_buffer_stays_active_but_inert() {
        let mut registry = MitigationRegistry::new();
        registry.toggle(ControlId::Buffer);
        for _ in 0..BUFFER_WINDOW {
            assert!((registry.reduction(HazardKind::Supplier) - 0.2).abs() < 1e-12);
            registry.deplete_buffer();
        }

        assert_eq!(registry.buffer_remaining(), 0);
        assert!(registry.is_active(ControlId::Buffer));
        assert_eq!(registry.reduction(HazardKind::Supplier), 1.0);

        // Further depletion is a no-op, the counter never goes negative.
        registry.deplete_buffer();
        assert_eq!(registry.buffer_remaining(), 0);
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(ControlId::parse("backup"), Some(ControlId::Backup));
        assert_eq!(ControlId::parse("bakup"), None);
    }

    #[test]
    fn test_total_cost_sums_active_controls() {
        let mut registry = MitigationRegistry::new();
        assert_eq!(registry.total_cost(), 0.0);

        registry.toggle(ControlId::Backup);
        registry.toggle(ControlId::Redundancy);
        assert_eq!(registry.total_cost(), 30_000.0);
    }

    #[test]
    fn test_sync_places_mirrors_active_set() {
        let mut registry = MitigationRegistry::new();
        let mut net = PetriNet::mitigated();
        registry.toggle(ControlId::Firewall);
        registry.sync_places(&mut net);

        assert_eq!(net.tokens("M2"), 1);
        assert_eq!(net.tokens("M1"), 0);

        registry.toggle(ControlId::Firewall);
        registry.sync_places(&mut net);
        assert_eq!(net.tokens("M2"), 0);
    }
}

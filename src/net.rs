//! Static net topology for the three model variants.
//!
//! The three nets share one parameterized topology: the standard net carries
//! the nine physical places, the integrated net adds the cyber layer, and the
//! mitigated net adds the six mitigation places on top of that. Building all
//! three from the same tables keeps them structurally in sync.
//!
//! Places hold at most one token. Transitions carry a display-only `enabled`
//! flag; firing is driven by the hazard trigger, not by an enablement
//! predicate.

use std::collections::BTreeSet;

use crate::mitigation::ControlId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceKind {
    Normal,
    Disrupted,
    Recovery,
    Cyber,
    Mitigation,
}

#[derive(Clone, Debug)]
pub struct Place {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: PlaceKind,
    /// 0 or 1, never more.
    pub tokens: u8,
}

#[derive(Clone, Debug)]
pub struct Transition {
    pub id: &'static str,
    pub name: &'static str,
    /// Fault-tree hazard transition (sampled by the clock).
    pub fta: bool,
    pub cyber: bool,
    /// Display flag: has fired at least once since the last reset.
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetVariant {
    Standard,
    Integrated,
    Mitigated,
}

impl NetVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Integrated => "Integrated",
            Self::Mitigated => "Mitigated",
        }
    }

    fn has_cyber_layer(&self) -> bool {
        !matches!(self, Self::Standard)
    }
}

// (id, name, kind) rows; token baseline is derived from the kind.
const PHYSICAL_PLACES: [(&str, &str, PlaceKind); 9] = [
    ("P1", "Mfg Normal", PlaceKind::Normal),
    ("P2", "Mfg Disrupted", PlaceKind::Disrupted),
    ("P3", "Mfg Recovery", PlaceKind::Recovery),
    ("P4", "Dist Normal", PlaceKind::Normal),
    ("P5", "Dist Disrupted", PlaceKind::Disrupted),
    ("P6", "Dist Recovery", PlaceKind::Recovery),
    ("P7", "Cust Normal", PlaceKind::Normal),
    ("P8", "Cust Impacted", PlaceKind::Disrupted),
    ("P9", "Cust Recovery", PlaceKind::Recovery),
];

const CYBER_PLACES: [(&str, &str, PlaceKind); 3] = [
    ("P10", "IT Systems", PlaceKind::Cyber),
    ("P11", "Production Sys", PlaceKind::Cyber),
    ("P12", "Logistics Sys", PlaceKind::Cyber),
];

const MITIGATION_PLACES: [(&str, &str, PlaceKind); 6] = [
    ("M1", "Backup", PlaceKind::Mitigation),
    ("M2", "Firewall", PlaceKind::Mitigation),
    ("M3", "Buffer", PlaceKind::Mitigation),
    ("M4", "Dual Src", PlaceKind::Mitigation),
    ("M5", "Maint.", PlaceKind::Mitigation),
    ("M6", "Redund.", PlaceKind::Mitigation),
];

#[derive(Clone, Debug)]
pub struct PetriNet {
    pub variant: NetVariant,
    pub places: Vec<Place>,
    pub transitions: Vec<Transition>,
}

impl PetriNet {
    pub fn standard() -> Self {
        Self::build(NetVariant::Standard)
    }

    pub fn integrated() -> Self {
        Self::build(NetVariant::Integrated)
    }

    pub fn mitigated() -> Self {
        Self::build(NetVariant::Mitigated)
    }

    fn build(variant: NetVariant) -> Self {
        let mut places: Vec<Place> = PHYSICAL_PLACES
            .iter()
            .map(|&(id, name, kind)| Place {
                id,
                name,
                kind,
                tokens: baseline_tokens(kind),
            })
            .collect();

        if variant.has_cyber_layer() {
            places.extend(CYBER_PLACES.iter().map(|&(id, name, kind)| Place {
                id,
                name,
                kind,
                tokens: baseline_tokens(kind),
            }));
        }
        if variant == NetVariant::Mitigated {
            places.extend(MITIGATION_PLACES.iter().map(|&(id, name, kind)| Place {
                id,
                name,
                kind,
                tokens: 0,
            }));
        }

        let cyber = variant.has_cyber_layer();
        let mut transitions = vec![
            hazard_transition("T1", cyber, "Ransomware", "Physical Fail"),
            hazard_transition("T2", cyber, "Equipment", "Physical Fail"),
            hazard_transition("T3", cyber, "Supplier", "Impact"),
            plain_transition("T4", if cyber { "Cyber Cascade" } else { "Direct Impact" }),
            plain_transition("T5", if cyber { "Cascade Spread" } else { "Direct Impact" }),
            plain_transition("T6", "Begin Recovery"),
            plain_transition("T7", "Begin Recovery"),
            plain_transition("T8", "Begin Recovery"),
            plain_transition("T9", "Restore"),
            plain_transition("T10", "Restore"),
            plain_transition("T11", "Restore"),
        ];
        if cyber {
            transitions.push(Transition {
                id: "T12",
                name: "Cyber Attack",
                fta: false,
                cyber: true,
                enabled: false,
            });
            transitions.push(Transition {
                id: "T13",
                name: "Lateral Move",
                fta: false,
                cyber: true,
                enabled: false,
            });
        }

        Self {
            variant,
            places,
            transitions,
        }
    }

    /// Restore the all-normal baseline and clear every transition flag.
    ///
    /// Mitigation places are left at zero here; their tokens are a function
    /// of the active-control set and are restored by the registry.
    pub fn reset(&mut self) {
        for place in &mut self.places {
            place.tokens = if place.kind == PlaceKind::Mitigation {
                0
            } else {
                baseline_tokens(place.kind)
            };
        }
        for transition in &mut self.transitions {
            transition.enabled = false;
        }
    }

    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    pub fn tokens(&self, id: &str) -> u8 {
        self.place(id).map(|p| p.tokens).unwrap_or(0)
    }

    pub(crate) fn set_tokens(&mut self, id: &str, tokens: u8) {
        if let Some(place) = self.places.iter_mut().find(|p| p.id == id) {
            place.tokens = tokens.min(1);
        }
    }

    /// Move a token from one place to another. Destinations never exceed one
    /// token; a transfer out of an empty place still leaves it empty.
    pub(crate) fn transfer(&mut self, from: &str, to: &str) {
        self.set_tokens(from, 0);
        self.set_tokens(to, 1);
    }

    pub(crate) fn mark_fired(&mut self, id: &str) {
        if let Some(transition) = self.transitions.iter_mut().find(|t| t.id == id) {
            transition.enabled = true;
        }
    }

    /// Token vector in place order, for the observable surface.
    pub fn token_vector(&self) -> Vec<(&'static str, u8)> {
        self.places.iter().map(|p| (p.id, p.tokens)).collect()
    }
}

fn baseline_tokens(kind: PlaceKind) -> u8 {
    match kind {
        PlaceKind::Normal | PlaceKind::Cyber => 1,
        PlaceKind::Disrupted | PlaceKind::Recovery | PlaceKind::Mitigation => 0,
    }
}

fn hazard_transition(
    id: &'static str,
    cyber_variant: bool,
    fta_name: &'static str,
    plain_name: &'static str,
) -> Transition {
    Transition {
        id,
        name: if cyber_variant { fta_name } else { plain_name },
        fta: cyber_variant,
        cyber: false,
        enabled: false,
    }
}

fn plain_transition(id: &'static str, name: &'static str) -> Transition {
    Transition {
        id,
        name,
        fta: false,
        cyber: false,
        enabled: false,
    }
}

/// The three session nets, driven by the same hazard draw each trial.
#[derive(Clone, Debug)]
pub struct NetBank {
    pub standard: PetriNet,
    pub integrated: PetriNet,
    pub mitigated: PetriNet,
}

impl NetBank {
    pub fn new() -> Self {
        Self {
            standard: PetriNet::standard(),
            integrated: PetriNet::integrated(),
            mitigated: PetriNet::mitigated(),
        }
    }

    pub fn reset_all(&mut self) {
        for net in self.all_mut() {
            net.reset();
        }
    }

    pub(crate) fn all_mut(&mut self) -> [&mut PetriNet; 3] {
        [&mut self.standard, &mut self.integrated, &mut self.mitigated]
    }

    /// The two cyber-aware nets, targets of cascade stages.
    pub(crate) fn cyber_aware_mut(&mut self) -> [&mut PetriNet; 2] {
        [&mut self.integrated, &mut self.mitigated]
    }
}

impl Default for NetBank {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcKind {
    NormalFlow,
    Cascade,
    Cyber,
    Mitigation,
    DirectImpact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetArc {
    pub from: &'static str,
    pub to: &'static str,
    pub kind: ArcKind,
    /// Inhibitor arcs suppress firing probability rather than moving tokens.
    pub inhibitor: bool,
}

const fn flow(from: &'static str, to: &'static str) -> NetArc {
    NetArc {
        from,
        to,
        kind: ArcKind::NormalFlow,
        inhibitor: false,
    }
}

const fn cascade(from: &'static str, to: &'static str) -> NetArc {
    NetArc {
        from,
        to,
        kind: ArcKind::Cascade,
        inhibitor: false,
    }
}

const fn cyber(from: &'static str, to: &'static str) -> NetArc {
    NetArc {
        from,
        to,
        kind: ArcKind::Cyber,
        inhibitor: false,
    }
}

const fn mitigation(from: &'static str, to: &'static str, inhibitor: bool) -> NetArc {
    NetArc {
        from,
        to,
        kind: ArcKind::Mitigation,
        inhibitor,
    }
}

// Each tier's normal-flow cycle: normal -> fail -> disrupted -> recovery -> normal.
const TIER_FLOW_ARCS: [NetArc; 18] = [
    flow("P1", "T1"),
    flow("T1", "P2"),
    flow("P2", "T6"),
    flow("T6", "P3"),
    flow("P3", "T9"),
    flow("T9", "P1"),
    flow("P4", "T2"),
    flow("T2", "P5"),
    flow("P5", "T7"),
    flow("T7", "P6"),
    flow("P6", "T10"),
    flow("T10", "P4"),
    flow("P7", "T3"),
    flow("T3", "P8"),
    flow("P8", "T8"),
    flow("T8", "P9"),
    flow("P9", "T11"),
    flow("T11", "P7"),
];

const STANDARD_DIRECT_ARCS: [NetArc; 2] = [
    NetArc {
        from: "P2",
        to: "T4",
        kind: ArcKind::DirectImpact,
        inhibitor: false,
    },
    NetArc {
        from: "P5",
        to: "T5",
        kind: ArcKind::DirectImpact,
        inhibitor: false,
    },
];

const CYBER_LAYER_ARCS: [NetArc; 10] = [
    cyber("P10", "T12"),
    cyber("P1", "T12"),
    cascade("T12", "P2"),
    cascade("P2", "T4"),
    cascade("T4", "P5"),
    cascade("P5", "T5"),
    cascade("T5", "P8"),
    cyber("P10", "T13"),
    cyber("T13", "P11"),
    cyber("P11", "P12"),
];

/// The two arcs a control contributes to the mitigated net while active.
fn control_arcs(control: ControlId) -> [NetArc; 2] {
    match control {
        ControlId::Backup => [mitigation("M1", "T1", true), mitigation("M1", "T12", true)],
        ControlId::Firewall => [mitigation("M2", "T12", true), mitigation("M2", "T13", true)],
        ControlId::Buffer => [mitigation("M3", "P3", false), mitigation("M3", "T3", true)],
        ControlId::Dual => [mitigation("M4", "P1", false), mitigation("M4", "T1", true)],
        ControlId::Maintenance => [mitigation("M5", "T2", true), mitigation("M5", "P4", false)],
        ControlId::Redundancy => [mitigation("M6", "P4", false), mitigation("M6", "T2", true)],
    }
}

/// Current arc list for a net variant, for drawing and export.
///
/// Pure derivation: the mitigated net's arcs are the integrated arcs plus the
/// mitigation arcs gated by the active-control set. Nothing is cached and
/// nothing is mutated.
pub fn derive_arcs(variant: NetVariant, active: &BTreeSet<ControlId>) -> Vec<NetArc> {
    let mut arcs: Vec<NetArc> = TIER_FLOW_ARCS.to_vec();
    match variant {
        NetVariant::Standard => {
            arcs.extend(STANDARD_DIRECT_ARCS);
        }
        NetVariant::Integrated => {
            arcs.extend(CYBER_LAYER_ARCS);
        }
        NetVariant::Mitigated => {
            arcs.extend(CYBER_LAYER_ARCS);
            for control in ControlId::all() {
                if active.contains(&control) {
                    arcs.extend(control_arcs(control));
                }
            }
        }
    }
    arcs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_tokens() {
        let net = PetriNet::integrated();
        for place in &net.places {
            let expected = match place.kind {
                PlaceKind::Normal | PlaceKind::Cyber => 1,
                _ => 0,
            };
            assert_eq!(place.tokens, expected, "place {}", place.id);
        }
    }

    #[test]
    fn test_variants_share_physical_structure() {
        let standard = PetriNet::standard();
        let integrated = PetriNet::integrated();
        let mitigated = PetriNet::mitigated();

        assert_eq!(standard.places.len(), 9);
        assert_eq!(integrated.places.len(), 12);
        assert_eq!(mitigated.places.len(), 18);
        for (a, b) in standard.places.iter().zip(&integrated.places) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.kind, b.kind);
        }
        assert_eq!(standard.transitions.len(), 11);
        assert_eq!(integrated.transitions.len(), 13);
        assert_eq!(mitigated.transitions.len(), 13);
    }

    #[test]
    fn test_single_token_invariant_after_transfers() {
        let mut net = PetriNet::standard();
        net.transfer("P1", "P2");
        net.transfer("P1", "P2");
        net.transfer("P4", "P2");

        for place in &net.places {
            assert!(place.tokens <= 1, "place {}", place.id);
        }
        assert_eq!(net.tokens("P2"), 1);
        assert_eq!(net.tokens("P1"), 0);
        assert_eq!(net.tokens("P4"), 0);
    }

    #[test]
    fn test_reset_restores_baseline_and_flags() {
        let mut net = PetriNet::mitigated();
        net.transfer("P1", "P2");
        net.mark_fired("T1");
        net.set_tokens("M1", 1);

        net.reset();

        assert_eq!(net.tokens("P1"), 1);
        assert_eq!(net.tokens("P2"), 0);
        assert_eq!(net.tokens("M1"), 0);
        assert!(net.transitions.iter().all(|t| !t.enabled));
    }

    #[test]
    fn test_derive_arcs_gated_by_active_set() {
        let none = BTreeSet::new();
        let mut active = BTreeSet::new();
        active.insert(ControlId::Backup);

        let bare = derive_arcs(NetVariant::Mitigated, &none);
        let with_backup = derive_arcs(NetVariant::Mitigated, &active);

        assert_eq!(with_backup.len(), bare.len() + 2);
        assert!(with_backup
            .iter()
            .any(|a| a.from == "M1" && a.to == "T1" && a.inhibitor));
        assert!(bare.iter().all(|a| a.kind != ArcKind::Mitigation));
    }

    #[test]
    fn test_derive_arcs_standard_has_direct_impacts() {
        let arcs = derive_arcs(NetVariant::Standard, &BTreeSet::new());
        assert_eq!(
            arcs.iter()
                .filter(|a| a.kind == ArcKind::DirectImpact)
                .count(),
            2
        );
        assert!(arcs.iter().all(|a| a.kind != ArcKind::Cyber));
    }
}

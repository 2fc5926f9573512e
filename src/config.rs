//! Live-adjustable simulation parameters with boundary validation.
//!
//! Setters reject out-of-range values and leave the prior value in effect;
//! the engine never runs with an out-of-range probability.

use serde::Serialize;
use thiserror::Error;

use crate::hazard::HazardKind;

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("hazard probability must be within [0, 1], got {0}")]
    ProbabilityOutOfRange(f64),
    #[error("cascade delay must be greater than zero, got {0} ms")]
    NonPositiveDelay(u64),
    #[error("cost multiplier must be non-negative, got {0}")]
    NegativeCostMultiplier(f64),
    #[error("speed multiplier must be greater than zero, got {0}")]
    NonPositiveSpeed(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SimulationParams {
    pub ransomware_prob: f64,
    pub equipment_prob: f64,
    pub supplier_prob: f64,
    pub cascade_delay_ms: u64,
    /// Display-only recovery speed factor; carried for the observable
    /// surface and the export snapshot, unused by the core logic.
    pub recovery_factor: u32,
    pub cost_multiplier: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            ransomware_prob: 0.02,
            equipment_prob: 0.05,
            supplier_prob: 0.01,
            cascade_delay_ms: 800,
            recovery_factor: 3,
            cost_multiplier: 1.0,
        }
    }
}

impl SimulationParams {
    pub fn hazard_prob(&self, kind: HazardKind) -> f64 {
        match kind {
            HazardKind::Ransomware => self.ransomware_prob,
            HazardKind::Equipment => self.equipment_prob,
            HazardKind::Supplier => self.supplier_prob,
        }
    }

    pub fn set_hazard_prob(&mut self, kind: HazardKind, prob: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&prob) || prob.is_nan() {
            return Err(ConfigError::ProbabilityOutOfRange(prob));
        }
        match kind {
            HazardKind::Ransomware => self.ransomware_prob = prob,
            HazardKind::Equipment => self.equipment_prob = prob,
            HazardKind::Supplier => self.supplier_prob = prob,
        }
        Ok(())
    }

    pub fn set_cascade_delay_ms(&mut self, delay_ms: u64) -> Result<(), ConfigError> {
        if delay_ms == 0 {
            return Err(ConfigError::NonPositiveDelay(delay_ms));
        }
        self.cascade_delay_ms = delay_ms;
        Ok(())
    }

    pub fn set_cost_multiplier(&mut self, multiplier: f64) -> Result<(), ConfigError> {
        if multiplier < 0.0 || multiplier.is_nan() {
            return Err(ConfigError::NegativeCostMultiplier(multiplier));
        }
        self.cost_multiplier = multiplier;
        Ok(())
    }

    pub fn set_recovery_factor(&mut self, factor: u32) {
        self.recovery_factor = factor;
    }
}

/// Validate an animation-speed multiplier. Speed scales delays inversely and
/// lives on the engine, not in the exported parameter set.
pub fn validate_speed(speed: f64) -> Result<f64, ConfigError> {
    if speed > 0.0 && speed.is_finite() {
        Ok(speed)
    } else {
        Err(ConfigError::NonPositiveSpeed(speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_probability_keeps_prior_value() {
        let mut params = SimulationParams::default();
        let err = params.set_hazard_prob(HazardKind::Ransomware, 1.5);
        assert_eq!(err, Err(ConfigError::ProbabilityOutOfRange(1.5)));
        assert_eq!(params.ransomware_prob, 0.02);

        assert!(params.set_hazard_prob(HazardKind::Ransomware, 0.5).is_ok());
        assert_eq!(params.ransomware_prob, 0.5);
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut params = SimulationParams::default();
        assert!(params.set_cascade_delay_ms(0).is_err());
        assert_eq!(params.cascade_delay_ms, 800);
    }

    #[test]
    fn test_negative_cost_multiplier_rejected() {
        let mut params = SimulationParams::default();
        assert!(params.set_cost_multiplier(-0.1).is_err());
        assert!(params.set_cost_multiplier(0.0).is_ok());
        assert_eq!(params.cost_multiplier, 0.0);
    }

    #[test]
    fn test_speed_validation() {
        assert!(validate_speed(2.0).is_ok());
        assert!(validate_speed(0.0).is_err());
        assert!(validate_speed(f64::INFINITY).is_err());
    }
}

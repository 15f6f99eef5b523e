//! Simulation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Capital and friction parameters for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Initial account cash.
    pub init_cash: f64,
    /// Linear commission rate, charged on both sides of a trade.
    pub commission_rate: f64,
    /// Stamp tax rate, charged only on full liquidation.
    pub stamp_tax_rate: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            init_cash: 100_000.0,
            commission_rate: 2e-4,
            stamp_tax_rate: 1e-3,
        }
    }
}

impl SimulationParams {
    /// Check parameter ranges. Run before simulating, never during.
    pub fn validate(&self) -> Result<()> {
        if !(self.init_cash.is_finite() && self.init_cash > 0.0) {
            return Err(Error::config(format!(
                "init_cash must be positive, got {}",
                self.init_cash
            )));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(Error::config(format!(
                "commission_rate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        if !(0.0..1.0).contains(&self.stamp_tax_rate) {
            return Err(Error::config(format!(
                "stamp_tax_rate must be in [0, 1), got {}",
                self.stamp_tax_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_validate() {
        let params = SimulationParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.commission_rate, 2e-4);
        assert_eq!(params.stamp_tax_rate, 1e-3);
    }

    #[test]
    fn test_bad_params_rejected() {
        let mut params = SimulationParams::default();
        params.init_cash = 0.0;
        assert!(params.validate().is_err());

        let mut params = SimulationParams::default();
        params.commission_rate = 1.0;
        assert!(params.validate().is_err());

        let mut params = SimulationParams::default();
        params.stamp_tax_rate = -0.001;
        assert!(params.validate().is_err());

        let mut params = SimulationParams::default();
        params.init_cash = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_roundtrip_json() {
        let params = SimulationParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: SimulationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.init_cash, params.init_cash);
    }
}

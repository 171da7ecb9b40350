use crate::types::Momentum;
use serde::{Deserialize, Serialize};

/// Value that disables a threshold
pub const DISABLED: f64 = -1.0;

/// Kinematic selection applied to every source record before projection
///
/// A negative threshold disables that cut; both are disabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Minimum transverse momentum
    #[serde(default = "disabled")]
    pub min_pt: f64,

    /// Maximum absolute pseudorapidity
    #[serde(default = "disabled")]
    pub max_eta: f64,
}

fn disabled() -> f64 {
    DISABLED
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            min_pt: DISABLED,
            max_eta: DISABLED,
        }
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_pt(mut self, min_pt: f64) -> Self {
        self.min_pt = min_pt;
        self
    }

    pub fn with_max_eta(mut self, max_eta: f64) -> Self {
        self.max_eta = max_eta;
        self
    }

    pub fn passes(&self, p4: &Momentum) -> bool {
        if self.min_pt >= 0.0 && p4.pt < self.min_pt {
            return false;
        }
        if self.max_eta >= 0.0 && p4.eta.abs() > self.max_eta {
            return false;
        }
        true
    }

    pub(crate) fn validate(&self, section: &str) -> crate::Result<()> {
        if !self.min_pt.is_finite() || !self.max_eta.is_finite() {
            return Err(crate::SkimError::Config(format!(
                "{}: selection thresholds must be finite",
                section
            )));
        }
        Ok(())
    }
}

//! Ledger configuration.

use serde::{Deserialize, Serialize};

/// Default tolerance applied to the 100% ceiling check.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Configuration for a new allocation ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Slack allowed above 100% to absorb floating-point drift
    pub tolerance: f64,
    /// Dollar value that 100% represents when the ledger is created
    pub total_budget: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            total_budget: 0.0,
        }
    }
}

impl LedgerConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ceiling tolerance. Negative or non-finite values fall back to the default.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = if tolerance.is_finite() && tolerance >= 0.0 {
            tolerance
        } else {
            DEFAULT_TOLERANCE
        };
        self
    }

    /// Set the initial total budget.
    pub fn with_total_budget(mut self, total_budget: f64) -> Self {
        self.total_budget = total_budget;
        self
    }
}

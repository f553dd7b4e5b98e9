//! A single named share of the budget.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named percentage share of a budget.
///
/// Buckets carry no validation of their own; the owning
/// [`AllocationLedger`](super::AllocationLedger) enforces the global
/// allocation invariant before any percentage is changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Unique, case-sensitive name within a ledger
    name: String,
    /// Share of the total budget, in `[0, 100]`
    percentage: f64,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(name: impl Into<String>, percentage: f64) -> Self {
        Self {
            name: name.into(),
            percentage,
        }
    }

    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current percentage share.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Replace the percentage share.
    pub(crate) fn set_percentage(&mut self, percentage: f64) {
        self.percentage = percentage;
    }

    /// Dollar value of this bucket against the given total budget.
    pub fn amount(&self, total_budget: f64) -> f64 {
        (self.percentage / 100.0) * total_budget
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket(name='{}', percentage={:.2}%)", self.name, self.percentage)
    }
}

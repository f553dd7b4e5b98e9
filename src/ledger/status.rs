//! Read-only ledger snapshots for display and export.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bucket::Bucket;
use super::manager::AllocationLedger;

const BANNER_WIDTH: usize = 60;

/// One bucket with its derived dollar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketView {
    pub name: String,
    pub percentage: f64,
    pub amount: f64,
}

impl BucketView {
    /// Build a view of a bucket against the given total budget.
    pub fn from_bucket(bucket: &Bucket, total_budget: f64) -> Self {
        Self {
            name: bucket.name().to_string(),
            percentage: bucket.percentage(),
            amount: bucket.amount(total_budget),
        }
    }
}

/// Point-in-time snapshot of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStatus {
    /// Dollar value of 100%
    pub total_budget: f64,
    /// Sum of bucket percentages
    pub total_percentage: f64,
    /// `total_percentage - 100`
    pub percentage_difference: f64,
    /// Whether the 100% ceiling holds
    pub is_valid: bool,
    /// Whether exactly 100% is allocated
    pub is_fully_allocated: bool,
    /// Share not held by any bucket
    pub unallocated_percentage: f64,
    /// Buckets in insertion order
    pub buckets: Vec<BucketView>,
}

impl LedgerStatus {
    /// Capture the current state of a ledger.
    pub fn from_ledger(ledger: &AllocationLedger) -> Self {
        Self {
            total_budget: ledger.total_budget(),
            total_percentage: ledger.total_percentage(),
            percentage_difference: ledger.percentage_difference(),
            is_valid: ledger.is_percentage_valid(),
            is_fully_allocated: ledger.is_fully_allocated(),
            unallocated_percentage: ledger.unallocated_percentage(),
            buckets: ledger.rebalance(),
        }
    }

    /// Dollar value of the unallocated share.
    pub fn unallocated_amount(&self) -> f64 {
        (self.unallocated_percentage / 100.0) * self.total_budget
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let banner = "=".repeat(BANNER_WIDTH);
        let name_width = self
            .buckets
            .iter()
            .map(|b| b.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("unallocated".len());

        writeln!(f, "{}", banner)?;
        writeln!(f, "BUCKET LEDGER STATUS")?;
        writeln!(f, "{}", banner)?;
        writeln!(f, "Total budget: ${:.2}", self.total_budget)?;
        if self.buckets.is_empty() {
            writeln!(f, "  (no buckets)")?;
        }
        for bucket in &self.buckets {
            writeln!(
                f,
                "  {:<width$}  {:>7.2}%  ${:.2}",
                bucket.name,
                bucket.percentage,
                bucket.amount,
                width = name_width
            )?;
        }
        writeln!(
            f,
            "  {:<width$}  {:>7.2}%  ${:.2}",
            "unallocated",
            self.unallocated_percentage,
            self.unallocated_amount(),
            width = name_width
        )?;
        writeln!(f, "Total percentage: {:.2}%", self.total_percentage)?;
        writeln!(f, "Difference from 100%: {:+.2}", self.percentage_difference)?;
        writeln!(f, "Percentage valid: {}", self.is_valid)?;
        writeln!(f, "Fully allocated: {}", self.is_fully_allocated)?;
        write!(f, "{}", banner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger() -> AllocationLedger {
        let mut ledger = AllocationLedger::with_total_budget(2000.0);
        ledger.add_bucket("rent", 50.0).unwrap();
        ledger.add_bucket("food", 15.0).unwrap();
        ledger
    }

    #[test]
    fn test_status_snapshot() {
        let status = sample_ledger().status();

        assert_eq!(status.total_budget, 2000.0);
        assert_eq!(status.total_percentage, 65.0);
        assert_eq!(status.percentage_difference, -35.0);
        assert!(status.is_valid);
        assert!(!status.is_fully_allocated);
        assert_eq!(status.unallocated_percentage, 35.0);
        assert_eq!(status.buckets.len(), 2);
        assert_eq!(status.buckets[1].name, "food");
        assert!((status.buckets[1].amount - 300.0).abs() < 1e-9);
        assert!((status.unallocated_amount() - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_block_format() {
        let rendered = sample_ledger().status().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "=".repeat(BANNER_WIDTH));
        assert_eq!(lines[1], "BUCKET LEDGER STATUS");
        assert!(rendered.contains("Total budget: $2000.00"));
        assert!(rendered.contains("rent"));
        assert!(rendered.contains("$1000.00"));
        assert!(rendered.contains("Total percentage: 65.00%"));
        assert!(rendered.contains("Difference from 100%: -35.00"));
        assert!(rendered.contains("Percentage valid: true"));
        assert_eq!(lines.last().copied(), Some("=".repeat(BANNER_WIDTH).as_str()));
    }

    #[test]
    fn test_status_block_empty_ledger() {
        let rendered = AllocationLedger::new().status().to_string();
        assert!(rendered.contains("(no buckets)"));
        assert!(rendered.contains("Total percentage: 0.00%"));
    }

    #[test]
    fn test_status_serializes_to_json() {
        let status = sample_ledger().status();
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["total_percentage"], 65.0);
        assert_eq!(json["buckets"][0]["name"], "rent");
    }
}

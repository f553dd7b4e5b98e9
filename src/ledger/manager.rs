//! Allocation ledger: owns the buckets and enforces the 100% ceiling.
//!
//! Percentages are the only stored quantity. Dollar figures are always
//! derived on read from `percentage / 100 * total_budget`, so changing the
//! total budget never leaves a stale amount behind.
//!
//! Unallocated space is implicit: it is whatever `100 - total` leaves over.
//! No bucket stands in for it.

use serde::Serialize;
use tracing::debug;

use super::bucket::Bucket;
use super::config::LedgerConfig;
use super::error::{LedgerError, LedgerResult};
use super::status::{BucketView, LedgerStatus};

/// Bucket that keeps its share when the ledger is scaled to 100%.
pub const RENT_BUCKET: &str = "rent";

/// Percentage that represents the whole budget.
pub const FULL_ALLOCATION: f64 = 100.0;

/// Percentage-based ledger of named buckets.
///
/// Invariant: the sum of all bucket percentages never exceeds
/// [`FULL_ALLOCATION`] by more than the configured tolerance. Every mutating
/// method checks feasibility before touching state, so a returned error
/// always means the ledger is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationLedger {
    /// Buckets in insertion order
    buckets: Vec<Bucket>,
    /// Dollar value of 100%
    total_budget: f64,
    /// Slack allowed above 100%
    tolerance: f64,
}

impl Default for AllocationLedger {
    fn default() -> Self {
        Self::with_config(LedgerConfig::default())
    }
}

impl AllocationLedger {
    /// Create an empty ledger with a zero total budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger from configuration.
    pub fn with_config(config: LedgerConfig) -> Self {
        let total_budget = if config.total_budget.is_finite() && config.total_budget >= 0.0 {
            config.total_budget
        } else {
            0.0
        };
        let tolerance = config.tolerance;
        let config = config.with_tolerance(tolerance);
        Self {
            buckets: Vec::new(),
            total_budget,
            tolerance: config.tolerance,
        }
    }

    /// Create an empty ledger anchored to the given total budget.
    pub fn with_total_budget(total_budget: f64) -> Self {
        Self::with_config(LedgerConfig::default().with_total_budget(total_budget))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.buckets.iter().position(|b| b.name() == name)
    }

    /// Get a bucket by name.
    pub fn get_bucket(&self, name: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.name() == name)
    }

    /// Whether a bucket with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All buckets in insertion order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Bucket names in insertion order.
    pub fn bucket_names(&self) -> Vec<&str> {
        self.buckets.iter().map(Bucket::name).collect()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the ledger holds no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Percentage share of a bucket.
    pub fn bucket_percentage(&self, name: &str) -> Option<f64> {
        self.get_bucket(name).map(Bucket::percentage)
    }

    /// Dollar value of a bucket, derived from its percentage.
    pub fn bucket_amount(&self, name: &str) -> Option<f64> {
        self.get_bucket(name).map(|b| b.amount(self.total_budget))
    }

    /// Dollar value that 100% represents.
    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    /// Ceiling tolerance in percentage points.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sum of all bucket percentages.
    pub fn total_percentage(&self) -> f64 {
        self.buckets.iter().map(Bucket::percentage).sum()
    }

    /// Difference between the allocated total and 100% (positive means over).
    pub fn percentage_difference(&self) -> f64 {
        self.total_percentage() - FULL_ALLOCATION
    }

    /// Whether the allocated total respects the 100% ceiling.
    pub fn is_percentage_valid(&self) -> bool {
        self.total_percentage() <= FULL_ALLOCATION + self.tolerance
    }

    /// Whether the allocated total is 100% within tolerance.
    pub fn is_fully_allocated(&self) -> bool {
        self.percentage_difference().abs() <= self.tolerance
    }

    /// Share of the budget not held by any bucket.
    pub fn unallocated_percentage(&self) -> f64 {
        (FULL_ALLOCATION - self.total_percentage()).max(0.0)
    }

    /// Dollar value of the unallocated share.
    pub fn unallocated_amount(&self) -> f64 {
        (self.unallocated_percentage() / FULL_ALLOCATION) * self.total_budget
    }

    /// Sum of all bucket dollar values.
    pub fn total_allocated_amount(&self) -> f64 {
        self.buckets
            .iter()
            .map(|b| b.amount(self.total_budget))
            .sum()
    }

    /// Add a new bucket.
    ///
    /// Fails on a duplicate or invalid name, an out-of-range percentage, or
    /// when the unallocated share cannot hold `percentage`. The request is
    /// never clamped.
    pub fn add_bucket(&mut self, name: &str, percentage: f64) -> LedgerResult<()> {
        if let Err(err) = self.validate_add(name, percentage) {
            return rejected("add_bucket", err);
        }

        self.buckets.push(Bucket::new(name, percentage));
        debug!(bucket = name, percentage, "added bucket");
        Ok(())
    }

    fn validate_add(&self, name: &str, percentage: f64) -> LedgerResult<()> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(LedgerError::DuplicateBucket(name.to_string()));
        }
        validate_percentage(percentage)?;
        self.check_capacity(self.total_percentage(), percentage)
    }

    /// Remove a bucket, returning it. Its share becomes unallocated.
    pub fn remove_bucket(&mut self, name: &str) -> LedgerResult<Bucket> {
        let Some(index) = self.position(name) else {
            return rejected("remove_bucket", LedgerError::BucketNotFound(name.to_string()));
        };

        let removed = self.buckets.remove(index);
        debug!(bucket = name, percentage = removed.percentage(), "removed bucket");
        Ok(removed)
    }

    /// Change a bucket's percentage, returning the previous value.
    pub fn resize_bucket(&mut self, name: &str, new_percentage: f64) -> LedgerResult<f64> {
        let Some(index) = self.position(name) else {
            return rejected("resize_bucket", LedgerError::BucketNotFound(name.to_string()));
        };
        if let Err(err) = validate_percentage(new_percentage) {
            return rejected("resize_bucket", err);
        }

        let old_percentage = self.buckets[index].percentage();
        let others_total = self.total_percentage() - old_percentage;
        if let Err(err) = self.check_capacity(others_total, new_percentage) {
            return rejected("resize_bucket", err);
        }

        self.buckets[index].set_percentage(new_percentage);
        debug!(
            bucket = name,
            from = old_percentage,
            to = new_percentage,
            "resized bucket"
        );
        Ok(old_percentage)
    }

    /// Move a dollar amount into (or, when negative, out of) a bucket.
    ///
    /// The bucket's dollar value never drops below zero. Returns the new
    /// percentage.
    pub fn add_amount_to_bucket(&mut self, name: &str, amount: f64) -> LedgerResult<f64> {
        let Some(index) = self.position(name) else {
            return rejected("add_amount", LedgerError::BucketNotFound(name.to_string()));
        };
        if self.total_budget <= 0.0 {
            return rejected("add_amount", LedgerError::NoTotalBudget);
        }
        if !amount.is_finite() {
            return rejected("add_amount", LedgerError::InvalidAmount(amount));
        }

        let old_percentage = self.buckets[index].percentage();
        let current_dollars = self.buckets[index].amount(self.total_budget);
        let new_dollars = (current_dollars + amount).max(0.0);
        let requested = (new_dollars / self.total_budget) * FULL_ALLOCATION;

        let others_total = self.total_percentage() - old_percentage;
        if let Err(err) = self.check_capacity(others_total, requested) {
            return rejected("add_amount", err);
        }
        // drift inside the tolerance never lifts one bucket above 100%
        let new_percentage = requested.min(FULL_ALLOCATION);

        self.buckets[index].set_percentage(new_percentage);
        debug!(
            bucket = name,
            amount,
            from = old_percentage,
            to = new_percentage,
            "applied amount to bucket"
        );
        Ok(new_percentage)
    }

    /// Take a dollar amount out of a bucket. Returns the new percentage.
    pub fn subtract_amount_from_bucket(&mut self, name: &str, amount: f64) -> LedgerResult<f64> {
        self.add_amount_to_bucket(name, -amount)
    }

    /// Replace the dollar anchor. Percentages are left as they are.
    pub fn set_total_budget(&mut self, amount: f64) -> LedgerResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return rejected("set_total_budget", LedgerError::InvalidAmount(amount));
        }

        debug!(from = self.total_budget, to = amount, "set total budget");
        self.total_budget = amount;
        Ok(())
    }

    /// Derived dollar allocation of every bucket.
    ///
    /// Amounts are never cached, so there is nothing to recompute; this only
    /// reports the current split.
    pub fn rebalance(&self) -> Vec<BucketView> {
        self.buckets
            .iter()
            .map(|b| BucketView::from_bucket(b, self.total_budget))
            .collect()
    }

    /// Scale buckets so the allocated total becomes exactly 100%.
    ///
    /// A bucket named [`RENT_BUCKET`] keeps its percentage; every other bucket
    /// is multiplied by one factor so that together they fill `100 - rent`.
    /// When the other buckets are all at zero, `rent` alone takes 100%.
    pub fn auto_resize_to_100_percent(&mut self) -> LedgerResult<()> {
        if self.buckets.is_empty() {
            return rejected("auto_resize", LedgerError::NoBuckets);
        }

        let rent_index = self.position(RENT_BUCKET);
        let others_total: f64 = self
            .buckets
            .iter()
            .filter(|b| b.name() != RENT_BUCKET)
            .map(Bucket::percentage)
            .sum();

        if others_total <= 0.0 {
            let Some(index) = rent_index else {
                return rejected("auto_resize", LedgerError::NothingToScale);
            };
            self.buckets[index].set_percentage(FULL_ALLOCATION);
            debug!("rent is the only allocated bucket, resized to 100%");
            return Ok(());
        }

        let rent_percentage = rent_index.map_or(0.0, |i| self.buckets[i].percentage());
        let target = (FULL_ALLOCATION - rent_percentage).max(0.0);

        // each share of `others_total` is at most 1, so results stay within `target`
        let scaled: Vec<Option<f64>> = self
            .buckets
            .iter()
            .map(|b| (b.name() != RENT_BUCKET).then(|| b.percentage() / others_total * target))
            .collect();
        if let Some(bad) = scaled
            .iter()
            .flatten()
            .find(|pct| !pct.is_finite() || **pct < 0.0)
        {
            return rejected("auto_resize", LedgerError::InvalidPercentage(*bad));
        }

        for (bucket, pct) in self.buckets.iter_mut().zip(scaled) {
            if let Some(pct) = pct {
                bucket.set_percentage(pct);
            }
        }

        debug!(target, rent = rent_percentage, "scaled buckets to 100%");
        Ok(())
    }

    /// Snapshot of the ledger for display or serialization.
    pub fn status(&self) -> LedgerStatus {
        LedgerStatus::from_ledger(self)
    }

    /// One-line summary: budget, total percentage and sorted bucket names.
    pub fn summary(&self) -> String {
        let mut names = self.bucket_names();
        names.sort_unstable();
        format!(
            "Budget=${:.2} | Total%={:.2} | Buckets=[{}]",
            self.total_budget,
            self.total_percentage(),
            names.join(", ")
        )
    }

    fn check_capacity(&self, others_total: f64, requested: f64) -> LedgerResult<()> {
        if others_total + requested > FULL_ALLOCATION + self.tolerance {
            return Err(LedgerError::ExceedsCapacity {
                requested,
                available: (FULL_ALLOCATION - others_total).max(0.0),
            });
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> LedgerResult<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(LedgerError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn validate_percentage(percentage: f64) -> LedgerResult<()> {
    if !percentage.is_finite() || !(0.0..=FULL_ALLOCATION).contains(&percentage) {
        return Err(LedgerError::InvalidPercentage(percentage));
    }
    Ok(())
}

fn rejected<T>(operation: &'static str, err: LedgerError) -> LedgerResult<T> {
    debug!(operation, reason = %err, "ledger mutation rejected");
    Err(err)
}

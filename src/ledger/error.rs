use thiserror::Error;

/// Errors that can occur during ledger operations.
///
/// Every variant describes a rejected mutation; the ledger is left unchanged
/// whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// A bucket with this name is already present.
    #[error("bucket '{0}' already exists")]
    DuplicateBucket(String),

    /// No bucket with this name is present.
    #[error("bucket '{0}' does not exist")]
    BucketNotFound(String),

    /// The mutation would push the allocated total over 100%.
    #[error("would exceed 100% total ({requested:.2}% requested, {available:.2}% available)")]
    ExceedsCapacity {
        /// Percentage the bucket would end up with
        requested: f64,
        /// Percentage that bucket could hold without breaking the ceiling
        available: f64,
    },

    /// Bucket names must be a single non-empty word.
    #[error("invalid bucket name '{0}'")]
    InvalidName(String),

    /// Percentages must be finite and within `[0, 100]`.
    #[error("percentage {0} is outside 0-100")]
    InvalidPercentage(f64),

    /// Dollar figures must be finite (and non-negative for the total budget).
    #[error("invalid amount {0}")]
    InvalidAmount(f64),

    /// Dollar conversions need a positive total budget.
    #[error("total budget must be greater than zero")]
    NoTotalBudget,

    /// The ledger holds no buckets.
    #[error("no buckets exist")]
    NoBuckets,

    /// Every bucket is at 0% and none is exempt, so there is nothing to scale.
    #[error("no allocated buckets to scale")]
    NothingToScale,
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

//! Percentage-based budget allocation ledger.
//!
//! This module holds the allocation engine: a set of named buckets that
//! share one total budget, with the guarantee that their percentages never
//! add up to more than 100%.
//!
//! # Overview
//!
//! The ledger consists of:
//! - **Bucket**: a named percentage share
//! - **AllocationLedger**: owns the buckets, enforces the ceiling and derives dollar figures
//! - **LedgerStatus**: a serializable snapshot with a formatted status block
//! - **LedgerConfig**: tolerance and initial total budget
//!
//! # Example
//!
//! ```
//! use bucketwise::ledger::AllocationLedger;
//!
//! let mut ledger = AllocationLedger::with_total_budget(2000.0);
//! ledger.add_bucket("rent", 50.0).unwrap();
//! ledger.add_bucket("food", 10.0).unwrap();
//!
//! // $100 more for food is 5 more points of a $2000 budget
//! ledger.add_amount_to_bucket("food", 100.0).unwrap();
//! assert!((ledger.bucket_percentage("food").unwrap() - 15.0).abs() < 1e-9);
//!
//! // Over the ceiling is rejected and nothing changes
//! assert!(ledger.add_bucket("fun", 40.0).is_err());
//! assert!((ledger.total_percentage() - 65.0).abs() < 1e-9);
//! ```

mod bucket;
mod config;
mod error;
mod manager;
mod status;

pub use bucket::Bucket;
pub use config::{LedgerConfig, DEFAULT_TOLERANCE};
pub use error::{LedgerError, LedgerResult};
pub use manager::{AllocationLedger, FULL_ALLOCATION, RENT_BUCKET};
pub use status::{BucketView, LedgerStatus};

//! Percentage-based budget allocation with a line-oriented command language.
//!
//! - [`ledger`]: buckets, the 100% ceiling and dollar conversion
//! - [`command`]: parsing and executing command blocks
//! - [`session`]: one ledger per user session
//! - [`settings`]: layered configuration for the binaries

pub mod command;
pub mod ledger;
pub mod session;
pub mod settings;

pub use command::{CommandInterpreter, CommandOutcome, ExecutionReport};
pub use ledger::{AllocationLedger, Bucket, LedgerConfig, LedgerError, LedgerResult, LedgerStatus};
pub use session::Session;
pub use settings::{Settings, SettingsError};

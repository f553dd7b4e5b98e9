//! Line-oriented command language for driving an allocation ledger.
//!
//! Commands usually come from a planner model, a script or a person typing
//! at a prompt. The parser turns each line into a typed [`Command`]; the
//! interpreter applies it to a ledger and renders one outcome per line.
//!
//! # Example
//!
//! ```
//! use bucketwise::command::CommandInterpreter;
//! use bucketwise::ledger::AllocationLedger;
//!
//! let mut ledger = AllocationLedger::new();
//! let output = CommandInterpreter::new().run(&mut ledger, "FOO BAR\nADD_BUCKET x 10");
//!
//! assert_eq!(output.lines().count(), 2);
//! assert!(output.starts_with("❌ Invalid command"));
//! ```

mod interpreter;
mod parser;

pub use interpreter::{
    CommandInterpreter, CommandOutcome, ExecutionReport, FAILURE_MARKER, SUCCESS_MARKER,
};
pub use parser::{parse_command, Command, CommandKind, CommandParser, ParseError};

//! Executes parsed commands against an allocation ledger.
//!
//! A block is processed line by line in input order. Every line succeeds or
//! fails on its own: there is no rollback across lines, and no failure ever
//! escapes as an error. Parse problems, rejected mutations and missing
//! buckets all become [`CommandOutcome`]s.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use super::parser::{Command, CommandParser, ParseError};
use crate::ledger::{AllocationLedger, LedgerError};

/// Prefix for a line that took effect.
pub const SUCCESS_MARKER: &str = "✅";
/// Prefix for a line that was rejected.
pub const FAILURE_MARKER: &str = "❌";

/// Result of executing one command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Trimmed source line
    pub line: String,
    /// Whether the command took effect
    pub success: bool,
    /// Human-readable description
    pub message: String,
}

impl CommandOutcome {
    /// Create a successful outcome.
    pub fn success(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            success: true,
            message: message.into(),
        }
    }

    /// Create a failed outcome.
    pub fn failure(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            success: false,
            message: message.into(),
        }
    }

    /// Marker this outcome is rendered with.
    pub fn marker(&self) -> &'static str {
        if self.success {
            SUCCESS_MARKER
        } else {
            FAILURE_MARKER
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker(), self.message)
    }
}

/// Outcomes of one command block, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcomes: Vec<CommandOutcome>,
}

impl ExecutionReport {
    /// Number of executed lines.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no line produced an outcome.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of lines that took effect.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    /// Number of rejected lines.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Whether every executed line took effect.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", outcome)?;
        }
        Ok(())
    }
}

/// Interpreter for the line-oriented command language.
#[derive(Debug, Clone, Default)]
pub struct CommandInterpreter {
    parser: CommandParser,
}

impl CommandInterpreter {
    /// Create a new interpreter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a newline-separated block against the ledger.
    ///
    /// Blank lines and `NO_ACTION` produce no outcome.
    pub fn execute(&self, ledger: &mut AllocationLedger, block: &str) -> ExecutionReport {
        let outcomes: Vec<CommandOutcome> = self
            .parser
            .parse_block(block)
            .into_iter()
            .filter_map(|(line, parsed)| self.apply(ledger, line, parsed))
            .collect();

        let report = ExecutionReport { outcomes };
        info!(
            lines = report.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "executed command block"
        );
        report
    }

    /// Execute a block and render one result line per executed command.
    pub fn run(&self, ledger: &mut AllocationLedger, block: &str) -> String {
        self.execute(ledger, block).to_string()
    }

    /// Execute a single line. Returns `None` for blank and `NO_ACTION` lines.
    pub fn execute_line(&self, ledger: &mut AllocationLedger, line: &str) -> Option<CommandOutcome> {
        let line = line.trim();
        self.apply(ledger, line, self.parser.parse_line(line))
    }

    fn apply(
        &self,
        ledger: &mut AllocationLedger,
        line: &str,
        parsed: Result<Command, ParseError>,
    ) -> Option<CommandOutcome> {
        match parsed {
            Ok(command) => self.dispatch(ledger, line, command),
            Err(ParseError::Empty) => None,
            Err(err) => {
                warn!(line, error = %err, "rejected command line");
                Some(CommandOutcome::failure(line, err.to_string()))
            }
        }
    }

    fn dispatch(
        &self,
        ledger: &mut AllocationLedger,
        line: &str,
        command: Command,
    ) -> Option<CommandOutcome> {
        debug!(command = %command, "dispatching command");
        let outcome = match command {
            Command::SetTotalBudget { amount } => match ledger.set_total_budget(amount) {
                Ok(()) => CommandOutcome::success(line, format!("Set total budget to ${:.2}", amount)),
                Err(err) => failed(line, "Failed to set total budget", err),
            },
            Command::AddBucket {
                name,
                percentage,
                value,
            } => {
                if value.is_some() {
                    debug!(bucket = %name, "ignoring legacy bucket value");
                }
                if ledger.contains(&name) {
                    resize(ledger, line, &name, percentage, "Resized existing bucket")
                } else {
                    match ledger.add_bucket(&name, percentage) {
                        Ok(()) => CommandOutcome::success(
                            line,
                            format!("Added bucket '{}' with {}% allocation", name, percentage),
                        ),
                        Err(err) => failed(line, &format!("Failed to add bucket '{}'", name), err),
                    }
                }
            }
            Command::RemoveBucket { name } => match ledger.remove_bucket(&name) {
                Ok(removed) => CommandOutcome::success(
                    line,
                    format!(
                        "Removed bucket '{}' ({:.2}% now unallocated)",
                        name,
                        removed.percentage()
                    ),
                ),
                Err(err) => failed(line, &format!("Failed to remove bucket '{}'", name), err),
            },
            Command::ResizeBucket { name, percentage } => {
                resize(ledger, line, &name, percentage, "Resized bucket")
            }
            Command::AddAmount { name, amount } => {
                apply_amount(ledger, line, &name, amount, AmountDirection::Add)
            }
            Command::SubtractAmount { name, amount } => {
                apply_amount(ledger, line, &name, amount, AmountDirection::Subtract)
            }
            Command::Rebalance => {
                let views = ledger.rebalance();
                CommandOutcome::success(
                    line,
                    format!(
                        "Rebalanced {} buckets against ${:.2}",
                        views.len(),
                        ledger.total_budget()
                    ),
                )
            }
            Command::AutoResizeTo100 => match ledger.auto_resize_to_100_percent() {
                Ok(()) => CommandOutcome::success(line, "Auto-resized all buckets to total 100%"),
                Err(err) => failed(line, "Failed to auto-resize", err),
            },
            Command::NoAction => return None,
        };
        Some(outcome)
    }
}

#[derive(Debug, Clone, Copy)]
enum AmountDirection {
    Add,
    Subtract,
}

fn resize(
    ledger: &mut AllocationLedger,
    line: &str,
    name: &str,
    percentage: f64,
    verb: &str,
) -> CommandOutcome {
    match ledger.resize_bucket(name, percentage) {
        Ok(_) => CommandOutcome::success(line, format!("{} '{}' to {}%", verb, name, percentage)),
        Err(err) => failed(line, &format!("Failed to resize bucket '{}'", name), err),
    }
}

/// Missing buckets are created at 0% first. If the amount then cannot be
/// applied, the new bucket is removed again so the line has no effect.
fn apply_amount(
    ledger: &mut AllocationLedger,
    line: &str,
    name: &str,
    amount: f64,
    direction: AmountDirection,
) -> CommandOutcome {
    let created = !ledger.contains(name);
    if created {
        if let Err(err) = ledger.add_bucket(name, 0.0) {
            return failed(line, &format!("Failed to create bucket '{}'", name), err);
        }
    }

    let result = match direction {
        AmountDirection::Add => ledger.add_amount_to_bucket(name, amount),
        AmountDirection::Subtract => ledger.subtract_amount_from_bucket(name, amount),
    };

    match (result, direction) {
        (Ok(_), AmountDirection::Add) if created => CommandOutcome::success(
            line,
            format!("Created bucket '{}' at 0.00% and added ${:.2}", name, amount),
        ),
        (Ok(_), AmountDirection::Subtract) if created => CommandOutcome::success(
            line,
            format!("Created bucket '{}' at 0.00% and subtracted ${:.2}", name, amount),
        ),
        (Ok(pct), AmountDirection::Add) => CommandOutcome::success(
            line,
            format!("Added ${:.2} to bucket '{}' (now {:.2}%)", amount, name, pct),
        ),
        (Ok(pct), AmountDirection::Subtract) => CommandOutcome::success(
            line,
            format!("Subtracted ${:.2} from bucket '{}' (now {:.2}%)", amount, name, pct),
        ),
        (Err(err), direction) => {
            if created {
                let _ = ledger.remove_bucket(name);
            }
            let context = match direction {
                AmountDirection::Add => format!("Failed to add amount to bucket '{}'", name),
                AmountDirection::Subtract => {
                    format!("Failed to subtract amount from bucket '{}'", name)
                }
            };
            failed(line, &context, err)
        }
    }
}

fn failed(line: &str, context: &str, err: LedgerError) -> CommandOutcome {
    CommandOutcome::failure(line, format!("{} - {}", context, err))
}

//! Per-session ownership of a ledger.
//!
//! A [`Session`] is created when a conversation or script starts and
//! dropped when it ends. It owns exactly one ledger; nothing is shared
//! between sessions and nothing outlives the process.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::command::{CommandInterpreter, ExecutionReport};
use crate::ledger::{AllocationLedger, LedgerConfig, LedgerStatus};

/// One user's ledger plus the interpreter that drives it.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    started_at: DateTime<Utc>,
    ledger: AllocationLedger,
    interpreter: CommandInterpreter,
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    /// RFC 3339 start time
    pub started_at: String,
    pub status: LedgerStatus,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a session with an empty ledger and zero budget.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Start a session with a configured ledger.
    pub fn with_config(config: LedgerConfig) -> Self {
        let id = generate_session_id();
        info!(session = %id, total_budget = config.total_budget, "session started");
        Self {
            id,
            started_at: Utc::now(),
            ledger: AllocationLedger::with_config(config),
            interpreter: CommandInterpreter::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Read access to the ledger.
    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    /// Direct access to the ledger, bypassing the command language.
    pub fn ledger_mut(&mut self) -> &mut AllocationLedger {
        &mut self.ledger
    }

    /// Apply a command block to this session's ledger.
    pub fn apply(&mut self, block: &str) -> ExecutionReport {
        self.interpreter.execute(&mut self.ledger, block)
    }

    /// Apply a command block and render the result lines.
    pub fn run(&mut self, block: &str) -> String {
        self.apply(block).to_string()
    }

    pub fn status(&self) -> LedgerStatus {
        self.ledger.status()
    }

    pub fn summary(&self) -> String {
        self.ledger.summary()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            started_at: self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            status: self.status(),
        }
    }
}

/// Generate a process-unique session identifier.
pub fn generate_session_id() -> String {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let pid = std::process::id();
    format!("session-{}-{}", timestamp_ms, pid)
}

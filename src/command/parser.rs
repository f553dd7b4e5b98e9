//! Fixed-grammar parsing of command lines.
//!
//! Each line starts with a command keyword (matched case-insensitively).
//! The keyword selects a dedicated pattern for the whole line:
//!
//! - `SET_TOTAL_BUDGET <amount>`
//! - `ADD_BUCKET <name> <percentage> [<value>]`
//! - `REMOVE_BUCKET <name>`
//! - `RESIZE_BUCKET <name> <percentage>`
//! - `ADD_AMOUNT <name> <amount>`
//! - `SUBTRACT_AMOUNT <name> <amount>`
//! - `REBALANCE`
//! - `AUTO_RESIZE_TO_100`
//! - `NO_ACTION`
//!
//! Bucket names are word characters and keep their case. Percentages may
//! carry a trailing `%` and amounts a leading `$`.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

const NAME: &str = r"(\w+)";
const NUMBER: &str = r"(\d+(?:\.\d+)?|\.\d+)";

/// Errors produced while parsing a single command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The first token is not a known command.
    #[error("Invalid command: {0}")]
    UnknownCommand(String),

    /// The command is known but its arguments are missing or malformed.
    #[error("Invalid argument: '{line}' (expected {usage})")]
    InvalidArgument {
        line: String,
        usage: &'static str,
    },
}

/// Command keywords understood by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SetTotalBudget,
    AddBucket,
    RemoveBucket,
    ResizeBucket,
    AddAmount,
    SubtractAmount,
    Rebalance,
    AutoResizeTo100,
    NoAction,
}

impl CommandKind {
    /// Every command kind, in documentation order.
    pub const ALL: [CommandKind; 9] = [
        CommandKind::SetTotalBudget,
        CommandKind::AddBucket,
        CommandKind::RemoveBucket,
        CommandKind::ResizeBucket,
        CommandKind::AddAmount,
        CommandKind::SubtractAmount,
        CommandKind::Rebalance,
        CommandKind::AutoResizeTo100,
        CommandKind::NoAction,
    ];

    /// Canonical upper-case keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            CommandKind::SetTotalBudget => "SET_TOTAL_BUDGET",
            CommandKind::AddBucket => "ADD_BUCKET",
            CommandKind::RemoveBucket => "REMOVE_BUCKET",
            CommandKind::ResizeBucket => "RESIZE_BUCKET",
            CommandKind::AddAmount => "ADD_AMOUNT",
            CommandKind::SubtractAmount => "SUBTRACT_AMOUNT",
            CommandKind::Rebalance => "REBALANCE",
            CommandKind::AutoResizeTo100 => "AUTO_RESIZE_TO_100",
            CommandKind::NoAction => "NO_ACTION",
        }
    }

    /// Usage line shown when arguments do not match.
    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::SetTotalBudget => "SET_TOTAL_BUDGET <amount>",
            CommandKind::AddBucket => "ADD_BUCKET <name> <percentage> [<value>]",
            CommandKind::RemoveBucket => "REMOVE_BUCKET <name>",
            CommandKind::ResizeBucket => "RESIZE_BUCKET <name> <percentage>",
            CommandKind::AddAmount => "ADD_AMOUNT <name> <amount>",
            CommandKind::SubtractAmount => "SUBTRACT_AMOUNT <name> <amount>",
            CommandKind::Rebalance => "REBALANCE",
            CommandKind::AutoResizeTo100 => "AUTO_RESIZE_TO_100",
            CommandKind::NoAction => "NO_ACTION",
        }
    }

    /// Look up a kind by keyword, ignoring case.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }

    fn pattern(&self) -> String {
        let args = match self {
            CommandKind::SetTotalBudget => format!(r"\s+\$?{NUMBER}"),
            CommandKind::AddBucket => format!(r"\s+{NAME}\s+{NUMBER}%?(?:\s+\$?{NUMBER})?"),
            CommandKind::RemoveBucket => format!(r"\s+{NAME}"),
            CommandKind::ResizeBucket => format!(r"\s+{NAME}\s+{NUMBER}%?"),
            CommandKind::AddAmount | CommandKind::SubtractAmount => {
                format!(r"\s+{NAME}\s+\$?{NUMBER}")
            }
            CommandKind::Rebalance | CommandKind::AutoResizeTo100 | CommandKind::NoAction => {
                String::new()
            }
        };
        format!(r"(?i)^\s*{}{}\s*$", self.keyword(), args)
    }
}

/// A parsed command, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetTotalBudget { amount: f64 },
    AddBucket {
        name: String,
        percentage: f64,
        /// Legacy dollar value; accepted but not used
        value: Option<f64>,
    },
    RemoveBucket { name: String },
    ResizeBucket { name: String, percentage: f64 },
    AddAmount { name: String, amount: f64 },
    SubtractAmount { name: String, amount: f64 },
    Rebalance,
    AutoResizeTo100,
    NoAction,
}

impl Command {
    /// The keyword this command was parsed from.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::SetTotalBudget { .. } => CommandKind::SetTotalBudget,
            Command::AddBucket { .. } => CommandKind::AddBucket,
            Command::RemoveBucket { .. } => CommandKind::RemoveBucket,
            Command::ResizeBucket { .. } => CommandKind::ResizeBucket,
            Command::AddAmount { .. } => CommandKind::AddAmount,
            Command::SubtractAmount { .. } => CommandKind::SubtractAmount,
            Command::Rebalance => CommandKind::Rebalance,
            Command::AutoResizeTo100 => CommandKind::AutoResizeTo100,
            Command::NoAction => CommandKind::NoAction,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.kind().keyword();
        match self {
            Command::SetTotalBudget { amount } => write!(f, "{keyword} {amount}"),
            Command::AddBucket {
                name,
                percentage,
                value: Some(value),
            } => write!(f, "{keyword} {name} {percentage} {value}"),
            Command::AddBucket {
                name, percentage, ..
            }
            | Command::ResizeBucket { name, percentage } => {
                write!(f, "{keyword} {name} {percentage}")
            }
            Command::RemoveBucket { name } => write!(f, "{keyword} {name}"),
            Command::AddAmount { name, amount } | Command::SubtractAmount { name, amount } => {
                write!(f, "{keyword} {name} {amount}")
            }
            Command::Rebalance | Command::AutoResizeTo100 | Command::NoAction => {
                write!(f, "{keyword}")
            }
        }
    }
}

fn grammar() -> &'static HashMap<CommandKind, Regex> {
    static GRAMMAR: OnceLock<HashMap<CommandKind, Regex>> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        CommandKind::ALL
            .into_iter()
            .filter_map(|kind| Regex::new(&kind.pattern()).ok().map(|re| (kind, re)))
            .collect()
    })
}

/// Parser for the line-oriented command language.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a single command line.
    pub fn parse_line(&self, line: &str) -> Result<Command, ParseError> {
        let line = line.trim();
        let Some(keyword) = line.split_whitespace().next() else {
            return Err(ParseError::Empty);
        };
        let Some(kind) = CommandKind::from_keyword(keyword) else {
            return Err(ParseError::UnknownCommand(line.to_string()));
        };

        let invalid = || ParseError::InvalidArgument {
            line: line.to_string(),
            usage: kind.usage(),
        };

        let captures = grammar()
            .get(&kind)
            .and_then(|re| re.captures(line))
            .ok_or_else(invalid)?;

        let name = || {
            captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .ok_or_else(invalid)
        };
        let number = |index: usize| {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|n| n.is_finite())
                .ok_or_else(invalid)
        };

        let command = match kind {
            CommandKind::SetTotalBudget => Command::SetTotalBudget { amount: number(1)? },
            CommandKind::AddBucket => Command::AddBucket {
                name: name()?,
                percentage: number(2)?,
                value: match captures.get(3) {
                    Some(_) => Some(number(3)?),
                    None => None,
                },
            },
            CommandKind::RemoveBucket => Command::RemoveBucket { name: name()? },
            CommandKind::ResizeBucket => Command::ResizeBucket {
                name: name()?,
                percentage: number(2)?,
            },
            CommandKind::AddAmount => Command::AddAmount {
                name: name()?,
                amount: number(2)?,
            },
            CommandKind::SubtractAmount => Command::SubtractAmount {
                name: name()?,
                amount: number(2)?,
            },
            CommandKind::Rebalance => Command::Rebalance,
            CommandKind::AutoResizeTo100 => Command::AutoResizeTo100,
            CommandKind::NoAction => Command::NoAction,
        };

        Ok(command)
    }

    /// Parse every non-blank line of a block, keeping the trimmed source line
    /// next to its result.
    pub fn parse_block<'a>(&self, block: &'a str) -> Vec<(&'a str, Result<Command, ParseError>)> {
        block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| (line, self.parse_line(line)))
            .collect()
    }
}

/// Parse a single command line with the default parser.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    CommandParser::new().parse_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        assert_eq!(grammar().len(), CommandKind::ALL.len());
    }

    #[test]
    fn test_parse_set_total_budget() {
        assert_eq!(
            parse_command("SET_TOTAL_BUDGET 2500.50"),
            Ok(Command::SetTotalBudget { amount: 2500.5 })
        );
        assert_eq!(
            parse_command("SET_TOTAL_BUDGET $3000"),
            Ok(Command::SetTotalBudget { amount: 3000.0 })
        );
    }

    #[test]
    fn test_parse_add_bucket() {
        assert_eq!(
            parse_command("ADD_BUCKET rent 50"),
            Ok(Command::AddBucket {
                name: "rent".to_string(),
                percentage: 50.0,
                value: None
            })
        );
    }

    #[test]
    fn test_parse_add_bucket_with_value_and_percent_sign() {
        assert_eq!(
            parse_command("ADD_BUCKET food 12.5% 250"),
            Ok(Command::AddBucket {
                name: "food".to_string(),
                percentage: 12.5,
                value: Some(250.0)
            })
        );
    }

    #[test]
    fn test_keyword_is_case_insensitive_but_name_is_not() {
        assert_eq!(
            parse_command("  resize_bucket Savings 20  "),
            Ok(Command::ResizeBucket {
                name: "Savings".to_string(),
                percentage: 20.0
            })
        );
    }

    #[test]
    fn test_parse_amount_commands() {
        assert_eq!(
            parse_command("ADD_AMOUNT food $100"),
            Ok(Command::AddAmount {
                name: "food".to_string(),
                amount: 100.0
            })
        );
        assert_eq!(
            parse_command("SUBTRACT_AMOUNT fun .5"),
            Ok(Command::SubtractAmount {
                name: "fun".to_string(),
                amount: 0.5
            })
        );
    }

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(parse_command("REBALANCE"), Ok(Command::Rebalance));
        assert_eq!(parse_command("auto_resize_to_100"), Ok(Command::AutoResizeTo100));
        assert_eq!(parse_command("NO_ACTION"), Ok(Command::NoAction));
        assert_eq!(
            parse_command("REMOVE_BUCKET gym"),
            Ok(Command::RemoveBucket {
                name: "gym".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command("FOO BAR"),
            Err(ParseError::UnknownCommand("FOO BAR".to_string()))
        );
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse_command("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_malformed_number_is_invalid_argument() {
        let err = parse_command("ADD_BUCKET food ten").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidArgument {
                line: "ADD_BUCKET food ten".to_string(),
                usage: CommandKind::AddBucket.usage()
            }
        );
    }

    #[test]
    fn test_missing_and_extra_arguments_are_invalid() {
        assert!(matches!(
            parse_command("RESIZE_BUCKET food"),
            Err(ParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("SET_TOTAL_BUDGET"),
            Err(ParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("REBALANCE now"),
            Err(ParseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_command("ADD_AMOUNT food 10 20"),
            Err(ParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_negative_amount_is_invalid() {
        assert!(matches!(
            parse_command("ADD_AMOUNT food -50"),
            Err(ParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_overflowing_number_is_invalid() {
        let line = format!("SET_TOTAL_BUDGET {}", "9".repeat(400));
        assert!(matches!(
            parse_command(&line),
            Err(ParseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_parse_block_skips_blank_lines() {
        let parser = CommandParser::new();
        let parsed = parser.parse_block("ADD_BUCKET a 10\n\n   \nFOO\n");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, "ADD_BUCKET a 10");
        assert!(parsed[0].1.is_ok());
        assert_eq!(parsed[1].1, Err(ParseError::UnknownCommand("FOO".to_string())));
    }

    #[test]
    fn test_display_is_canonical() {
        let command = parse_command("add_bucket food 12.5").unwrap();
        assert_eq!(command.to_string(), "ADD_BUCKET food 12.5");
        assert_eq!(Command::AutoResizeTo100.to_string(), "AUTO_RESIZE_TO_100");
    }
}

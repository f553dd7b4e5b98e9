use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use bucketwise::command::CommandOutcome;
use bucketwise::session::{Session, SessionSnapshot};
use bucketwise::settings::Settings;

const HELP: &str = "\
Commands (one per line):
  SET_TOTAL_BUDGET <amount>
  ADD_BUCKET <name> <percentage> [<value>]
  REMOVE_BUCKET <name>
  RESIZE_BUCKET <name> <percentage>
  ADD_AMOUNT <name> <amount>
  SUBTRACT_AMOUNT <name> <amount>
  REBALANCE
  AUTO_RESIZE_TO_100
  NO_ACTION
Separate several commands on one line with ';'.

Meta commands:
  :status   show the ledger status block
  :summary  show a one-line summary
  :json     dump the session as JSON
  :help     show this help
  :quit     end the session (also: empty line or Ctrl+D)";

#[derive(Debug, Parser)]
#[command(name = "bucketwise-repl")]
#[command(version, about = "Interactive budget allocation session")]
struct Args {
    /// Path to a TOML config file (default: <config dir>/bucketwise/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting total budget, overriding the config
    #[arg(long)]
    budget: Option<f64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Serialize)]
struct JsonDump {
    exported_at: String,
    session: SessionSnapshot,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bucketwise").join("config.toml"))
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match (&args.config, default_config_path()) {
        (Some(path), _) => Settings::load(Some(path.as_path()))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        (None, Some(path)) => Settings::load_optional(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        (None, None) => Settings::load(None).context("failed to load settings")?,
    };
    if let Some(budget) = args.budget {
        settings.ledger.total_budget = budget;
    }
    if args.no_color {
        settings.color = false;
    }
    Ok(settings)
}

fn print_outcome(outcome: &CommandOutcome, color: bool) {
    let rendered = outcome.to_string();
    if !color {
        println!("{}", rendered);
    } else if outcome.success {
        println!("{}", rendered.green());
    } else {
        println!("{}", rendered.red());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;
    if !settings.color {
        colored::control::set_override(false);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut session = Session::with_config(settings.ledger.clone());
    println!(
        "{} {} (started {})",
        "Session".bold(),
        session.id(),
        session.started_at().with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
    println!("Type :help for commands. Empty line to quit.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "budget>".cyan());
        io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("failed to read input")?;
        let input = line.trim();

        match input {
            "" | ":quit" | ":q" => break,
            ":help" => println!("{}", HELP),
            ":status" => println!("{}", session.status()),
            ":summary" => println!("{}", session.summary()),
            ":json" => {
                let dump = JsonDump {
                    exported_at: Local::now().to_rfc3339(),
                    session: session.snapshot(),
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            }
            other if other.starts_with(':') => {
                println!("{} unknown meta command '{}'", "!".yellow(), other);
            }
            block => {
                let report = session.apply(&block.replace(';', "\n"));
                for outcome in &report.outcomes {
                    print_outcome(outcome, settings.color);
                }
            }
        }
    }

    println!("{}", session.summary().dimmed());
    Ok(())
}

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use bucketwise::command::{CommandOutcome, ExecutionReport};
use bucketwise::session::{Session, SessionSnapshot};
use bucketwise::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bucketwise")]
#[command(version, about = "Apply budget allocation commands to a fresh ledger")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute a command block from a file (or stdin) and print one result per line
    Run {
        /// Command file; reads stdin when omitted or `-`
        file: Option<PathBuf>,

        /// Starting total budget, overriding the config
        #[arg(long)]
        budget: Option<f64>,

        /// Append the ledger status block after the results
        #[arg(long)]
        status: bool,

        /// Print results and final ledger state as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored markers
        #[arg(long)]
        no_color: bool,
    },
    /// Print the effective settings as TOML
    Config,
}

#[derive(Debug, Serialize)]
struct RunOutput<'a> {
    report: &'a ExecutionReport,
    session: SessionSnapshot,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut settings = Settings::load(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match args.command {
        Commands::Run {
            file,
            budget,
            status,
            json,
            no_color,
        } => {
            if let Some(budget) = budget {
                settings.ledger.total_budget = budget;
            }
            let block = read_block(file.as_ref())?;

            let mut session = Session::with_config(settings.ledger.clone());
            let report = session.apply(&block);
            tracing::info!(session = session.id(), summary = %session.summary(), "run finished");

            if json {
                let output = RunOutput {
                    report: &report,
                    session: session.snapshot(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            let color = settings.color && !no_color;
            for outcome in &report.outcomes {
                println!("{}", render(outcome, color));
            }
            if status {
                if !report.is_empty() {
                    println!();
                }
                println!("{}", session.status());
            }
        }
        Commands::Config => {
            print!("{}", settings.to_toml()?);
        }
    }

    Ok(())
}

fn read_block(file: Option<&PathBuf>) -> io::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path),
        _ => {
            let mut block = String::new();
            io::stdin().read_to_string(&mut block)?;
            Ok(block)
        }
    }
}

fn render(outcome: &CommandOutcome, color: bool) -> String {
    match (color, outcome.success) {
        (false, _) => outcome.to_string(),
        (true, true) => outcome.to_string().green().to_string(),
        (true, false) => outcome.to_string().red().to_string(),
    }
}

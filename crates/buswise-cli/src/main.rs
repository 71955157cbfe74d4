//! buswise CLI - plan bus trips from the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;

use buswise_core::logging::Level;
use tracing_subscriber::EnvFilter;

/// buswise: AI trip planner for public bus networks
///
/// Turns a start location, a destination and optional preferences into a
/// step-by-step transit itinerary.
#[derive(Debug, Parser)]
#[command(name = "buswise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (can be repeated: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip with the configured model.
    ///
    /// Prints the itinerary, or the raw tagged result with `--json`.
    #[command(visible_alias = "p")]
    Plan(commands::PlanArgs),

    /// Print the prompt that would be sent, without calling the model.
    Prompt(commands::PromptArgs),

    /// Show version information.
    Version,
}

impl Cli {
    fn log_filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        let level = if self.quiet {
            Level::Error
        } else {
            Level::from_verbosity(self.verbose)
        };
        EnvFilter::new(level.as_filter())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Plan(args) => commands::plan::execute(args, cli.config).await,
        Command::Prompt(args) => commands::prompt::execute(args),
        Command::Version => {
            print_version();
            Ok(())
        }
    };

    result.map(|_| ExitCode::SUCCESS).unwrap_or_else(|e| {
        eprintln!("{e}");
        ExitCode::from(e.exit_code())
    })
}

/// Print version information.
fn print_version() {
    println!("buswise {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Target: {}", std::env::consts::ARCH);
    println!("OS: {}", std::env::consts::OS);
}

mod canonical;
mod commands;
mod comments;
mod config;
mod diagnostics;
mod error;
mod fragments;
mod generate;
mod info;
mod markdown;
mod model;
mod pages;
mod paths;
mod signature;
mod types;
mod watch;
mod writer;
mod xref;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::Overrides;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "DOCMARK_LOG";

#[derive(Parser)]
#[command(name = "docmark", version, about = "Cross-linked markdown API docs from type metadata and XML doc comments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every page for the configured type universe
    Generate(InputArgs),
    /// List canonical-id -> page address for every documented symbol
    Ids(InputArgs),
    /// Show the reference document: syntax, config, exit codes, current state
    Info {
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Generate, then regenerate whenever an input changes
    Watch(InputArgs),
}

/// Where inputs and output come from.
#[derive(Args)]
struct InputArgs {
    /// Config file (default: ./.docmark.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory, overrides the config
    #[arg(long)]
    output: Option<PathBuf>,
    /// Type universe JSON file, overrides the config
    #[arg(long)]
    universe: Option<PathBuf>,
}

impl InputArgs {
    /// Convert to command overrides.
    fn into_overrides(self) -> Overrides {
        return Overrides { config: self.config, output: self.output, universe: self.universe };
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate(&args.into_overrides()).map(|()| return ExitCode::SUCCESS),
        Commands::Ids(args) => commands::ids(&args.into_overrides()).map(|()| return ExitCode::SUCCESS),
        Commands::Info { json } => {
            commands::info(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Watch(args) => watch::run(&args.into_overrides()),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Structured logging to stderr, filtered by `DOCMARK_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| return EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

//! permsync - declarative access-control reconciliation
//!
//! Converges the access-control lists of a hierarchical permission
//! store to a YAML-declared configuration:
//! - Validate configuration files (macros, beans, principals)
//! - Diff declared entries against the store state (CI-friendly exit
//!   codes)
//! - Apply the minimal delta, path by path, without touching foreign
//!   principals

use clap::{Parser, Subcommand};

use permsync_cli::commands;
use permsync_cli::error::CliResult;

/// permsync - declarative access-control reconciliation
#[derive(Parser)]
#[command(name = "permsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Validate(commands::validate::ValidateArgs),

    /// Show the delta between configuration and store state
    Diff(commands::diff::DiffArgs),

    /// Apply configuration to the store state
    Apply(commands::apply::ApplyArgs),
}

#[tokio::main]
async fn main() {
    permsync_cli::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Commands::Validate(args) => commands::validate::execute(&args),
        Commands::Diff(args) => commands::diff::execute(&args).await,
        Commands::Apply(args) => commands::apply::execute(&args).await,
    }
}

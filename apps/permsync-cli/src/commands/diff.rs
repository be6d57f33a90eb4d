//! Show the delta between configuration and store state.

use std::path::PathBuf;

use clap::Args;

use permsync_engine::{ApplyOptions, ApplyService};

use crate::error::{CliError, CliResult};
use crate::{output, state};

/// Compare a configuration against the store state without applying
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Path to the configuration file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Path to the store snapshot file
    #[arg(long = "state")]
    pub state: PathBuf,

    /// Restrict the run to paths under these roots (repeatable)
    #[arg(long = "restrict-root")]
    pub restrict_root: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the diff command.
///
/// Exit codes: 0 when converged, 2 when drift was detected, 5 when a
/// path could not be diffed.
pub async fn execute(args: &DiffArgs) -> CliResult<i32> {
    if !args.file.exists() {
        return Err(CliError::Input(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let resolved = permsync_config::load_file(&args.file)?;
    let store = state::load_store(&args.state)?;

    let options = ApplyOptions {
        restricted_roots: args.restrict_root.clone(),
        dry_run: true,
    };
    let service = ApplyService::new(&store, &store);
    let report = service
        .apply(
            resolved.entries,
            &resolved.authorizables,
            &resolved.managed_principals,
            &options,
        )
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.has_changes() || report.has_failures() {
        output::print_plan(&report, false);
    } else {
        println!("No drift. Store state matches the configuration.");
    }

    if report.has_failures() {
        Ok(5)
    } else if report.has_changes() {
        Ok(2)
    } else {
        Ok(0)
    }
}

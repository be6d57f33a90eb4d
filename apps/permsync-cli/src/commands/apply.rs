//! Apply a configuration to the store state.

use std::path::PathBuf;

use clap::Args;
use dialoguer::Confirm;

use permsync_engine::{ApplyOptions, ApplyService};

use crate::error::{CliError, CliResult};
use crate::{output, state};

/// Reconcile the store state with a configuration file
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the configuration file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Path to the store snapshot file
    #[arg(long = "state")]
    pub state: PathBuf,

    /// Restrict the run to paths under these roots (repeatable)
    #[arg(long = "restrict-root")]
    pub restrict_root: Vec<String>,

    /// Preview changes without applying
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the apply command.
pub async fn execute(args: &ApplyArgs) -> CliResult<i32> {
    if !args.file.exists() {
        return Err(CliError::Input(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let resolved = permsync_config::load_file(&args.file)?;
    let store = state::load_store(&args.state)?;
    let service = ApplyService::new(&store, &store);

    // Plan first so the user confirms a concrete delta.
    let plan_options = ApplyOptions {
        restricted_roots: args.restrict_root.clone(),
        dry_run: true,
    };
    let plan = service
        .apply(
            resolved.entries.clone(),
            &resolved.authorizables,
            &resolved.managed_principals,
            &plan_options,
        )
        .await?;

    if plan.has_failures() {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            output::print_plan(&plan, args.dry_run);
        }
        return Ok(5);
    }

    if !plan.has_changes() {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            println!("No changes required. Store state is up to date.");
        }
        return Ok(0);
    }

    if !args.json {
        output::print_plan(&plan, args.dry_run);
    }

    if args.dry_run {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        return Ok(0);
    }

    if !args.yes {
        if !atty::is(atty::Stream::Stdin) {
            return Err(CliError::Input(
                "Cannot confirm in non-interactive mode. Use --yes to skip confirmation."
                    .to_string(),
            ));
        }
        let total = plan.summary.entries_added + plan.summary.entries_removed;
        let confirmed = Confirm::new()
            .with_prompt(format!("Apply {total} change(s)?"))
            .default(false)
            .interact()
            .map_err(|e| CliError::Input(e.to_string()))?;
        if !confirmed {
            println!("Cancelled.");
            return Err(CliError::Aborted);
        }
    }

    let apply_options = ApplyOptions {
        restricted_roots: args.restrict_root.clone(),
        dry_run: false,
    };
    let report = service
        .apply(
            resolved.entries,
            &resolved.authorizables,
            &resolved.managed_principals,
            &apply_options,
        )
        .await?;

    state::save_store(&args.state, &store)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_results(&report);
    }

    if report.has_failures() {
        return Ok(1);
    }
    Ok(0)
}

//! Validate a configuration file.

use std::path::PathBuf;

use clap::Args;

use crate::error::{CliError, CliResult};

/// Validate a configuration file without touching any store
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the configuration file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate command.
pub fn execute(args: &ValidateArgs) -> CliResult<i32> {
    if !args.file.exists() {
        return Err(CliError::Input(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let resolved = permsync_config::load_file(&args.file)?;

    if args.json {
        let summary = serde_json::json!({
            "valid": true,
            "entries": resolved.entries.len(),
            "authorizables": resolved.authorizables.len(),
            "managed_principals": resolved.managed_principals.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Configuration valid: {} entries, {} authorizables, {} managed principals.",
            resolved.entries.len(),
            resolved.authorizables.len(),
            resolved.managed_principals.len()
        );
    }
    Ok(0)
}

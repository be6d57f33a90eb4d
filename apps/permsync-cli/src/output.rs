//! Human-readable rendering of plans and results.

use permsync_engine::{InstallationReport, PathStatus};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Print the per-path delta of a planned run.
pub fn print_plan(report: &InstallationReport, dry_run: bool) {
    if dry_run {
        println!("Dry run - no changes will be made.");
        println!();
        println!("Would apply:");
    } else {
        println!("Planning changes:");
    }

    for outcome in &report.paths {
        match outcome.status {
            PathStatus::Unchanged => continue,
            PathStatus::Applied => {
                println!(
                    "  {GREEN}~{RESET} {}: +{} -{} ({} unchanged)",
                    outcome.path, outcome.added, outcome.removed, outcome.unchanged
                );
            }
            PathStatus::Failed => {
                println!(
                    "  {RED}!{RESET} {}: {}",
                    outcome.path,
                    outcome.error.as_deref().unwrap_or("failed")
                );
            }
            PathStatus::Skipped => {
                println!(
                    "  {YELLOW}-{RESET} {}: outside restricted roots, skipped",
                    outcome.path
                );
            }
        }
    }

    println!();
    print_summary(report);
}

/// Print results after an apply run.
pub fn print_results(report: &InstallationReport) {
    for outcome in &report.paths {
        match outcome.status {
            PathStatus::Applied => {
                println!(
                    "  {GREEN}\u{2713}{RESET} {}: +{} -{}",
                    outcome.path, outcome.added, outcome.removed
                );
            }
            PathStatus::Failed => {
                println!(
                    "  {RED}\u{2717}{RESET} {}: {}",
                    outcome.path,
                    outcome.error.as_deref().unwrap_or("failed")
                );
            }
            PathStatus::Unchanged | PathStatus::Skipped => continue,
        }
        for failure in &outcome.action_failures {
            println!(
                "    {YELLOW}warning{RESET}: action '{}' for {} failed: {}",
                failure.action, failure.principal, failure.message
            );
        }
    }

    println!();
    print_summary(report);
}

fn print_summary(report: &InstallationReport) {
    let s = &report.summary;
    println!(
        "Summary: {} path(s): {} applied, {} unchanged, {} failed, {} skipped; \
         {} entries added, {} removed",
        s.paths_total,
        s.paths_applied,
        s.paths_unchanged,
        s.paths_failed,
        s.paths_skipped,
        s.entries_added,
        s.entries_removed
    );
}

//! Installation history and reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How processing of one path concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    /// A delta was committed.
    Applied,
    /// Desired and existing state already agreed; nothing written.
    Unchanged,
    /// The path's transaction failed; nothing was written for it.
    Failed,
    /// The path lies outside the restricted roots and was not touched.
    Skipped,
}

/// A post-install action that failed; recorded as a warning, the ACE
/// commit it followed stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionFailure {
    /// Principal of the installed entry the action belonged to.
    pub principal: String,
    /// The configured action.
    pub action: String,
    /// Failure message.
    pub message: String,
}

/// Outcome of one path's unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathOutcome {
    /// The path.
    pub path: String,
    /// How processing concluded.
    pub status: PathStatus,
    /// Entries installed.
    pub added: u32,
    /// Entries removed.
    pub removed: u32,
    /// Entries already correct.
    pub unchanged: u32,
    /// Failure attributed to this path, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Post-install action failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_failures: Vec<ActionFailure>,
}

impl PathOutcome {
    /// A committed delta.
    #[must_use]
    pub fn applied(path: impl Into<String>, added: u32, removed: u32, unchanged: u32) -> Self {
        Self {
            path: path.into(),
            status: PathStatus::Applied,
            added,
            removed,
            unchanged,
            error: None,
            action_failures: Vec::new(),
        }
    }

    /// Already converged.
    #[must_use]
    pub fn unchanged(path: impl Into<String>, unchanged: u32) -> Self {
        Self {
            path: path.into(),
            status: PathStatus::Unchanged,
            added: 0,
            removed: 0,
            unchanged,
            error: None,
            action_failures: Vec::new(),
        }
    }

    /// A failed path transaction.
    #[must_use]
    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: PathStatus::Failed,
            added: 0,
            removed: 0,
            unchanged: 0,
            error: Some(error.into()),
            action_failures: Vec::new(),
        }
    }

    /// A path outside the restricted roots.
    #[must_use]
    pub fn skipped(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: PathStatus::Skipped,
            added: 0,
            removed: 0,
            unchanged: 0,
            error: None,
            action_failures: Vec::new(),
        }
    }
}

/// Aggregated counts over a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub paths_total: u32,
    pub paths_applied: u32,
    pub paths_unchanged: u32,
    pub paths_failed: u32,
    pub paths_skipped: u32,
    pub entries_added: u32,
    pub entries_removed: u32,
}

/// History of one reconciliation run: every path's outcome with every
/// failure attributed to its path (and principal where known).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationReport {
    /// Run id.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// `true` when no store mutation was performed.
    pub dry_run: bool,
    /// Per-path outcomes in processing order.
    pub paths: Vec<PathOutcome>,
    /// Aggregated counts.
    pub summary: Summary,
}

impl InstallationReport {
    /// Start a new report.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            paths: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Record one path's outcome and fold it into the summary.
    pub fn record(&mut self, outcome: PathOutcome) {
        self.summary.paths_total += 1;
        match outcome.status {
            PathStatus::Applied => self.summary.paths_applied += 1,
            PathStatus::Unchanged => self.summary.paths_unchanged += 1,
            PathStatus::Failed => self.summary.paths_failed += 1,
            PathStatus::Skipped => self.summary.paths_skipped += 1,
        }
        self.summary.entries_added += outcome.added;
        self.summary.entries_removed += outcome.removed;
        self.paths.push(outcome);
    }

    /// Mark the run finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// `true` if any path failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.summary.paths_failed > 0
    }

    /// `true` if any path committed a delta (or would, in dry-run).
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.summary.entries_added > 0 || self.summary.entries_removed > 0
    }
}

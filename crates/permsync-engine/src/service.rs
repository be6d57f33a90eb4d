//! Run orchestration: authorizables, path scoping, per-path install.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use permsync_model::{group_by_path, is_relevant_path, AceEntry, AuthorizableConfig};
use permsync_repo::{AclStore, PrincipalDirectory};

use crate::error::EngineResult;
use crate::installer::{install_path, ActionHandler, PathDelta};
use crate::reconcile::reconcile;
use crate::report::{ActionFailure, InstallationReport, PathOutcome};

/// Options for one apply run.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Root paths the run is confined to; empty means unrestricted.
    pub restricted_roots: Vec<String>,
    /// Compute and report the delta without mutating the store.
    pub dry_run: bool,
}

/// Orchestrates a full reconciliation run.
///
/// Collaborators are passed in explicitly (store, principal directory,
/// optional action handler) so tests substitute in-memory fakes for
/// any of them.
pub struct ApplyService<'a> {
    store: &'a dyn AclStore,
    directory: &'a dyn PrincipalDirectory,
    actions: Option<&'a dyn ActionHandler>,
}

impl<'a> ApplyService<'a> {
    /// Create a service over a store and principal directory.
    #[must_use]
    pub fn new(store: &'a dyn AclStore, directory: &'a dyn PrincipalDirectory) -> Self {
        Self {
            store,
            directory,
            actions: None,
        }
    }

    /// Attach a post-install action handler.
    #[must_use]
    pub fn with_action_handler(mut self, handler: &'a dyn ActionHandler) -> Self {
        self.actions = Some(handler);
        self
    }

    /// Run the full pipeline: provision missing authorizables, group
    /// desired entries by path, drop irrelevant paths, and converge
    /// every relevant path in deterministic order.
    ///
    /// Authorizable provisioning failures abort the run before any ACL
    /// is touched. Per-path failures are recorded on the report and do
    /// not stop the batch.
    #[instrument(skip_all, fields(dry_run = options.dry_run))]
    pub async fn apply(
        &self,
        entries: Vec<AceEntry>,
        authorizables: &[AuthorizableConfig],
        managed_principals: &BTreeSet<String>,
        options: &ApplyOptions,
    ) -> EngineResult<InstallationReport> {
        let mut report = InstallationReport::new(options.dry_run);

        if !options.dry_run {
            for authorizable in authorizables {
                if self.directory.ensure(authorizable).await? {
                    info!(id = %authorizable.id, "created missing authorizable");
                }
            }
        }

        let grouped = group_by_path(entries);
        for (path, desired) in &grouped {
            if !is_relevant_path(path, &options.restricted_roots) {
                debug!(%path, "path outside restricted roots");
                report.record(PathOutcome::skipped(path.as_str()));
                continue;
            }
            self.converge_path(path, desired, managed_principals, options, &mut report)
                .await;
        }

        // Paths the configuration no longer names can still carry
        // entries of managed principals; sweep those as empty desired
        // sets. Paths without managed entries converge to a no-op and
        // are not reported.
        for path in self.store.paths().await? {
            if grouped.contains_key(&path) || !is_relevant_path(&path, &options.restricted_roots)
            {
                continue;
            }
            self.converge_path(&path, &[], managed_principals, options, &mut report)
                .await;
        }

        report.finish();
        Ok(report)
    }

    /// Converge one path and record its outcome. A no-op on a path the
    /// configuration names is recorded as unchanged; a no-op on a
    /// swept path is not recorded at all.
    async fn converge_path(
        &self,
        path: &str,
        desired: &[AceEntry],
        managed_principals: &BTreeSet<String>,
        options: &ApplyOptions,
        report: &mut InstallationReport,
    ) {
        let result = if options.dry_run {
            self.plan_path(path, desired, managed_principals).await
        } else {
            install_path(self.store, path, desired, managed_principals).await
        };

        match result {
            Ok(delta) => {
                if delta.is_noop() && desired.is_empty() {
                    return;
                }
                let mut outcome = if delta.is_noop() {
                    PathOutcome::unchanged(path, delta.unchanged)
                } else {
                    PathOutcome::applied(path, delta.added, delta.removed, delta.unchanged)
                };
                if !options.dry_run {
                    outcome.action_failures = self.run_actions(&delta.installed).await;
                }
                report.record(outcome);
            }
            Err(err) => {
                warn!(%path, error = %err, "path failed");
                report.record(PathOutcome::failed(path, err.to_string()));
            }
        }
    }

    /// Diff one path without committing.
    async fn plan_path(
        &self,
        path: &str,
        desired: &[AceEntry],
        managed_principals: &BTreeSet<String>,
    ) -> EngineResult<PathDelta> {
        let txn = self.store.begin(path).await?;
        let outcome = reconcile(desired, txn.entries(), managed_principals, self.store.catalog())?;
        Ok(PathDelta {
            added: outcome.to_install.len() as u32,
            removed: outcome.to_remove.len() as u32,
            unchanged: outcome.unchanged as u32,
            installed: outcome.to_install,
        })
    }

    /// Invoke configured actions for installed entries, best-effort.
    async fn run_actions(&self, installed: &[AceEntry]) -> Vec<ActionFailure> {
        let Some(handler) = self.actions else {
            return Vec::new();
        };
        let mut failures = Vec::new();
        for entry in installed {
            for action in &entry.actions {
                if let Err(err) = handler.invoke(entry, action).await {
                    warn!(
                        principal = %entry.principal,
                        action = %action,
                        error = %err,
                        "post-install action failed"
                    );
                    failures.push(ActionFailure {
                        principal: entry.principal.clone(),
                        action: action.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }
        failures
    }
}

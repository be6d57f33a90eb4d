//! Desired-vs-existing reconciliation for one path.

use std::collections::BTreeSet;

use tracing::debug;

use permsync_model::AceEntry;
use permsync_repo::{PrivilegeCatalog, StoredAce};

use crate::compare::ComparableAce;
use crate::error::EngineResult;

/// The decision for one path: which existing entries to remove and
/// which desired entries to (re)install.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Managed existing entries with no identical desired counterpart.
    pub to_remove: Vec<StoredAce>,
    /// Desired entries with no identical existing counterpart.
    pub to_install: Vec<AceEntry>,
    /// Desired entries already correct in the store.
    pub unchanged: usize,
}

impl ReconcileOutcome {
    /// `true` when desired and existing state already agree.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.to_remove.is_empty() && self.to_install.is_empty()
    }
}

/// Diff `desired` against `existing`, scoped to `managed_principals`.
///
/// Existing entries of principals outside the managed set are foreign:
/// they are excluded from the comparison and never removed. A desired
/// entry whose comparable form matches a managed existing entry is
/// counted unchanged and the existing grant stays in place; every
/// other managed existing entry is removed, every other desired entry
/// installed. Changed entries are therefore removed and reinstalled,
/// never patched.
///
/// Desired input is assumed unique per (path, principal); upstream
/// extraction deduplicates.
pub fn reconcile(
    desired: &[AceEntry],
    existing: &[StoredAce],
    managed_principals: &BTreeSet<String>,
    catalog: &dyn PrivilegeCatalog,
) -> EngineResult<ReconcileOutcome> {
    let managed: Vec<&StoredAce> = existing
        .iter()
        .filter(|ace| managed_principals.contains(&ace.principal))
        .collect();

    let mut existing_comparable = Vec::with_capacity(managed.len());
    for ace in &managed {
        existing_comparable.push(ComparableAce::from_stored(ace, catalog)?);
    }
    let mut matched = vec![false; managed.len()];

    let mut outcome = ReconcileOutcome::default();
    for entry in desired {
        let comparable = ComparableAce::from_desired(entry, catalog)?;
        let found = existing_comparable
            .iter()
            .enumerate()
            .find(|(i, existing)| !matched[*i] && **existing == comparable);
        match found {
            Some((i, _)) => {
                matched[i] = true;
                outcome.unchanged += 1;
            }
            None => outcome.to_install.push(entry.clone()),
        }
    }

    for (i, ace) in managed.iter().enumerate() {
        if !matched[i] {
            outcome.to_remove.push((*ace).clone());
        }
    }

    debug!(
        unchanged = outcome.unchanged,
        to_install = outcome.to_install.len(),
        to_remove = outcome.to_remove.len(),
        "reconciled desired against existing entries"
    );
    Ok(outcome)
}

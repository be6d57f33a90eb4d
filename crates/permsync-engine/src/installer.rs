//! Incremental per-path installation.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use permsync_model::AceEntry;
use permsync_repo::{AclStore, AclTransaction, NewAce};

use crate::error::{EngineError, EngineResult};
use crate::reconcile::reconcile;

/// What one path's installation changed.
#[derive(Debug, Default)]
pub struct PathDelta {
    /// Entries installed.
    pub added: u32,
    /// Entries removed.
    pub removed: u32,
    /// Entries left in place.
    pub unchanged: u32,
    /// The entries that were installed, for post-install actions.
    pub installed: Vec<AceEntry>,
}

impl PathDelta {
    /// `true` when nothing was written.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Post-install side effects attached to entries via their `actions`
/// list. Passed into the service as an explicit collaborator so tests
/// substitute fakes; failures are recorded, never rolled back.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Invoke one configured action for an installed entry.
    async fn invoke(&self, entry: &AceEntry, action: &str) -> EngineResult<()>;
}

/// Converge one path's ACL to the desired entries.
///
/// Opens a transaction on the path (an absent ACL snapshots empty),
/// diffs within it, stages removals and installations, and commits the
/// whole delta atomically. When the diff is already converged no
/// commit is issued and the stored entries are left byte-for-byte
/// untouched. Entries of principals outside `managed_principals` are
/// never staged for removal.
#[instrument(skip_all, fields(path = %path))]
pub async fn install_path(
    store: &dyn AclStore,
    path: &str,
    desired: &[AceEntry],
    managed_principals: &BTreeSet<String>,
) -> EngineResult<PathDelta> {
    let mut txn = store.begin(path).await?;
    let outcome = reconcile(desired, txn.entries(), managed_principals, store.catalog())?;

    if outcome.is_converged() {
        debug!(unchanged = outcome.unchanged, "path already converged");
        return Ok(PathDelta {
            unchanged: outcome.unchanged as u32,
            ..PathDelta::default()
        });
    }

    for stale in &outcome.to_remove {
        txn.remove(stale.id)?;
    }
    for entry in &outcome.to_install {
        txn.add(NewAce {
            principal: entry.principal.clone(),
            allow: entry.is_allow(),
            privileges: entry.privileges.clone(),
            restrictions: entry.restrictions.clone(),
        })
        .map_err(|err| EngineError::from(err).for_principal(&entry.principal))?;
    }
    txn.commit().await?;

    let delta = PathDelta {
        added: outcome.to_install.len() as u32,
        removed: outcome.to_remove.len() as u32,
        unchanged: outcome.unchanged as u32,
        installed: outcome.to_install,
    };
    info!(
        added = delta.added,
        removed = delta.removed,
        unchanged = delta.unchanged,
        "applied access-control delta"
    );
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use permsync_model::Permission;
    use permsync_repo::MemoryStore;

    fn managed(principals: &[&str]) -> BTreeSet<String> {
        principals.iter().map(ToString::to_string).collect()
    }

    fn entry(principal: &str, privileges: &[&str]) -> AceEntry {
        AceEntry::new(
            "/content/testpath",
            principal,
            Permission::Allow,
            privileges.iter().map(ToString::to_string).collect(),
        )
    }

    async fn entries_at(store: &MemoryStore, path: &str) -> Vec<permsync_repo::StoredAce> {
        store.begin(path).await.unwrap().entries().to_vec()
    }

    #[tokio::test]
    async fn test_install_into_empty_path() {
        let store = MemoryStore::with_default_catalog();
        let desired = vec![
            entry("principal1", &["jcr:read"]),
            entry("principal2", &["rep:write"]),
        ];

        let delta = install_path(
            &store,
            "/content/testpath",
            &desired,
            &managed(&["principal1", "principal2"]),
        )
        .await
        .unwrap();

        assert_eq!(delta.added, 2);
        assert_eq!(delta.removed, 0);
        assert_eq!(entries_at(&store, "/content/testpath").await.len(), 2);
    }

    #[tokio::test]
    async fn test_reapply_is_idempotent() {
        let store = MemoryStore::with_default_catalog();
        let desired = vec![entry("principal1", &["jcr:read"])];
        let who = managed(&["principal1"]);

        install_path(&store, "/content/testpath", &desired, &who)
            .await
            .unwrap();
        let before = entries_at(&store, "/content/testpath").await;

        let delta = install_path(&store, "/content/testpath", &desired, &who)
            .await
            .unwrap();

        assert!(delta.is_noop());
        assert_eq!(delta.unchanged, 1);
        // The unchanged entry keeps its identity; it was not reinstalled.
        assert_eq!(entries_at(&store, "/content/testpath").await, before);
    }

    #[tokio::test]
    async fn test_changed_entry_is_replaced_and_foreigners_survive() {
        let store = MemoryStore::with_default_catalog();
        store
            .insert_entry(
                "/content/testpath",
                NewAce {
                    principal: "foreign-service".to_string(),
                    allow: true,
                    privileges: vec!["jcr:all".to_string()],
                    restrictions: vec![],
                },
            )
            .unwrap();
        store
            .insert_entry(
                "/content/testpath",
                NewAce {
                    principal: "principal1".to_string(),
                    allow: true,
                    privileges: vec!["jcr:read".to_string()],
                    restrictions: vec![],
                },
            )
            .unwrap();

        let desired = vec![entry("principal1", &["jcr:read", "rep:write"])];
        let delta = install_path(
            &store,
            "/content/testpath",
            &desired,
            &managed(&["principal1"]),
        )
        .await
        .unwrap();

        assert_eq!(delta.added, 1);
        assert_eq!(delta.removed, 1);

        let entries = entries_at(&store, "/content/testpath").await;
        assert_eq!(entries.len(), 2);
        // Foreign entry untouched and still first in evaluation order.
        assert_eq!(entries[0].principal, "foreign-service");
        assert_eq!(entries[0].privileges, vec!["jcr:all"]);
        assert_eq!(entries[1].principal, "principal1");
    }

    #[tokio::test]
    async fn test_unknown_privilege_aborts_path_without_writes() {
        let store = MemoryStore::with_default_catalog();
        let desired = vec![
            entry("principal1", &["jcr:read"]),
            entry("principal2", &["jcr:rede"]),
        ];

        let err = install_path(
            &store,
            "/content/testpath",
            &desired,
            &managed(&["principal1", "principal2"]),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("jcr:rede"));
        // Nothing was committed for the failed path.
        assert!(entries_at(&store, "/content/testpath").await.is_empty());
    }
}

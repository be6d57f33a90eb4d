//! Store capability traits.

use async_trait::async_trait;

use permsync_model::AuthorizableConfig;

use crate::error::StoreResult;
use crate::types::{AceId, NewAce, PrivilegeDef, StoredAce};

/// Capability for resolving privilege names against the store's
/// catalog. Lookups are synchronous; implementations are expected to
/// hold the catalog in memory.
pub trait PrivilegeCatalog: Send + Sync {
    /// Resolve a privilege name to its definition.
    ///
    /// Fails with [`StoreError::UnknownPrivilege`] when the name is not
    /// in the catalog.
    ///
    /// [`StoreError::UnknownPrivilege`]: crate::StoreError::UnknownPrivilege
    fn privilege_by_name(&self, name: &str) -> StoreResult<PrivilegeDef>;
}

/// Capability for opening per-path ACL transactions.
#[async_trait]
pub trait AclStore: Send + Sync {
    /// The store's privilege catalog.
    fn catalog(&self) -> &dyn PrivilegeCatalog;

    /// Paths that currently carry an ACL.
    async fn paths(&self) -> StoreResult<Vec<String>>;

    /// Open a transaction on `path`, snapshotting its current ACL.
    /// A path without an ACL yields an empty snapshot.
    async fn begin(&self, path: &str) -> StoreResult<Box<dyn AclTransaction>>;
}

/// One path's fetch-stage-commit unit of work.
///
/// The snapshot taken at [`AclStore::begin`] is the transaction's view;
/// staged removals and additions are applied atomically by
/// [`commit`](AclTransaction::commit), which fails with a conflict
/// error if the underlying ACL changed since the snapshot. Dropping a
/// transaction without committing discards the staged delta.
#[async_trait]
pub trait AclTransaction: Send + Sync {
    /// The path this transaction is scoped to.
    fn path(&self) -> &str;

    /// The snapshotted entries, in evaluation order.
    fn entries(&self) -> &[StoredAce];

    /// Stage removal of a snapshotted entry.
    fn remove(&mut self, id: AceId) -> StoreResult<()>;

    /// Stage installation of a new entry, appended after surviving
    /// entries.
    fn add(&mut self, ace: NewAce) -> StoreResult<()>;

    /// Apply the staged delta atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Capability for looking up and provisioning authorizables.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// `true` if an authorizable with this id exists.
    async fn exists(&self, id: &str) -> StoreResult<bool>;

    /// Create the authorizable if missing. Returns `true` when it was
    /// created, `false` when it already existed (existing authorizables
    /// are left untouched).
    async fn ensure(&self, authorizable: &AuthorizableConfig) -> StoreResult<bool>;
}

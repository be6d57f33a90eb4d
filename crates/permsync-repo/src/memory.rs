//! In-memory store implementation.
//!
//! Backs the CLI through JSON snapshots and doubles as the test store
//! for the engine. Per-path version counters drive conflict detection:
//! a transaction remembers the version it snapshotted and commit fails
//! if the path's ACL moved meanwhile.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use permsync_model::AuthorizableConfig;

use crate::error::{StoreError, StoreResult};
use crate::traits::{AclStore, AclTransaction, PrincipalDirectory, PrivilegeCatalog};
use crate::types::{
    AceId, AclSnapshot, NewAce, PrincipalRecord, PrivilegeDef, StoreSnapshot, StoredAce,
};

#[derive(Debug, Default)]
struct AclState {
    version: u64,
    entries: Vec<StoredAce>,
}

#[derive(Debug, Default)]
struct Inner {
    privileges: BTreeMap<String, PrivilegeDef>,
    principals: BTreeMap<String, PrincipalRecord>,
    acls: BTreeMap<String, AclState>,
    next_id: u64,
}

/// In-memory hierarchical permission store.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store with an empty privilege catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store pre-loaded with the standard JCR
    /// privilege catalog (see [`default_catalog`]).
    #[must_use]
    pub fn with_default_catalog() -> Self {
        let mut inner = Inner::default();
        for def in default_catalog() {
            inner.privileges.insert(def.name.clone(), def);
        }
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Build a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut inner = Inner::default();
        for def in snapshot.privileges {
            inner.privileges.insert(def.name.clone(), def);
        }
        for record in snapshot.principals {
            inner.principals.insert(record.id.clone(), record);
        }
        let mut max_id = 0;
        for (path, acl) in snapshot.acls {
            max_id = max_id.max(acl.entries.iter().map(|e| e.id.0).max().unwrap_or(0));
            inner.acls.insert(
                path,
                AclState {
                    version: acl.version,
                    entries: acl.entries,
                },
            );
        }
        inner.next_id = max_id + 1;
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Serialize the current state.
    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let inner = self.read()?;
        Ok(StoreSnapshot {
            privileges: inner.privileges.values().cloned().collect(),
            principals: inner.principals.values().cloned().collect(),
            acls: inner
                .acls
                .iter()
                .map(|(path, acl)| {
                    (
                        path.clone(),
                        AclSnapshot {
                            version: acl.version,
                            entries: acl.entries.clone(),
                        },
                    )
                })
                .collect(),
        })
    }

    /// Register a privilege definition, replacing any existing one
    /// with the same name.
    pub fn register_privilege(&self, def: PrivilegeDef) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner.privileges.insert(def.name.clone(), def);
        Ok(())
    }

    /// Register several privilege definitions.
    pub fn register_privileges(
        &self,
        defs: impl IntoIterator<Item = PrivilegeDef>,
    ) -> StoreResult<()> {
        let mut inner = self.write()?;
        for def in defs {
            inner.privileges.insert(def.name.clone(), def);
        }
        Ok(())
    }

    /// Insert an entry directly, bypassing transaction semantics.
    ///
    /// Intended for seeding state in tests and fixtures; bumps the
    /// path's version like a commit would.
    pub fn insert_entry(&self, path: &str, ace: NewAce) -> StoreResult<AceId> {
        let mut inner = self.write()?;
        let id = AceId(inner.next_id);
        inner.next_id += 1;
        let acl = inner.acls.entry(path.to_string()).or_default();
        acl.entries.push(StoredAce {
            id,
            principal: ace.principal,
            allow: ace.allow,
            privileges: ace.privileges,
            restrictions: ace.restrictions,
        });
        acl.version += 1;
        Ok(id)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::access_failure("store lock poisoned"))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::access_failure("store lock poisoned"))
    }
}

impl PrivilegeCatalog for MemoryStore {
    fn privilege_by_name(&self, name: &str) -> StoreResult<PrivilegeDef> {
        let inner = self.read()?;
        inner
            .privileges
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::unknown_privilege(name))
    }
}

#[async_trait]
impl AclStore for MemoryStore {
    fn catalog(&self) -> &dyn PrivilegeCatalog {
        self
    }

    async fn paths(&self) -> StoreResult<Vec<String>> {
        let inner = self.read()?;
        Ok(inner.acls.keys().cloned().collect())
    }

    async fn begin(&self, path: &str) -> StoreResult<Box<dyn AclTransaction>> {
        let inner = self.read()?;
        let (base_version, snapshot) = match inner.acls.get(path) {
            Some(acl) => (acl.version, acl.entries.clone()),
            None => (0, Vec::new()),
        };
        Ok(Box::new(MemoryTransaction {
            store: Arc::clone(&self.inner),
            path: path.to_string(),
            base_version,
            snapshot,
            removes: Vec::new(),
            adds: Vec::new(),
        }))
    }
}

#[async_trait]
impl PrincipalDirectory for MemoryStore {
    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let inner = self.read()?;
        Ok(inner.principals.contains_key(id))
    }

    async fn ensure(&self, authorizable: &AuthorizableConfig) -> StoreResult<bool> {
        let mut inner = self.write()?;
        if inner.principals.contains_key(&authorizable.id) {
            return Ok(false);
        }
        inner.principals.insert(
            authorizable.id.clone(),
            PrincipalRecord {
                id: authorizable.id.clone(),
                is_group: authorizable.is_group,
                name: authorizable.name.clone(),
                path: authorizable.path.clone(),
                members: authorizable.members.clone(),
            },
        );
        Ok(true)
    }
}

struct MemoryTransaction {
    store: Arc<RwLock<Inner>>,
    path: String,
    base_version: u64,
    snapshot: Vec<StoredAce>,
    removes: Vec<AceId>,
    adds: Vec<NewAce>,
}

#[async_trait]
impl AclTransaction for MemoryTransaction {
    fn path(&self) -> &str {
        &self.path
    }

    fn entries(&self) -> &[StoredAce] {
        &self.snapshot
    }

    fn remove(&mut self, id: AceId) -> StoreResult<()> {
        if !self.snapshot.iter().any(|e| e.id == id) {
            return Err(StoreError::access_failure(format!(
                "entry {id} is not part of the transaction snapshot at {}",
                self.path
            )));
        }
        if self.removes.contains(&id) {
            return Err(StoreError::access_failure(format!(
                "entry {id} already staged for removal at {}",
                self.path
            )));
        }
        self.removes.push(id);
        Ok(())
    }

    fn add(&mut self, ace: NewAce) -> StoreResult<()> {
        if ace.principal.is_empty() {
            return Err(StoreError::access_failure(
                "cannot stage an entry without a principal",
            ));
        }
        self.adds.push(ace);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut inner = self
            .store
            .write()
            .map_err(|_| StoreError::access_failure("store lock poisoned"))?;
        let current_version = inner.acls.get(&self.path).map_or(0, |acl| acl.version);
        if current_version != self.base_version {
            return Err(StoreError::conflict(&self.path));
        }

        let mut next_id = inner.next_id;
        let acl = inner.acls.entry(self.path.clone()).or_default();
        acl.entries.retain(|e| !self.removes.contains(&e.id));
        for ace in self.adds {
            acl.entries.push(StoredAce {
                id: AceId(next_id),
                principal: ace.principal,
                allow: ace.allow,
                privileges: ace.privileges,
                restrictions: ace.restrictions,
            });
            next_id += 1;
        }
        acl.version += 1;
        inner.next_id = next_id;
        Ok(())
    }
}

/// The standard JCR privilege catalog, aggregates included.
#[must_use]
pub fn default_catalog() -> Vec<PrivilegeDef> {
    vec![
        PrivilegeDef::atomic("jcr:readNodes"),
        PrivilegeDef::atomic("jcr:readProperties"),
        PrivilegeDef::atomic("jcr:addChildNodes"),
        PrivilegeDef::atomic("jcr:removeNode"),
        PrivilegeDef::atomic("jcr:removeChildNodes"),
        PrivilegeDef::atomic("jcr:modifyProperties"),
        PrivilegeDef::atomic("jcr:readAccessControl"),
        PrivilegeDef::atomic("jcr:modifyAccessControl"),
        PrivilegeDef::atomic("jcr:lockManagement"),
        PrivilegeDef::atomic("jcr:versionManagement"),
        PrivilegeDef::atomic("jcr:nodeTypeManagement"),
        PrivilegeDef::atomic("jcr:retentionManagement"),
        PrivilegeDef::atomic("jcr:lifecycleManagement"),
        PrivilegeDef::aggregate("jcr:read", &["jcr:readNodes", "jcr:readProperties"]),
        PrivilegeDef::aggregate(
            "jcr:write",
            &[
                "jcr:modifyProperties",
                "jcr:addChildNodes",
                "jcr:removeNode",
                "jcr:removeChildNodes",
            ],
        ),
        PrivilegeDef::aggregate("rep:write", &["jcr:write", "jcr:nodeTypeManagement"]),
        PrivilegeDef::aggregate(
            "jcr:all",
            &[
                "jcr:read",
                "rep:write",
                "jcr:readAccessControl",
                "jcr:modifyAccessControl",
                "jcr:lockManagement",
                "jcr:versionManagement",
                "jcr:retentionManagement",
                "jcr:lifecycleManagement",
            ],
        ),
    ]
}

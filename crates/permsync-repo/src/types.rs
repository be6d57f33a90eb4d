//! Store value types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use permsync_model::Restriction;

/// Opaque identifier of a stored entry within its path's ACL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AceId(pub u64);

impl fmt::Display for AceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entry as it exists in the store's ACL at a path.
///
/// Owned by the store; mutated only through [`remove`]/[`add`] on a
/// transaction, never edited in place.
///
/// [`remove`]: crate::traits::AclTransaction::remove
/// [`add`]: crate::traits::AclTransaction::add
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAce {
    /// Entry id, unique within the path's ACL.
    pub id: AceId,
    /// Principal the entry applies to.
    pub principal: String,
    /// `true` for allow, `false` for deny.
    pub allow: bool,
    /// Privilege names as stored (may include aggregates).
    pub privileges: Vec<String>,
    /// Restriction conditions in stored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
}

/// A new entry staged for installation into a path's ACL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAce {
    /// Principal the entry applies to.
    pub principal: String,
    /// `true` for allow, `false` for deny.
    pub allow: bool,
    /// Privilege names, already validated against the catalog.
    pub privileges: Vec<String>,
    /// Restriction conditions in authored order.
    pub restrictions: Vec<Restriction>,
}

/// A privilege definition from the store's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeDef {
    /// Privilege name, e.g. `jcr:read`.
    pub name: String,
    /// Directly declared sub-privileges; empty for atomic privileges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declared_aggregates: Vec<String>,
}

impl PrivilegeDef {
    /// An atomic privilege with no sub-privileges.
    #[must_use]
    pub fn atomic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_aggregates: Vec::new(),
        }
    }

    /// An aggregate privilege declaring the given sub-privileges.
    #[must_use]
    pub fn aggregate(name: impl Into<String>, declared: &[&str]) -> Self {
        Self {
            name: name.into(),
            declared_aggregates: declared.iter().map(ToString::to_string).collect(),
        }
    }

    /// `true` if this privilege declares sub-privileges.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        !self.declared_aggregates.is_empty()
    }
}

/// A provisioned authorizable as the store knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    /// Principal id.
    pub id: String,
    /// `true` for groups.
    pub is_group: bool,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Intermediate path the authorizable was created under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Member authorizable ids (groups only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

/// Serialized state of a [`MemoryStore`](crate::MemoryStore): the
/// privilege catalog, provisioned principals, and per-path ACLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Privilege catalog.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<PrivilegeDef>,
    /// Provisioned authorizables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principals: Vec<PrincipalRecord>,
    /// ACLs keyed by path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub acls: BTreeMap<String, AclSnapshot>,
}

/// Snapshot of one path's ACL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AclSnapshot {
    /// Version counter, bumped on every commit against the path.
    pub version: u64,
    /// Entries in evaluation order.
    pub entries: Vec<StoredAce>,
}

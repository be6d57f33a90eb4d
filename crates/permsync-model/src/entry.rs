//! Desired access-control entries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Allow/deny polarity of an access-control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Allow,
    Deny,
}

impl Permission {
    /// `true` for [`Permission::Allow`].
    #[must_use]
    pub fn is_allow(self) -> bool {
        matches!(self, Permission::Allow)
    }
}

impl FromStr for Permission {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(Permission::Allow),
            "deny" => Ok(Permission::Deny),
            other => Err(ModelError::InvalidPermission {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Allow => write!(f, "allow"),
            Permission::Deny => write!(f, "deny"),
        }
    }
}

/// A (name, value) condition narrowing where an entry applies
/// beyond the bare path, e.g. a subtree glob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Restriction {
    /// Restriction name, e.g. `rep:glob`.
    pub name: String,
    /// Restriction value.
    pub value: String,
}

impl Restriction {
    /// Create a new restriction.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One desired access-control entry: the unit of declared state.
///
/// Privileges are kept as authored and may name aggregates; equality
/// between desired and stored entries is decided downstream on the
/// expanded form, never on this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AceEntry {
    /// Absolute location in the hierarchical store.
    pub path: String,
    /// Identity the entry applies to.
    pub principal: String,
    /// Allow or deny.
    pub permission: Permission,
    /// Privilege names as authored (may include aggregates).
    pub privileges: Vec<String>,
    /// Ordered restriction conditions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
    /// Post-install side effects; not part of ACE equality.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

impl AceEntry {
    /// Create an entry without restrictions or actions.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        principal: impl Into<String>,
        permission: Permission,
        privileges: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            principal: principal.into(),
            permission,
            privileges,
            restrictions: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Attach restrictions.
    #[must_use]
    pub fn with_restrictions(mut self, restrictions: Vec<Restriction>) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// Attach post-install actions.
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<String>) -> Self {
        self.actions = actions;
        self
    }

    /// `true` if this entry grants rather than denies.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.permission.is_allow()
    }
}

/// Group desired entries by path, preserving authored order within each
/// path. The map is ordered so callers process paths deterministically.
#[must_use]
pub fn group_by_path(entries: Vec<AceEntry>) -> BTreeMap<String, Vec<AceEntry>> {
    let mut grouped: BTreeMap<String, Vec<AceEntry>> = BTreeMap::new();
    for entry in entries {
        grouped.entry(entry.path.clone()).or_default().push(entry);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_parse() {
        assert_eq!("allow".parse::<Permission>().unwrap(), Permission::Allow);
        assert_eq!("deny".parse::<Permission>().unwrap(), Permission::Deny);
        assert!("read".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_roundtrip_display() {
        assert_eq!(Permission::Allow.to_string(), "allow");
        assert_eq!(Permission::Deny.to_string(), "deny");
    }

    #[test]
    fn test_group_by_path_preserves_order_within_path() {
        let entries = vec![
            AceEntry::new("/content/b", "g1", Permission::Allow, vec!["jcr:read".into()]),
            AceEntry::new("/content/a", "g1", Permission::Allow, vec!["jcr:read".into()]),
            AceEntry::new("/content/b", "g2", Permission::Deny, vec!["rep:write".into()]),
        ];

        let grouped = group_by_path(entries);
        let paths: Vec<_> = grouped.keys().cloned().collect();
        assert_eq!(paths, vec!["/content/a", "/content/b"]);

        let b = &grouped["/content/b"];
        assert_eq!(b[0].principal, "g1");
        assert_eq!(b[1].principal, "g2");
    }

    #[test]
    fn test_entry_serde_omits_empty_collections() {
        let entry = AceEntry::new(
            "/content",
            "g1",
            Permission::Allow,
            vec!["jcr:read".to_string()],
        );
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("restrictions"));
        assert!(!json.contains("actions"));
    }
}

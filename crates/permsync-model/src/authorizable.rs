//! Declared authorizables (groups and users).

use serde::{Deserialize, Serialize};

/// A group or user declared in the configuration, provisioned before
/// any ACL installation references it as a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizableConfig {
    /// Principal id, unique across groups and users.
    pub id: String,
    /// Display name; defaults to the id when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `true` for groups, `false` for users.
    pub is_group: bool,
    /// Intermediate path under the authorizable root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Ids of member authorizables (groups only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl AuthorizableConfig {
    /// Create a group with the given id.
    #[must_use]
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: true,
            path: None,
            members: Vec::new(),
        }
    }

    /// Create a user with the given id.
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_group: false,
            path: None,
            members: Vec::new(),
        }
    }

    /// Display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

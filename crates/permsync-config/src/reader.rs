//! YAML configuration loading and bean extraction.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::warn;

use permsync_model::{AceEntry, AuthorizableConfig, Permission, Restriction};

use crate::error::{ConfigError, ConfigResult};
use crate::macros::{expand_macros, Variables};

const SUPPORTED_VERSION: &str = "1";

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    global_config: RawGlobalConfig,
    #[serde(default)]
    group_config: Vec<RawAuthorizable>,
    #[serde(default)]
    user_config: Vec<RawAuthorizable>,
    #[serde(default)]
    ace_config: Vec<RawAceBlock>,
}

fn default_version() -> String {
    SUPPORTED_VERSION.to_string()
}

#[derive(Debug, Default, Deserialize)]
struct RawGlobalConfig {
    #[serde(default)]
    vars: BTreeMap<String, String>,
    /// Principals that may be referenced from `ace_config` without
    /// being declared in `group_config`/`user_config`.
    #[serde(default)]
    external_principals: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAuthorizable {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    members: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAceBlock {
    principal: String,
    entries: Vec<RawAce>,
}

#[derive(Debug, Deserialize)]
struct RawAce {
    path: String,
    permission: String,
    privileges: Vec<String>,
    #[serde(default)]
    restrictions: Vec<RawRestriction>,
    #[serde(default)]
    actions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRestriction {
    name: String,
    value: String,
}

/// A fully resolved configuration: macro-expanded, validated,
/// deduplicated, ready for the apply service.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Desired entries in authored order.
    pub entries: Vec<AceEntry>,
    /// Declared authorizables, groups before users.
    pub authorizables: Vec<AuthorizableConfig>,
    /// Principals this configuration is authorized to manage: every
    /// declared authorizable plus every principal referenced from
    /// `ace_config`.
    pub managed_principals: BTreeSet<String>,
}

/// Load and resolve a configuration file.
pub fn load_file(path: &Path) -> ConfigResult<ResolvedConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse and resolve a configuration document.
pub fn parse_str(content: &str) -> ConfigResult<ResolvedConfig> {
    let doc: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::yaml(&e))?;

    let vars = extract_vars(&doc);
    let expanded = expand_macros(doc, &vars)?;

    let raw: RawConfig =
        serde_yaml::from_value(expanded).map_err(|e| ConfigError::yaml(&e))?;
    resolve(raw)
}

/// Variables are read from the unexpanded tree; the `vars` section
/// itself is not subject to macro expansion.
fn extract_vars(doc: &Value) -> Variables {
    let mut vars = Variables::new();
    if let Some(mapping) = doc
        .get("global_config")
        .and_then(|g| g.get("vars"))
        .and_then(Value::as_mapping)
    {
        for (key, value) in mapping {
            if let (Some(key), Some(value)) = (key.as_str(), scalar_to_string(value)) {
                vars.insert(key.to_string(), value);
            }
        }
    }
    vars
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn resolve(raw: RawConfig) -> ConfigResult<ResolvedConfig> {
    if raw.version != SUPPORTED_VERSION {
        return Err(ConfigError::validation(format!(
            "unsupported config version '{}' (only '{SUPPORTED_VERSION}' is supported)",
            raw.version
        )));
    }

    let mut authorizables = Vec::new();
    let mut declared = BTreeSet::new();
    for (raw_authorizable, is_group) in raw
        .group_config
        .into_iter()
        .map(|a| (a, true))
        .chain(raw.user_config.into_iter().map(|a| (a, false)))
    {
        if raw_authorizable.id.is_empty() {
            return Err(ConfigError::validation(
                "authorizable with empty id".to_string(),
            ));
        }
        if !declared.insert(raw_authorizable.id.clone()) {
            return Err(ConfigError::validation(format!(
                "authorizable '{}' declared more than once",
                raw_authorizable.id
            )));
        }
        authorizables.push(AuthorizableConfig {
            id: raw_authorizable.id,
            name: raw_authorizable.name,
            is_group,
            path: raw_authorizable.path,
            members: raw_authorizable.members,
        });
    }

    let externals: BTreeSet<String> = raw
        .global_config
        .external_principals
        .into_iter()
        .collect();

    let mut entries: Vec<AceEntry> = Vec::new();
    let mut seen: BTreeMap<(String, String), usize> = BTreeMap::new();
    let mut managed_principals = declared.clone();

    for block in raw.ace_config {
        if !declared.contains(&block.principal) && !externals.contains(&block.principal) {
            return Err(ConfigError::validation(format!(
                "principal '{}' is referenced from ace_config but declared nowhere \
                 (add it to group_config/user_config or external_principals)",
                block.principal
            )));
        }
        managed_principals.insert(block.principal.clone());

        for raw_ace in block.entries {
            let entry = build_entry(&block.principal, raw_ace)?;
            let key = (entry.path.clone(), entry.principal.clone());
            match seen.get(&key) {
                Some(&index) => {
                    warn!(
                        path = %entry.path,
                        principal = %entry.principal,
                        "duplicate entry for (path, principal); last one wins"
                    );
                    entries[index] = entry;
                }
                None => {
                    seen.insert(key, entries.len());
                    entries.push(entry);
                }
            }
        }
    }

    Ok(ResolvedConfig {
        entries,
        authorizables,
        managed_principals,
    })
}

fn build_entry(principal: &str, raw: RawAce) -> ConfigResult<AceEntry> {
    if !raw.path.starts_with('/') {
        return Err(ConfigError::validation(format!(
            "path '{}' for principal '{principal}' is not absolute",
            raw.path
        )));
    }
    let permission: Permission = raw.permission.parse().map_err(|_| {
        ConfigError::validation(format!(
            "invalid permission '{}' at {} for principal '{principal}'",
            raw.permission, raw.path
        ))
    })?;
    if raw.privileges.is_empty() {
        return Err(ConfigError::validation(format!(
            "entry at {} for principal '{principal}' declares no privileges",
            raw.path
        )));
    }

    Ok(AceEntry {
        path: raw.path,
        principal: principal.to_string(),
        permission,
        privileges: raw.privileges,
        restrictions: raw
            .restrictions
            .into_iter()
            .map(|r| Restriction::new(r.name, r.value))
            .collect(),
        actions: raw.actions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
version: "1"
group_config:
  - id: content-editors
    name: Content Editors
    path: /home/groups/content
user_config:
  - id: replication-service
ace_config:
  - principal: content-editors
    entries:
      - path: /content/site1
        permission: allow
        privileges: [jcr:read, rep:write]
        restrictions:
          - name: rep:glob
            value: "*/jcr:content/*"
  - principal: replication-service
    entries:
      - path: /content/site1
        permission: deny
        privileges: [jcr:removeNode]
        actions: [replicate]
"#;

    #[test]
    fn test_parse_basic_config() {
        let resolved = parse_str(BASIC).unwrap();

        assert_eq!(resolved.authorizables.len(), 2);
        assert!(resolved.authorizables[0].is_group);
        assert!(!resolved.authorizables[1].is_group);

        assert_eq!(resolved.entries.len(), 2);
        let first = &resolved.entries[0];
        assert_eq!(first.principal, "content-editors");
        assert!(first.is_allow());
        assert_eq!(first.restrictions[0].name, "rep:glob");

        let second = &resolved.entries[1];
        assert!(!second.is_allow());
        assert_eq!(second.actions, vec!["replicate"]);

        assert!(resolved.managed_principals.contains("content-editors"));
        assert!(resolved.managed_principals.contains("replication-service"));
    }

    #[test]
    fn test_macro_expansion_end_to_end() {
        let config = r"
global_config:
  vars:
    env: prod
group_config:
  - FOR site IN [site1, site2]:
      - id: ${site}-editors
ace_config:
  - FOR site IN [site1, site2]:
      - principal: ${site}-editors
        entries:
          - path: /content/${env}/${site}
            permission: allow
            privileges: [jcr:read]
";
        let resolved = parse_str(config).unwrap();

        let ids: Vec<_> = resolved.authorizables.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["site1-editors", "site2-editors"]);

        let paths: Vec<_> = resolved.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/content/prod/site1", "/content/prod/site2"]);
    }

    #[test]
    fn test_undeclared_principal_is_rejected() {
        let config = r"
ace_config:
  - principal: ghosts
    entries:
      - path: /content
        permission: allow
        privileges: [jcr:read]
";
        let err = parse_str(config).unwrap_err();
        assert!(err.to_string().contains("ghosts"));
    }

    #[test]
    fn test_external_principal_is_allowed() {
        let config = r"
global_config:
  external_principals: [everyone]
ace_config:
  - principal: everyone
    entries:
      - path: /content
        permission: allow
        privileges: [jcr:read]
";
        let resolved = parse_str(config).unwrap();
        assert!(resolved.managed_principals.contains("everyone"));
    }

    #[test]
    fn test_duplicate_path_principal_last_wins() {
        let config = r"
group_config:
  - id: g1
ace_config:
  - principal: g1
    entries:
      - path: /content
        permission: allow
        privileges: [jcr:read]
      - path: /content
        permission: allow
        privileges: [rep:write]
";
        let resolved = parse_str(config).unwrap();
        assert_eq!(resolved.entries.len(), 1);
        assert_eq!(resolved.entries[0].privileges, vec!["rep:write"]);
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let config = r"
group_config:
  - id: g1
ace_config:
  - principal: g1
    entries:
      - path: content/site1
        permission: allow
        privileges: [jcr:read]
";
        let err = parse_str(config).unwrap_err();
        assert!(err.to_string().contains("not absolute"));
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let err = parse_str("version: \"2\"").unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn test_invalid_permission_carries_context() {
        let config = r"
group_config:
  - id: g1
ace_config:
  - principal: g1
    entries:
      - path: /content
        permission: maybe
        privileges: [jcr:read]
";
        let err = parse_str(config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("maybe"));
        assert!(message.contains("g1"));
    }

    #[test]
    fn test_yaml_error_reports_location() {
        let err = parse_str("ace_config: [}").unwrap_err();
        assert!(err.to_string().contains("line"));
    }
}

//! Privilege normalization.
//!
//! Aggregate privileges are expanded to their atomic constituents so
//! that privilege sets authored in different forms compare equal:
//! `jcr:read` and `{jcr:readNodes, jcr:readProperties}` are the same
//! grant.

use std::collections::BTreeSet;

use permsync_repo::PrivilegeCatalog;

use crate::error::{EngineError, EngineResult};

/// Expand a privilege name into its atomic constituents.
///
/// An atomic privilege expands to the singleton set containing itself;
/// an aggregate expands to the union of its declared sub-privileges,
/// recursively. A cycle in the catalog fails with
/// [`EngineError::CyclicPrivilege`] instead of recursing forever.
pub fn expand(name: &str, catalog: &dyn PrivilegeCatalog) -> EngineResult<BTreeSet<String>> {
    let mut atoms = BTreeSet::new();
    let mut stack = Vec::new();
    expand_into(name, catalog, &mut stack, &mut atoms)?;
    Ok(atoms)
}

/// Expand several privilege names and union the results.
pub fn expand_all(
    names: &[String],
    catalog: &dyn PrivilegeCatalog,
) -> EngineResult<BTreeSet<String>> {
    let mut atoms = BTreeSet::new();
    let mut stack = Vec::new();
    for name in names {
        expand_into(name, catalog, &mut stack, &mut atoms)?;
    }
    Ok(atoms)
}

/// Canonical comparable rendering of a privilege name collection:
/// fully expanded, deduplicated, sorted ascending, rendered as
/// `[a, b, c]`. Input order never affects the output.
pub fn comparable_set(names: &[String], catalog: &dyn PrivilegeCatalog) -> EngineResult<String> {
    let atoms = expand_all(names, catalog)?;
    let joined = atoms.into_iter().collect::<Vec<_>>().join(", ");
    Ok(format!("[{joined}]"))
}

fn expand_into(
    name: &str,
    catalog: &dyn PrivilegeCatalog,
    stack: &mut Vec<String>,
    atoms: &mut BTreeSet<String>,
) -> EngineResult<()> {
    if stack.iter().any(|seen| seen == name) {
        return Err(EngineError::cyclic(name));
    }
    let def = catalog.privilege_by_name(name)?;
    if !def.is_aggregate() {
        atoms.insert(def.name);
        return Ok(());
    }
    stack.push(name.to_string());
    for sub in &def.declared_aggregates {
        expand_into(sub, catalog, stack, atoms)?;
    }
    stack.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use permsync_repo::{MemoryStore, PrivilegeDef, StoreError};

    fn catalog() -> MemoryStore {
        MemoryStore::with_default_catalog()
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_atomic_expands_to_singleton() {
        let store = catalog();
        let atoms = expand("jcr:lockManagement", &store).unwrap();
        assert_eq!(atoms.len(), 1);
        assert!(atoms.contains("jcr:lockManagement"));
    }

    #[test]
    fn test_aggregate_resolves_to_atoms() {
        let store = catalog();
        assert_eq!(
            comparable_set(&names(&["jcr:read"]), &store).unwrap(),
            "[jcr:readNodes, jcr:readProperties]"
        );
    }

    #[test]
    fn test_nested_aggregate_resolves_fully() {
        let store = catalog();
        // rep:write nests jcr:write; no aggregate name may survive.
        let rendered = comparable_set(&names(&["rep:write"]), &store).unwrap();
        assert_eq!(
            rendered,
            "[jcr:addChildNodes, jcr:modifyProperties, jcr:nodeTypeManagement, \
             jcr:removeChildNodes, jcr:removeNode]"
        );
    }

    #[test]
    fn test_order_does_not_matter() {
        let store = catalog();
        assert_eq!(
            comparable_set(&names(&["jcr:lockManagement", "jcr:removeNode"]), &store).unwrap(),
            comparable_set(&names(&["jcr:removeNode", "jcr:lockManagement"]), &store).unwrap(),
        );
    }

    #[test]
    fn test_aggregate_and_expansion_compare_equal() {
        let store = catalog();
        assert_eq!(
            comparable_set(&names(&["jcr:read"]), &store).unwrap(),
            comparable_set(&names(&["jcr:readNodes", "jcr:readProperties"]), &store).unwrap(),
        );
    }

    #[test]
    fn test_mixed_aggregate_and_atomic_input() {
        let store = catalog();
        assert_eq!(
            comparable_set(
                &names(&["jcr:removeNode", "jcr:read", "jcr:lockManagement"]),
                &store
            )
            .unwrap(),
            "[jcr:lockManagement, jcr:readNodes, jcr:readProperties, jcr:removeNode]"
        );
    }

    #[test]
    fn test_unknown_privilege_surfaces_name() {
        let store = catalog();
        let err = comparable_set(&names(&["jcr:reed"]), &store).unwrap_err();
        match err {
            EngineError::Store(StoreError::UnknownPrivilege { name }) => {
                assert_eq!(name, "jcr:reed");
            }
            other => panic!("expected unknown privilege, got {other}"),
        }
    }

    #[test]
    fn test_cycle_is_detected() {
        let store = MemoryStore::new();
        store
            .register_privileges([
                PrivilegeDef::aggregate("a", &["b"]),
                PrivilegeDef::aggregate("b", &["a"]),
            ])
            .unwrap();

        let err = expand("a", &store).unwrap_err();
        assert!(matches!(err, EngineError::CyclicPrivilege { .. }));
    }

    #[test]
    fn test_diamond_catalog_is_not_a_cycle() {
        let store = MemoryStore::new();
        store
            .register_privileges([
                PrivilegeDef::atomic("leaf"),
                PrivilegeDef::aggregate("left", &["leaf"]),
                PrivilegeDef::aggregate("right", &["leaf"]),
                PrivilegeDef::aggregate("top", &["left", "right"]),
            ])
            .unwrap();

        assert_eq!(
            comparable_set(&names(&["top"]), &store).unwrap(),
            "[leaf]"
        );
    }
}

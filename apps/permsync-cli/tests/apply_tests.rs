//! Integration tests for the apply command implementation.
//!
//! These exercise the command functions directly through the library
//! crate; the binary-level interface is covered in `cli_tests.rs`.

use std::path::PathBuf;

use tempfile::TempDir;

use permsync_cli::commands::apply::{execute as apply, ApplyArgs};
use permsync_cli::state::load_store;
use permsync_repo::AclStore;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write test file");
    path
}

fn args(config: PathBuf, state: PathBuf) -> ApplyArgs {
    ApplyArgs {
        file: config,
        state,
        restrict_root: vec![],
        dry_run: false,
        yes: true,
        json: true,
    }
}

const TWO_SITES: &str = r"
group_config:
  - id: site1-editors
  - id: site2-editors
ace_config:
  - principal: site1-editors
    entries:
      - path: /content/site1
        permission: allow
        privileges: [jcr:read]
  - principal: site2-editors
    entries:
      - path: /content/site2
        permission: allow
        privileges: [jcr:read]
";

#[tokio::test]
async fn apply_writes_entries_and_provisions_groups() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config.yaml", TWO_SITES);
    let state = dir.path().join("state.json");

    let code = apply(&args(config, state.clone())).await.unwrap();
    assert_eq!(code, 0);

    let store = load_store(&state).unwrap();
    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.acls.len(), 2);
    assert!(snapshot.principals.iter().any(|p| p.id == "site1-editors"));
    assert!(snapshot.principals.iter().all(|p| p.is_group));
}

#[tokio::test]
async fn apply_is_idempotent_across_runs() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config.yaml", TWO_SITES);
    let state = dir.path().join("state.json");

    apply(&args(config.clone(), state.clone())).await.unwrap();
    let before = load_store(&state).unwrap().snapshot().unwrap();

    let code = apply(&args(config, state.clone())).await.unwrap();
    assert_eq!(code, 0);

    let after = load_store(&state).unwrap().snapshot().unwrap();
    for (path, acl) in &before.acls {
        // No rewrites happened, so no version moved.
        assert_eq!(acl.version, after.acls[path].version);
    }
}

#[tokio::test]
async fn restrict_root_scopes_the_apply() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config.yaml", TWO_SITES);
    let state = dir.path().join("state.json");

    let mut scoped = args(config, state.clone());
    scoped.restrict_root = vec!["/content/site1".to_string()];

    let code = apply(&scoped).await.unwrap();
    assert_eq!(code, 0);

    let store = load_store(&state).unwrap();
    let paths = store.paths().await.unwrap();
    assert_eq!(paths, vec!["/content/site1"]);
}

#[tokio::test]
async fn removed_config_entries_are_removed_from_store() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");

    let full = write_file(&dir, "full.yaml", TWO_SITES);
    apply(&args(full, state.clone())).await.unwrap();

    // site2 dropped from the config, but site2-editors still managed.
    let reduced = write_file(
        &dir,
        "reduced.yaml",
        r"
group_config:
  - id: site1-editors
  - id: site2-editors
ace_config:
  - principal: site1-editors
    entries:
      - path: /content/site1
        permission: allow
        privileges: [jcr:read]
  - principal: site2-editors
    entries: []
",
    );
    apply(&args(reduced, state.clone())).await.unwrap();

    let snapshot = load_store(&state).unwrap().snapshot().unwrap();
    assert!(snapshot.acls["/content/site2"].entries.is_empty());
    assert_eq!(snapshot.acls["/content/site1"].entries.len(), 1);
}

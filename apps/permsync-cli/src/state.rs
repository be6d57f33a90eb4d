//! Loading and saving the JSON store snapshot the CLI operates on.

use std::path::Path;

use permsync_repo::{default_catalog, MemoryStore, StoreSnapshot};

use crate::error::{CliError, CliResult};

/// Load a store from a snapshot file.
///
/// A missing file bootstraps an empty store, and a snapshot without a
/// privilege catalog gets the standard JCR catalog, so a first apply
/// against a fresh state file just works.
pub fn load_store(path: &Path) -> CliResult<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::with_default_catalog());
    }
    let content = std::fs::read_to_string(path)?;
    let snapshot: StoreSnapshot = serde_json::from_str(&content)?;
    let needs_catalog = snapshot.privileges.is_empty();
    let store = MemoryStore::from_snapshot(snapshot);
    if needs_catalog {
        store.register_privileges(default_catalog())?;
    }
    Ok(store)
}

/// Write the store's current state back to the snapshot file.
pub fn save_store(path: &Path, store: &MemoryStore) -> CliResult<()> {
    let snapshot = store.snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json).map_err(CliError::from)
}

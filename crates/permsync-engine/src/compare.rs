//! Comparable form of an access-control entry.

use permsync_model::AceEntry;
use permsync_repo::{PrivilegeCatalog, StoredAce};

use crate::error::EngineResult;
use crate::privileges::comparable_set;

/// Canonical, order-independent representation of one entry, used only
/// to decide equality between desired and stored state.
///
/// Computed fresh on every reconciliation pass from both sides; never
/// persisted. Aggregate membership is irrelevant: privileges are
/// compared fully expanded, and restrictions as sorted (name, value)
/// pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparableAce {
    principal: String,
    allow: bool,
    privileges: String,
    restrictions: Vec<(String, String)>,
}

impl ComparableAce {
    /// Build the comparable form of a desired entry.
    pub fn from_desired(entry: &AceEntry, catalog: &dyn PrivilegeCatalog) -> EngineResult<Self> {
        let privileges = comparable_set(&entry.privileges, catalog)
            .map_err(|err| err.for_principal(&entry.principal))?;
        Ok(Self {
            principal: entry.principal.clone(),
            allow: entry.is_allow(),
            privileges,
            restrictions: sorted_restrictions(
                entry.restrictions.iter().map(|r| (&r.name, &r.value)),
            ),
        })
    }

    /// Build the comparable form of a stored entry.
    pub fn from_stored(ace: &StoredAce, catalog: &dyn PrivilegeCatalog) -> EngineResult<Self> {
        let privileges = comparable_set(&ace.privileges, catalog)
            .map_err(|err| err.for_principal(&ace.principal))?;
        Ok(Self {
            principal: ace.principal.clone(),
            allow: ace.allow,
            privileges,
            restrictions: sorted_restrictions(
                ace.restrictions.iter().map(|r| (&r.name, &r.value)),
            ),
        })
    }

}

fn sorted_restrictions<'a>(
    pairs: impl Iterator<Item = (&'a String, &'a String)>,
) -> Vec<(String, String)> {
    let mut sorted: Vec<(String, String)> =
        pairs.map(|(name, value)| (name.clone(), value.clone())).collect();
    sorted.sort();
    sorted
}

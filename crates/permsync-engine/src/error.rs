//! Engine error types.

use thiserror::Error;

use permsync_repo::StoreError;

/// Errors raised while reconciling or installing access control.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The privilege catalog contains a cycle reachable from `name`.
    #[error("cyclic privilege definition involving '{name}'")]
    CyclicPrivilege { name: String },

    /// Privilege resolution failed for a specific principal's entry.
    #[error("privilege resolution failed for principal '{principal}': {message}")]
    PrivilegeResolution { principal: String, message: String },
}

impl EngineError {
    /// Create a cyclic privilege error.
    pub fn cyclic(name: impl Into<String>) -> Self {
        Self::CyclicPrivilege { name: name.into() }
    }

    /// Attribute a privilege-resolution failure to the principal whose
    /// entry was being processed. Other errors pass through unchanged.
    #[must_use]
    pub fn for_principal(self, principal: &str) -> Self {
        let is_resolution = matches!(
            self,
            EngineError::Store(StoreError::UnknownPrivilege { .. })
                | EngineError::CyclicPrivilege { .. }
        );
        if is_resolution {
            EngineError::PrivilegeResolution {
                principal: principal.to_string(),
                message: self.to_string(),
            }
        } else {
            self
        }
    }

    /// `true` if this error is a concurrent modification conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Store(err) if err.is_conflict())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

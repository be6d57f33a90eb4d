//! Store error types.

use thiserror::Error;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced privilege name is not in the catalog.
    #[error("unknown privilege: {name}")]
    UnknownPrivilege { name: String },

    /// The store rejected a read or write.
    #[error("store access failure: {message}")]
    AccessFailure { message: String },

    /// The ACL at a path changed between snapshot and commit.
    #[error("conflicting concurrent modification at {path}")]
    ConflictingModification { path: String },

    /// No ACL exists at the path (only raised by operations that
    /// require one; opening a transaction creates an empty list).
    #[error("no access control list at {path}")]
    NoSuchPath { path: String },

    /// Snapshot (de)serialization error.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create an unknown privilege error.
    pub fn unknown_privilege(name: impl Into<String>) -> Self {
        Self::UnknownPrivilege { name: name.into() }
    }

    /// Create an access failure.
    pub fn access_failure(message: impl Into<String>) -> Self {
        Self::AccessFailure {
            message: message.into(),
        }
    }

    /// Create a conflict error for the given path.
    pub fn conflict(path: impl Into<String>) -> Self {
        Self::ConflictingModification { path: path.into() }
    }

    /// Create a missing path error.
    pub fn no_such_path(path: impl Into<String>) -> Self {
        Self::NoSuchPath { path: path.into() }
    }

    /// `true` if this error is a concurrent modification conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConflictingModification { .. })
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = StoreError::unknown_privilege("jcr:tpyo");
        assert!(err.to_string().contains("jcr:tpyo"));

        let err = StoreError::conflict("/content/site1");
        assert!(err.to_string().contains("/content/site1"));
    }

    #[test]
    fn test_is_conflict() {
        assert!(StoreError::conflict("/a").is_conflict());
        assert!(!StoreError::access_failure("denied").is_conflict());
    }
}

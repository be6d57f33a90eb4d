//! CLI error types and exit codes.

use thiserror::Error;

use permsync_config::ConfigError;
use permsync_engine::EngineError;
use permsync_repo::StoreError;

/// Exit codes for the CLI
/// - 0: Success (diff: no drift)
/// - 1: General error, failed paths, or aborted
/// - 2: Drift detected (diff)
/// - 4: Configuration validation error
/// - 5: Store or engine error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file error: {0}")]
    State(#[from] serde_json::Error),

    #[error("Cancelled.")]
    Aborted,
}

impl CliError {
    /// Map the error to its process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 4,
            CliError::Engine(_) | CliError::Store(_) => 5,
            CliError::Input(_) | CliError::Io(_) | CliError::State(_) | CliError::Aborted => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::Config(ConfigError::validation("bad")).exit_code(),
            4
        );
        assert_eq!(CliError::Input("nope".to_string()).exit_code(), 1);
        assert_eq!(CliError::Aborted.exit_code(), 1);
    }
}

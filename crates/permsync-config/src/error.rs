//! Configuration error types.

use thiserror::Error;

/// Errors raised while reading or expanding a configuration source.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed or deserialized.
    #[error("invalid YAML{location}: {message}")]
    Yaml { message: String, location: String },

    /// A `${var}` reference has no definition.
    #[error("unknown variable '${{{name}}}'")]
    UnknownVariable { name: String },

    /// The configuration is structurally valid but violates a rule.
    #[error("invalid configuration: {message}")]
    Validation { message: String },

    /// I/O error reading the configuration source.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a YAML error, extracting line/column when available.
    pub fn yaml(err: &serde_yaml::Error) -> Self {
        let location = err.location().map_or_else(String::new, |loc| {
            format!(" at line {}, column {}", loc.line(), loc.column())
        });
        Self::Yaml {
            message: err.to_string(),
            location,
        }
    }

    /// Create an unknown variable error.
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable { name: name.into() }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variable_display() {
        let err = ConfigError::unknown_variable("env");
        assert_eq!(err.to_string(), "unknown variable '${env}'");
    }
}

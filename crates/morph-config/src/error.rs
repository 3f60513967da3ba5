//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config at {}: {source}", .path.display())]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid for its format
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        /// Format that was being parsed
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// The file extension does not map to a supported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A field holds a value the engine cannot use
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Offending field
        field: String,
        /// Description of the problem
        value: String,
    },
}

/// Specialized Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a parse error for the given format
    pub fn parse(format: &'static str, message: impl ToString) -> Self {
        Self::Parse {
            format,
            message: message.to_string(),
        }
    }

    /// Create an invalid value error
    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Get error category for diagnostics
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}

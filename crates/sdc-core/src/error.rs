//! Error types for sdc-core
//!
//! Centralized error handling using `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Main error type for sdc-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// URL is malformed, has no host, or is not HTTP(S)
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The host refused to remove browsing data
    #[error("Data deletion failed for {scope}: {message}")]
    DeletionFailure {
        /// Human-readable description of the removal scope
        scope: String,
        /// Error message reported by the host
        message: String,
    },

    /// Key-value storage failed
    #[error("Storage error for key '{key}': {message}")]
    Storage {
        /// Storage key being read or written
        key: String,
        /// Error message
        message: String,
    },

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Periodic timer registration failed
    #[error("Timer error: {0}")]
    Timer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to the missing config file
        path: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    ConfigValue {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a deletion failure
    pub fn deletion(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeletionFailure {
            scope: scope.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a config value error
    pub fn config_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error is an ignorable URL rejection
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }
}

//! Platform-specific errors

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// State file could not be read or written
    #[error("State file error at {path}: {source}")]
    StateFile {
        /// Path of the state file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// State file exists but is not a JSON object
    #[error("Corrupt state file at {path}: {message}")]
    CorruptState {
        /// Path of the state file
        path: String,
        /// Parser message
        message: String,
    },

    /// Browsing-data removal was refused
    #[error("Removal refused for {scope}")]
    RemovalRefused {
        /// Removal scope
        scope: String,
    },

    /// Alarm registration needs a running tokio runtime
    #[error("No async runtime available to drive alarm '{0}'")]
    NoRuntime(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform result type
pub type Result<T> = std::result::Result<T, PlatformError>;

impl From<PlatformError> for sdc_core::Error {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::StateFile { path, source } => {
                sdc_core::Error::storage(path, source.to_string())
            }
            PlatformError::CorruptState { path, message } => sdc_core::Error::storage(path, message),
            PlatformError::RemovalRefused { scope } => {
                sdc_core::Error::deletion(scope, "refused by host")
            }
            PlatformError::NoRuntime(name) => {
                sdc_core::Error::Timer(format!("no async runtime available to drive alarm '{name}'"))
            }
            PlatformError::Serialization(e) => sdc_core::Error::Serialization(e),
            PlatformError::Io(e) => sdc_core::Error::Io(e),
        }
    }
}

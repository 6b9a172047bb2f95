//! Structured error types for the homestead libraries.
//!
//! Uses `thiserror` for better API surface and error composition.
//! The storage crate catches these at its public boundary (load/save/delete
//! never surface an error to the control path), so everything here exists
//! for internal propagation with `?` and for log payloads.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for homestead operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Relational query or connection failed
    #[error("database error: {source}")]
    Database {
        #[from]
        source: sqlx::Error,
    },

    /// YAML parsing or serialization failed
    #[error("YAML error at {context}: {source}")]
    Yaml {
        context: String,
        source: serde_yaml::Error,
    },

    /// Configuration file could not be parsed
    #[error("configuration parse error: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// Configuration error
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Home name rejected by validation
    #[error("invalid home name '{name}': {reason}")]
    InvalidHomeName { name: String, reason: String },

    /// Configuration or data file not found
    #[error("path not found: {path:?}")]
    PathNotFound { path: PathBuf },
}

/// Result type alias for homestead operations
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Create a YAML error with context
    pub fn yaml(context: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            context: context.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create an invalid-name error
    pub fn invalid_home_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHomeName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound { path: path.into() }
    }
}

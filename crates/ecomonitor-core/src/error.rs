//! Core error types for ecomonitor-core.
//!
//! Most operations in this crate degrade to a safe default instead of
//! returning an error (a failed streak read yields a zero streak, a failed
//! preference read yields "lock disabled"). The types here cover the places
//! where a caller does get to see the failure: explicit preference writes,
//! configuration, and the storage backends themselves.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for ecomonitor-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore) backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another connection
    #[error("Store is locked")]
    Locked,

    /// OS keyring rejected the operation
    #[error("Keyring error for '{key}': {message}")]
    Keyring { key: String, message: String },

    /// Internal connection mutex was poisoned by a panicking writer
    #[error("Store connection poisoned")]
    Poisoned,

    /// Backend is temporarily unavailable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Hardware authentication errors.
///
/// These never escape the unlock gate as `Err`; the gate folds them into its
/// `AuthError` state. They are public so `HardwareAuth` implementors can
/// report what went wrong.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No biometric hardware on this device
    #[error("Biometric hardware not present")]
    HardwareUnavailable,

    /// Platform prompt failed to run
    #[error("Authentication prompt failed: {0}")]
    PromptFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

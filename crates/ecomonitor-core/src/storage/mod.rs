//! Persisted key-value storage.
//!
//! Every piece of local state in this crate (streak record, guest usage
//! counter, biometric lock preference, session identity) lives in a
//! [`KeyValueStore`] under a fixed string key. Three backends are provided:
//!
//! - [`SqliteStore`]: a `kv` table in `ecomonitor.db`
//! - [`KeyringStore`]: the OS keyring, encrypted at rest by the platform
//! - [`MemoryStore`]: in-process, with failure injection for tests

mod config;
pub mod secure;
pub mod memory;
pub mod sqlite;

pub use secure::KeyringStore;
pub use config::{BiometricConfig, Config, LoggingConfig, StorageBackend, StorageConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ConfigError, StoreError};

/// Async string-keyed store shared by all session components.
///
/// Implementations may fail transiently. Callers in this crate treat a
/// failed `get` as "value absent" and a failed `set` as "write not
/// guaranteed"; see the individual components for how each one degrades.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Returns `~/.config/ecomonitor[-dev]/` based on ECOMONITOR_ENV.
///
/// Set ECOMONITOR_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ECOMONITOR_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ecomonitor-dev")
    } else {
        base_dir.join("ecomonitor")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the store selected by `config.storage.backend`.
///
/// # Errors
/// Returns an error if the data directory or the SQLite database cannot be opened.
pub fn open_store(config: &Config) -> crate::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::open()?),
        StorageBackend::Keyring => Arc::new(KeyringStore::new(&config.storage.keyring_service)),
    };
    Ok(store)
}

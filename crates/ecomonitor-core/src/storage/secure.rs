//! OS keyring store.
//!
//! Thin wrapper around the platform credential store (Keychain, Windows
//! Credential Manager, Secret Service). Values are encrypted at rest by the
//! OS; each key becomes one credential entry under the configured service.
//! Platform calls (D-Bus on Linux) can stall, so they run on tokio's blocking
//! pool.

use async_trait::async_trait;

use super::KeyValueStore;
use crate::error::StoreError;

/// Default keyring service name.
pub const DEFAULT_SERVICE: &str = "ecomonitor";

/// Key-value store backed by the OS keyring.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    /// Run `f` against the entry for `key` on the blocking pool.
    async fn with_entry<T, F>(&self, key: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&::keyring::Entry, &str) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = ::keyring::Entry::new(&service, &key).map_err(|e| keyring_error(&key, e))?;
            f(&entry, &key)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("keyring task failed: {e}")))?
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

fn keyring_error(key: &str, err: ::keyring::Error) -> StoreError {
    match err {
        ::keyring::Error::PlatformFailure(e) | ::keyring::Error::NoStorageAccess(e) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Keyring {
            key: key.to_string(),
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_entry(key, |entry, key| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(::keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(key, e)),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let value = value.to_string();
        self.with_entry(key, move |entry, key| {
            entry
                .set_password(&value)
                .map_err(|e| keyring_error(key, e))
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_entry(key, |entry, key| match entry.delete_credential() {
            Ok(()) | Err(::keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(key, e)),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_service_name() {
        let store = KeyringStore::default();
        assert_eq!(store.service, "ecomonitor");
    }

    #[test]
    fn no_entry_is_not_mapped_to_unavailable() {
        let err = keyring_error("eco_streak", ::keyring::Error::NoEntry);
        assert!(matches!(err, StoreError::Keyring { ref key, .. } if key == "eco_streak"));
    }

    #[tokio::test]
    async fn missing_entry_reads_none_off_the_runtime() {
        ::keyring::set_default_credential_builder(::keyring::mock::default_credential_builder());
        let store = KeyringStore::new("ecomonitor-test");
        assert_eq!(store.get("eco_biometric_enabled").await.unwrap(), None);
        store.delete("eco_biometric_enabled").await.unwrap();
    }
}

//! Biometric app lock.
//!
//! - [`HardwareAuth`]: the platform's biometric prompt, behind a trait
//! - lock preference: a persisted on/off flag the settings screen toggles
//! - [`UnlockGate`]: the per-mount state machine deciding whether protected
//!   content may render

mod gate;

pub use gate::{GateView, MountId, UnlockGate, UnlockState};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AuthError, StoreError};
use crate::storage::{BiometricConfig, KeyValueStore};

pub const BIOMETRIC_ENABLED_KEY: &str = "eco_biometric_enabled";

/// Result of one hardware challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeOutcome {
    Success,
    /// Biometric did not match, or the device passcode fallback failed.
    Failed,
    /// User or OS dismissed the prompt.
    Cancelled,
}

impl ChallengeOutcome {
    pub fn is_success(self) -> bool {
        self == ChallengeOutcome::Success
    }
}

/// Authentication methods a device can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricKind {
    FacialRecognition,
    Fingerprint,
    Iris,
}

/// Wording of the platform prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengePrompt {
    pub message: String,
    pub fallback_label: String,
    pub cancel_label: String,
    /// Allow the device passcode when biometrics fail.
    pub allow_device_fallback: bool,
}

impl Default for ChallengePrompt {
    fn default() -> Self {
        Self::from(&BiometricConfig::default())
    }
}

impl From<&BiometricConfig> for ChallengePrompt {
    fn from(config: &BiometricConfig) -> Self {
        Self {
            message: config.prompt_message.clone(),
            fallback_label: config.fallback_label.clone(),
            cancel_label: config.cancel_label.clone(),
            allow_device_fallback: true,
        }
    }
}

/// Platform biometric authenticator.
///
/// `challenge` may suspend for as long as the prompt is on screen. The
/// unlock gate guarantees it never has two challenges in flight for the
/// same mount.
#[async_trait]
pub trait HardwareAuth: Send + Sync {
    /// Hardware present and at least one biometric enrolled.
    async fn is_available(&self) -> bool;

    /// Methods the hardware supports.
    async fn supported_kinds(&self) -> Vec<BiometricKind> {
        Vec::new()
    }

    /// Show the prompt and wait for the user.
    async fn challenge(&self, prompt: &ChallengePrompt) -> Result<ChallengeOutcome, AuthError>;
}

/// Settings label for the strongest supported method.
pub fn biometric_label(kinds: &[BiometricKind]) -> &'static str {
    if kinds.contains(&BiometricKind::FacialRecognition) {
        "Face ID"
    } else if kinds.contains(&BiometricKind::Fingerprint) {
        "Touch ID"
    } else {
        "Biometric"
    }
}

/// Label for the settings toggle, `None` when the device cannot use it.
pub async fn biometric_kind(auth: &dyn HardwareAuth) -> Option<&'static str> {
    if !auth.is_available().await {
        return None;
    }
    Some(biometric_label(&auth.supported_kinds().await))
}

/// Read the lock preference. Missing or unreadable means disabled.
pub async fn is_biometric_lock_enabled(store: &dyn KeyValueStore) -> bool {
    match store.get(BIOMETRIC_ENABLED_KEY).await {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            warn!(error = %e, "Biometric preference read failed, treating as disabled");
            false
        }
    }
}

/// Persist the lock preference.
///
/// # Errors
/// Unlike reads, a failed write is returned so the settings toggle can
/// revert.
pub async fn set_biometric_lock(store: &dyn KeyValueStore, enabled: bool) -> Result<(), StoreError> {
    let value = if enabled { "true" } else { "false" };
    store.set(BIOMETRIC_ENABLED_KEY, value).await
}

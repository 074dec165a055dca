//! Session identity and guest usage counter.
//!
//! The session context is an explicit object handed to whatever needs to
//! know "guest or account" and "how many free uses are spent". It owns the
//! one-way guest -> account transition; the quota gate only reads the
//! counter and asks for increments.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::quota;
use crate::storage::KeyValueStore;

pub const IDENTITY_KEY: &str = "eco_identity";
pub const GUEST_USAGE_KEY: &str = "eco_guest_usage_count";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identity {
    /// No account yet; gated features draw from the guest quota.
    Guest,
    /// Account created. Never reverts to `Guest`.
    Account,
}

impl Identity {
    fn as_str(self) -> &'static str {
        match self {
            Identity::Guest => "guest",
            Identity::Account => "account",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "guest" => Some(Identity::Guest),
            "account" => Some(Identity::Account),
            _ => None,
        }
    }
}

/// In-app purchase entitlement, supplied by the purchase integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Subscribed,
}

impl SubscriptionStatus {
    pub fn is_subscribed(self) -> bool {
        self == SubscriptionStatus::Subscribed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub identity: Identity,
    pub guest_usage_count: u32,
}

/// Explicit auth context shared by the quota gate and screens.
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    state: Mutex<SessionSnapshot>,
}

impl SessionContext {
    /// Load identity and guest counter from the store.
    ///
    /// Unreadable values fall back to a fresh guest with zero uses.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let identity = match store.get(IDENTITY_KEY).await {
            Ok(Some(raw)) => Identity::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Unknown identity value, treating as guest");
                Identity::Guest
            }),
            Ok(None) => Identity::Guest,
            Err(e) => {
                warn!(error = %e, "Identity read failed, treating as guest");
                Identity::Guest
            }
        };

        let guest_usage_count = match store.get(GUEST_USAGE_KEY).await {
            Ok(raw) => raw
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0),
            Err(e) => {
                warn!(error = %e, "Guest usage read failed, treating as zero");
                0
            }
        };

        debug!(identity = identity.as_str(), guest_usage_count, "Session loaded");
        Self::with_snapshot(
            store,
            SessionSnapshot {
                identity,
                guest_usage_count,
            },
        )
    }

    /// Context with explicit in-memory state; nothing is read from the store.
    pub fn with_snapshot(store: Arc<dyn KeyValueStore>, snapshot: SessionSnapshot) -> Self {
        Self {
            store,
            state: Mutex::new(snapshot),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionSnapshot> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        *self.state()
    }

    pub fn identity(&self) -> Identity {
        self.state().identity
    }

    pub fn is_guest(&self) -> bool {
        self.identity() == Identity::Guest
    }

    pub fn guest_usage_count(&self) -> u32 {
        self.state().guest_usage_count
    }

    /// Whether a gated feature may run right now, ignoring subscriptions.
    ///
    /// Accounts always pass; guests pass while under the quota.
    pub fn can_use_feature(&self) -> bool {
        let state = self.state();
        match state.identity {
            Identity::Account => true,
            Identity::Guest => quota::can_use_feature(state.guest_usage_count),
        }
    }

    /// Free guest uses left; `None` for accounts.
    pub fn remaining_guest_uses(&self) -> Option<u32> {
        let state = self.state();
        match state.identity {
            Identity::Account => None,
            Identity::Guest => Some(quota::remaining_uses(state.guest_usage_count)),
        }
    }

    /// Count one spent guest use and persist it.
    ///
    /// Call only after the gated action succeeded. A failed write is logged
    /// and ignored: the in-memory count still advances. No-op for accounts.
    pub async fn increment_guest_usage(&self) -> u32 {
        let count = {
            let mut state = self.state();
            if state.identity == Identity::Account {
                return state.guest_usage_count;
            }
            state.guest_usage_count = state.guest_usage_count.saturating_add(1);
            state.guest_usage_count
        };

        if let Err(e) = self.store.set(GUEST_USAGE_KEY, &count.to_string()).await {
            warn!(error = %e, count, "Guest usage write failed; in-memory count kept");
        }
        count
    }

    /// Zero the guest counter.
    ///
    /// # Errors
    /// Returns the store error if the reset could not be persisted; the
    /// in-memory counter is reset regardless.
    pub async fn reset_guest_usage(&self) -> Result<(), StoreError> {
        self.state().guest_usage_count = 0;
        self.store.set(GUEST_USAGE_KEY, "0").await
    }

    /// One-way guest -> account transition.
    ///
    /// # Errors
    /// Returns the store error if the new identity could not be persisted,
    /// in which case the session stays a guest.
    pub async fn create_account(&self) -> Result<(), StoreError> {
        if self.identity() == Identity::Account {
            return Ok(());
        }
        self.store
            .set(IDENTITY_KEY, Identity::Account.as_str())
            .await?;
        self.state().identity = Identity::Account;
        info!("Guest session upgraded to account");
        Ok(())
    }
}

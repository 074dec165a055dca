//! Unlock gate state machine.
//!
//! ```text
//! mount -> Idle -> Checking -> Unlocked
//!                     |
//!                     v
//!                 AuthError --retry--> Checking
//! ```
//!
//! Every mount of the protected area gets a fresh [`MountId`] and starts
//! from `Idle`; nothing survives a remount or process restart. `Unlocked`
//! is terminal for the mount. A result that arrives for a mount that is no
//! longer current is dropped, so an abandoned prompt can never unlock (or
//! lock) its successor.
//!
//! At most one hardware challenge is outstanding per gate, across mounts. A
//! remount while the previous mount's prompt is still up waits for that
//! prompt to close before showing its own, and skips the prompt entirely if
//! it was itself abandoned in the meantime.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use super::{is_biometric_lock_enabled, ChallengeOutcome, ChallengePrompt, HardwareAuth};
use crate::storage::KeyValueStore;

const MSG_FAILED: &str = "Authentication failed. Tap to try again.";
const MSG_CANCELLED: &str = "Authentication was cancelled. Tap to try again.";
const MSG_INTERRUPTED: &str = "Authentication was interrupted. Tap to try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnlockState {
    Idle,
    Checking,
    Unlocked,
    AuthError { message: String },
}

impl UnlockState {
    fn auth_error(message: impl Into<String>) -> Self {
        UnlockState::AuthError {
            message: message.into(),
        }
    }
}

/// What the protected root should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum GateView {
    /// Spinner; the check is pending.
    Loading,
    /// Lock screen with a retry action.
    Locked { message: String },
    /// Navigation, tabs and screens may mount.
    Protected,
}

/// Identity of one mount of the protected area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountId(u64);

#[derive(Debug)]
struct GateInner {
    mount: Option<MountId>,
    next_mount: u64,
    state: UnlockState,
}

/// Render guard for the protected area.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct UnlockGate {
    inner: Arc<Mutex<GateInner>>,
    store: Arc<dyn KeyValueStore>,
    auth: Arc<dyn HardwareAuth>,
    prompt: ChallengePrompt,
    /// Held for the duration of every hardware challenge.
    challenge_slot: Arc<AsyncMutex<()>>,
}

/// Settles an in-flight check as interrupted if its future is dropped
/// before the challenge returns.
struct InFlight<'a> {
    gate: &'a UnlockGate,
    mount: MountId,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(mount = self.mount.0, "Unlock check dropped mid-challenge");
            self.gate
                .settle(self.mount, UnlockState::auth_error(MSG_INTERRUPTED));
        }
    }
}

impl UnlockGate {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn HardwareAuth>,
        prompt: ChallengePrompt,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GateInner {
                mount: None,
                next_mount: 0,
                state: UnlockState::Idle,
            })),
            store,
            auth,
            prompt,
            challenge_slot: Arc::new(AsyncMutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> UnlockState {
        self.lock().state.clone()
    }

    /// The render guard: only `true` may the protected subtree mount.
    pub fn is_unlocked(&self) -> bool {
        self.lock().state == UnlockState::Unlocked
    }

    pub fn view(&self) -> GateView {
        match self.state() {
            UnlockState::Idle | UnlockState::Checking => GateView::Loading,
            UnlockState::AuthError { message } => GateView::Locked { message },
            UnlockState::Unlocked => GateView::Protected,
        }
    }

    pub fn current_mount(&self) -> Option<MountId> {
        self.lock().mount
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Start a new mount and run its check.
    ///
    /// Any previous mount is abandoned; its pending result will be
    /// discarded. Returns once this mount's check has settled.
    pub async fn mount(&self) -> MountId {
        let mount = {
            let mut inner = self.lock();
            inner.next_mount += 1;
            let mount = MountId(inner.next_mount);
            if let Some(previous) = inner.mount.replace(mount) {
                debug!(previous = previous.0, mount = mount.0, "Abandoning previous mount");
            }
            inner.state = UnlockState::Idle;
            mount
        };
        self.check(mount).await;
        mount
    }

    /// User-initiated retry from the lock screen.
    ///
    /// Only `AuthError` moves back to `Checking`. While a check is already
    /// in flight, or once unlocked, this is a no-op returning the current
    /// state.
    pub async fn retry(&self, mount: MountId) -> UnlockState {
        self.check(mount).await
    }

    /// Tear down `mount`. The gate returns to `Idle` with no current mount.
    pub fn unmount(&self, mount: MountId) {
        let mut inner = self.lock();
        if inner.mount == Some(mount) {
            inner.mount = None;
            inner.state = UnlockState::Idle;
            debug!(mount = mount.0, "Protected area unmounted");
        }
    }

    async fn check(&self, mount: MountId) -> UnlockState {
        {
            let mut inner = self.lock();
            if inner.mount != Some(mount) {
                debug!(mount = mount.0, "Check for inactive mount ignored");
                return inner.state.clone();
            }
            match inner.state {
                UnlockState::Idle | UnlockState::AuthError { .. } => {
                    inner.state = UnlockState::Checking;
                }
                UnlockState::Checking | UnlockState::Unlocked => return inner.state.clone(),
            }
        }
        debug!(mount = mount.0, "Unlock check started");

        let mut guard = InFlight {
            gate: self,
            mount,
            settled: false,
        };
        let next = self.evaluate(mount).await;
        guard.settled = true;
        self.settle(mount, next)
    }

    /// `mount` is current and still `Checking`.
    fn is_pending(&self, mount: MountId) -> bool {
        let inner = self.lock();
        inner.mount == Some(mount) && inner.state == UnlockState::Checking
    }

    async fn evaluate(&self, mount: MountId) -> UnlockState {
        if !is_biometric_lock_enabled(self.store.as_ref()).await {
            return UnlockState::Unlocked;
        }
        if !self.auth.is_available().await {
            info!("Biometric lock enabled but hardware unavailable; unlocking");
            return UnlockState::Unlocked;
        }

        let _slot = self.challenge_slot.lock().await;
        if !self.is_pending(mount) {
            // Abandoned while an earlier prompt was up; `settle` drops this.
            debug!(mount = mount.0, "Skipping challenge for abandoned mount");
            return UnlockState::Idle;
        }

        match self.auth.challenge(&self.prompt).await {
            Ok(ChallengeOutcome::Success) => UnlockState::Unlocked,
            Ok(ChallengeOutcome::Failed) => UnlockState::auth_error(MSG_FAILED),
            Ok(ChallengeOutcome::Cancelled) => UnlockState::auth_error(MSG_CANCELLED),
            Err(e) => {
                warn!(error = %e, "Biometric challenge errored");
                UnlockState::auth_error(format!("{e}. Tap to try again."))
            }
        }
    }

    /// Apply `next` if `mount` is still current and checking.
    fn settle(&self, mount: MountId, next: UnlockState) -> UnlockState {
        let mut inner = self.lock();
        if inner.mount != Some(mount) || inner.state != UnlockState::Checking {
            debug!(mount = mount.0, "Discarding result for stale mount");
            return inner.state.clone();
        }
        debug!(mount = mount.0, state = ?next, "Unlock check settled");
        inner.state = next;
        inner.state.clone()
    }
}

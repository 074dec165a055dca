//! Guest quota gate.
//!
//! Guests get [`GUEST_USAGE_LIMIT`] runs of a gated feature before they are
//! asked to create an account. Accounts skip the quota and are instead
//! checked against their subscription. The order of operations for a gated
//! action is always check -> act -> increment, so a failed action never
//! spends a use; [`run_gated`] enforces that order.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::session::{Identity, SessionContext, SubscriptionStatus};

/// Free gated-feature uses for a guest.
pub const GUEST_USAGE_LIMIT: u32 = 3;

pub fn can_use_feature(current_count: u32) -> bool {
    current_count < GUEST_USAGE_LIMIT
}

pub fn remaining_uses(current_count: u32) -> u32 {
    GUEST_USAGE_LIMIT - current_count.min(GUEST_USAGE_LIMIT)
}

/// Outcome of asking to run a gated feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureAccess {
    Allowed,
    /// Guest quota exhausted; prompt for account creation.
    SignUpRequired,
    /// Account without an active subscription; show the paywall.
    PaywallRequired,
}

impl FeatureAccess {
    pub fn is_allowed(self) -> bool {
        self == FeatureAccess::Allowed
    }
}

pub fn feature_access(session: &SessionContext, subscription: SubscriptionStatus) -> FeatureAccess {
    let snapshot = session.snapshot();
    match snapshot.identity {
        Identity::Guest if can_use_feature(snapshot.guest_usage_count) => FeatureAccess::Allowed,
        Identity::Guest => FeatureAccess::SignUpRequired,
        Identity::Account if subscription.is_subscribed() => FeatureAccess::Allowed,
        Identity::Account => FeatureAccess::PaywallRequired,
    }
}

#[derive(Error, Debug)]
pub enum GatedError<E> {
    /// The action was not run.
    #[error("feature access denied: {0:?}")]
    Denied(FeatureAccess),

    /// The action ran and failed; no quota was spent.
    #[error("gated action failed: {0}")]
    Action(E),
}

/// Run `action` behind the quota gate.
///
/// A denied decision never runs the action. A guest's counter is
/// incremented only when the action returns `Ok`.
pub async fn run_gated<T, E, F, Fut>(
    session: &SessionContext,
    subscription: SubscriptionStatus,
    action: F,
) -> Result<T, GatedError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let access = feature_access(session, subscription);
    if !access.is_allowed() {
        debug!(?access, "Gated action denied");
        return Err(GatedError::Denied(access));
    }

    let value = action().await.map_err(GatedError::Action)?;
    if session.is_guest() {
        let used = session.increment_guest_usage().await;
        debug!(used, limit = GUEST_USAGE_LIMIT, "Guest use recorded");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionSnapshot, GUEST_USAGE_KEY};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn guest(count: u32) -> (SessionContext, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let session = SessionContext::with_snapshot(
            store.clone(),
            SessionSnapshot {
                identity: Identity::Guest,
                guest_usage_count: count,
            },
        );
        (session, store)
    }

    #[test]
    fn quota_boundary() {
        assert!(can_use_feature(0));
        assert!(can_use_feature(2));
        assert!(!can_use_feature(3));
        assert!(!can_use_feature(40));
        assert_eq!(GUEST_USAGE_LIMIT, 3);
    }

    #[test]
    fn remaining_never_underflows() {
        assert_eq!(remaining_uses(0), 3);
        assert_eq!(remaining_uses(2), 1);
        assert_eq!(remaining_uses(3), 0);
        assert_eq!(remaining_uses(u32::MAX), 0);
    }

    #[test]
    fn access_matrix() {
        let (under, _) = guest(2);
        let (over, _) = guest(3);
        assert_eq!(feature_access(&under, SubscriptionStatus::Free), FeatureAccess::Allowed);
        assert_eq!(
            feature_access(&over, SubscriptionStatus::Subscribed),
            FeatureAccess::SignUpRequired
        );

        let account = SessionContext::with_snapshot(
            Arc::new(MemoryStore::new()),
            SessionSnapshot {
                identity: Identity::Account,
                guest_usage_count: 3,
            },
        );
        assert_eq!(
            feature_access(&account, SubscriptionStatus::Free),
            FeatureAccess::PaywallRequired
        );
        assert_eq!(
            feature_access(&account, SubscriptionStatus::Subscribed),
            FeatureAccess::Allowed
        );
    }

    #[tokio::test]
    async fn successful_action_spends_one_use() {
        let (session, store) = guest(0);
        let out: Result<&str, GatedError<String>> =
            run_gated(&session, SubscriptionStatus::Free, || async { Ok("analysis queued") }).await;
        assert_eq!(out.unwrap(), "analysis queued");
        assert_eq!(session.guest_usage_count(), 1);
        assert_eq!(store.peek(GUEST_USAGE_KEY).as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn failed_action_spends_nothing() {
        let (session, _) = guest(1);
        let out: Result<(), GatedError<String>> = run_gated(&session, SubscriptionStatus::Free, || async {
            Err("analysis service not configured".to_string())
        })
        .await;
        assert!(matches!(out, Err(GatedError::Action(_))));
        assert_eq!(session.guest_usage_count(), 1);
    }

    #[tokio::test]
    async fn denied_action_never_runs() {
        let (session, _) = guest(3);
        let mut ran = false;
        let out: Result<(), GatedError<String>> =
            run_gated(&session, SubscriptionStatus::Free, || {
                ran = true;
                async { Ok(()) }
            })
            .await;
        assert!(matches!(out, Err(GatedError::Denied(FeatureAccess::SignUpRequired))));
        assert!(!ran);
        assert_eq!(session.guest_usage_count(), 3);
    }

    #[tokio::test]
    async fn store_failure_does_not_block_action() {
        let (session, store) = guest(0);
        store.set_fail_writes(true);
        let out: Result<u8, GatedError<String>> =
            run_gated(&session, SubscriptionStatus::Free, || async { Ok(7) }).await;
        assert_eq!(out.unwrap(), 7);
        assert_eq!(session.guest_usage_count(), 1);
    }
}

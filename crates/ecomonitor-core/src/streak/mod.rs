//! Daily engagement streak.
//!
//! The engine keeps one [`StreakRecord`] in the key-value store and moves it
//! forward at most once per local calendar day:
//!
//! ```text
//! last_check_date == today      -> unchanged
//! last_check_date == yesterday  -> current_streak + 1
//! anything else (gap/none/future) -> 1
//! ```
//!
//! [`StreakEngine::record_daily_check`] is meant to be called on every
//! foreground/focus event. Storage failures never surface: a failed read
//! looks like an empty record, a failed write is logged and the computed
//! record is still returned.

mod tier;

pub use tier::{
    day_label, milestone_progress, next_milestone, streak_icon, streak_message, StreakBadge,
    StreakTier,
};

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{parse_date, yesterday_of, Clock, SystemClock};
use crate::error::StoreError;
use crate::storage::KeyValueStore;

/// Structured record key.
pub const STREAK_KEY: &str = "eco_streak";
/// Count entry of the older two-key layout.
pub const LEGACY_COUNT_KEY: &str = "eco_streak_count";
/// Date entry of the older two-key layout.
pub const LEGACY_DATE_KEY: &str = "eco_streak_last_date";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub last_check_date: Option<NaiveDate>,
}

impl StreakRecord {
    /// The record after checking in on `today`.
    pub fn advance(&self, today: NaiveDate) -> StreakRecord {
        let current_streak = match self.last_check_date {
            Some(last) if last == today => return self.clone(),
            Some(last) if last == yesterday_of(today) => self.current_streak.saturating_add(1),
            _ => 1,
        };
        StreakRecord {
            current_streak,
            last_check_date: Some(today),
        }
    }

    pub fn tier(&self) -> StreakTier {
        StreakTier::for_streak(self.current_streak)
    }

    pub fn badge(&self) -> StreakBadge {
        StreakBadge::for_streak(self.current_streak)
    }
}

/// Reads and advances the persisted streak record.
pub struct StreakEngine {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl StreakEngine {
    /// Engine on the local wall clock.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current record without mutating anything.
    pub async fn get_streak(&self) -> StreakRecord {
        match self.store.get(STREAK_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<StreakRecord>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Unreadable streak record, treating as empty");
                StreakRecord::default()
            }),
            Ok(None) => self.read_legacy().await,
            Err(e) => {
                warn!(error = %e, "Streak read failed, treating as empty");
                StreakRecord::default()
            }
        }
    }

    /// Record today's check-in and return the resulting record.
    ///
    /// Idempotent within a calendar day.
    pub async fn record_daily_check(&self) -> StreakRecord {
        let today = self.clock.today();
        let current = self.get_streak().await;
        let next = current.advance(today);
        if next == current {
            debug!(streak = next.current_streak, "Streak already recorded today");
            return next;
        }

        match self.persist(&next).await {
            Ok(()) => debug!(
                from = current.current_streak,
                to = next.current_streak,
                "Streak updated"
            ),
            Err(e) => warn!(
                error = %e,
                streak = next.current_streak,
                "Streak write failed; returning computed value"
            ),
        }
        next
    }

    async fn persist(&self, record: &StreakRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| StoreError::QueryFailed(format!("encode streak record: {e}")))?;
        self.store.set(STREAK_KEY, &raw).await?;

        // The structured record now wins on every read; legacy entries are
        // dead weight and may be left behind if this cleanup fails.
        for key in [LEGACY_COUNT_KEY, LEGACY_DATE_KEY] {
            if let Err(e) = self.store.delete(key).await {
                debug!(key, error = %e, "Legacy streak entry not removed");
            }
        }
        Ok(())
    }

    async fn read_legacy(&self) -> StreakRecord {
        let date = self.store.get(LEGACY_DATE_KEY).await;
        let count = self.store.get(LEGACY_COUNT_KEY).await;
        match (date, count) {
            (Ok(date), Ok(count)) => StreakRecord {
                current_streak: count
                    .and_then(|c| c.trim().parse::<u32>().ok())
                    .unwrap_or(0),
                last_check_date: date.as_deref().and_then(parse_date),
            },
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Legacy streak read failed, treating as empty");
                StreakRecord::default()
            }
        }
    }
}

//! Integration tests for the daily streak engine.
//!
//! These walk the engine through simulated calendars and check the stored
//! record against a straightforward model of the day-over-day rule.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use ecomonitor_core::clock::FixedClock;
use ecomonitor_core::storage::MemoryStore;
use ecomonitor_core::storage::KeyValueStore;
use ecomonitor_core::streak::{
    day_label, milestone_progress, next_milestone, StreakBadge, StreakEngine, StreakRecord,
    StreakTier, STREAK_KEY,
};
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_month_of_daily_checks_reaches_cosmic() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(start()));
    let engine = StreakEngine::with_clock(store, clock.clone());

    let mut last = engine.record_daily_check().await;
    for _ in 1..30 {
        clock.advance_days(1);
        // Several foreground events per day
        engine.record_daily_check().await;
        last = engine.record_daily_check().await;
    }

    assert_eq!(last.current_streak, 30);
    assert_eq!(last.badge(), StreakBadge::Cosmic);
    assert_eq!(last.tier(), StreakTier::Flame);
    assert_eq!(next_milestone(last.current_streak), Some(50));
    assert_eq!(day_label(last.current_streak), "30 days");
}

#[tokio::test]
async fn test_missed_day_resets_to_one() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(start()));
    let engine = StreakEngine::with_clock(store, clock.clone());

    for _ in 0..5 {
        engine.record_daily_check().await;
        clock.advance_days(1);
    }
    assert_eq!(engine.get_streak().await.current_streak, 5);

    // Skip one whole day
    clock.advance_days(1);
    let record = engine.record_daily_check().await;
    assert_eq!(record.current_streak, 1);
    assert_eq!(day_label(record.current_streak), "1 day");
}

#[tokio::test]
async fn test_clock_moving_backwards_resets() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(start()));
    let engine = StreakEngine::with_clock(store, clock.clone());

    engine.record_daily_check().await;
    clock.advance_days(1);
    engine.record_daily_check().await;

    clock.set(start());
    let record = engine.record_daily_check().await;
    assert_eq!(record.current_streak, 1);
    assert_eq!(record.last_check_date, Some(start()));
}

#[tokio::test]
async fn test_engines_sharing_a_store_agree() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(start()));
    let home = StreakEngine::with_clock(store.clone(), clock.clone());
    let card = StreakEngine::with_clock(store, clock.clone());

    home.record_daily_check().await;
    clock.advance_days(1);
    card.record_daily_check().await;

    assert_eq!(home.get_streak().await, card.get_streak().await);
    assert_eq!(home.get_streak().await.current_streak, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_simultaneous_same_day_checks_converge() {
    let yesterday = start();
    let today = yesterday.checked_add_days(Days::new(1)).unwrap();
    let seed = StreakRecord {
        current_streak: 4,
        last_check_date: Some(yesterday),
    };
    let seed = serde_json::to_string(&seed).unwrap();
    let store = Arc::new(MemoryStore::new());

    let clock = Arc::new(FixedClock::new(today));
    let foreground = Arc::new(StreakEngine::with_clock(store.clone(), clock.clone()));
    let focus = Arc::new(StreakEngine::with_clock(store.clone(), clock.clone()));

    for _ in 0..20 {
        // Both engines start from yesterday's record on every round.
        store.set(STREAK_KEY, &seed).await.unwrap();
        let (a, b) = tokio::join!(
            tokio::spawn({
                let engine = foreground.clone();
                async move { engine.record_daily_check().await }
            }),
            tokio::spawn({
                let engine = focus.clone();
                async move { engine.record_daily_check().await }
            }),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.current_streak, 5);
        assert_eq!(b.current_streak, 5);
        assert_eq!(a.last_check_date, Some(today));
        assert_eq!(b, a);
    }

    let after = StreakEngine::with_clock(store, clock).record_daily_check().await;
    assert_eq!(after.current_streak, 5);
}

#[test]
fn test_milestone_progress_is_monotone_within_a_rung() {
    assert_eq!(milestone_progress(0), 0.0);
    assert!(milestone_progress(4) < milestone_progress(5));
    assert_eq!(milestone_progress(50), 100.0);
    assert_eq!(milestone_progress(400), 100.0);
}

proptest! {
    /// For any sequence of day gaps, the stored streak equals the length of
    /// the trailing run of one-day steps, and never exceeds the number of
    /// distinct check-in days.
    #[test]
    fn prop_streak_matches_model(gaps in prop::collection::vec(0u64..4, 1..40)) {
        runtime().block_on(async {
            let store = Arc::new(MemoryStore::new());
            let clock = Arc::new(FixedClock::new(start()));
            let engine = StreakEngine::with_clock(store, clock.clone());

            let mut expected = 1u32;
            let mut distinct_days = 1u32;
            engine.record_daily_check().await;

            for gap in &gaps {
                clock.advance_days(*gap);
                match gap {
                    0 => {}
                    1 => {
                        expected += 1;
                        distinct_days += 1;
                    }
                    _ => {
                        expected = 1;
                        distinct_days += 1;
                    }
                }
                let record = engine.record_daily_check().await;
                prop_assert_eq!(record.current_streak, expected);
                prop_assert!(record.current_streak <= distinct_days);
            }

            let total: u64 = gaps.iter().sum();
            let today = start().checked_add_days(Days::new(total)).unwrap();
            prop_assert_eq!(engine.get_streak().await.last_check_date, Some(today));
            Ok::<(), proptest::test_runner::TestCaseError>(())
        })?;
    }
}

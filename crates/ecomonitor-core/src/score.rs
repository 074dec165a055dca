//! Engagement score.
//!
//! A cosmetic 0-100 value for the home screen progress ring:
//!
//! ```text
//! score = min(100, locations*10 + alerts*5 + critical*15 + streak*2)
//! ```
//!
//! Pure and total. Negative inputs mean the caller's counts are broken;
//! the score fails closed to 0 rather than propagating anything.

use serde::{Deserialize, Serialize};

pub const MAX_SCORE: u8 = 100;

const LOCATION_WEIGHT: i64 = 10;
const ALERT_WEIGHT: i64 = 5;
const CRITICAL_WEIGHT: i64 = 15;
const STREAK_WEIGHT: i64 = 2;

/// Alerts strictly above this confidence are critical.
pub const CRITICAL_CONFIDENCE: f64 = 0.8;
/// Alerts strictly above this confidence (and not critical) are elevated.
pub const ELEVATED_CONFIDENCE: f64 = 0.5;

/// Compute the engagement score.
pub fn score(
    location_count: i64,
    alert_count: i64,
    critical_alert_count: i64,
    current_streak: i64,
) -> u8 {
    let inputs = [
        (location_count, LOCATION_WEIGHT),
        (alert_count, ALERT_WEIGHT),
        (critical_alert_count, CRITICAL_WEIGHT),
        (current_streak, STREAK_WEIGHT),
    ];
    if inputs.iter().any(|(count, _)| *count < 0) {
        return 0;
    }

    let raw = inputs
        .iter()
        .fold(0i64, |acc, (count, weight)| acc.saturating_add(count.saturating_mul(*weight)));
    // `raw` is non-negative here, and capped below 256 by the min.
    u8::try_from(raw.min(i64::from(MAX_SCORE))).unwrap_or(0)
}

/// Inputs gathered from the streak engine and the alert/location feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementInputs {
    pub location_count: u32,
    pub alert_count: u32,
    pub critical_alert_count: u32,
    pub current_streak: u32,
}

impl EngagementInputs {
    /// Build inputs from alert confidences (0.0-1.0) of the recent feed.
    pub fn from_alerts(location_count: u32, confidences: &[f64], current_streak: u32) -> Self {
        Self {
            location_count,
            alert_count: u32::try_from(confidences.len()).unwrap_or(u32::MAX),
            critical_alert_count: count_critical(confidences),
            current_streak,
        }
    }

    pub fn score(&self) -> u8 {
        score(
            i64::from(self.location_count),
            i64::from(self.alert_count),
            i64::from(self.critical_alert_count),
            i64::from(self.current_streak),
        )
    }
}

/// Number of confidences above [`CRITICAL_CONFIDENCE`]. NaN never counts.
pub fn count_critical(confidences: &[f64]) -> u32 {
    let n = confidences
        .iter()
        .filter(|c| ConfidenceLevel::of(**c) == ConfidenceLevel::Critical)
        .count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn of(score: u8) -> Self {
        if score > 75 {
            ScoreBand::High
        } else if score > 40 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "Highly Engaged",
            ScoreBand::Medium => "Engaged",
            ScoreBand::Low => "Getting Started",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScoreBand::High => "#10b981",
            ScoreBand::Medium => "#f97316",
            ScoreBand::Low => "#6b7280",
        }
    }
}

/// Severity bucket of a single alert's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Normal,
    Elevated,
    Critical,
}

impl ConfidenceLevel {
    pub fn of(confidence: f64) -> Self {
        if confidence > CRITICAL_CONFIDENCE {
            ConfidenceLevel::Critical
        } else if confidence > ELEVATED_CONFIDENCE {
            ConfidenceLevel::Elevated
        } else {
            ConfidenceLevel::Normal
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ConfidenceLevel::Critical => "#ef4444",
            ConfidenceLevel::Elevated => "#f97316",
            ConfidenceLevel::Normal => "#10b981",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_inputs_score_zero() {
        assert_eq!(score(0, 0, 0, 0), 0);
    }

    #[test]
    fn large_inputs_clamp() {
        // 100 + 50 + 150 + 20 = 320
        assert_eq!(score(10, 10, 10, 10), 100);
        assert_eq!(score(i64::MAX, i64::MAX, i64::MAX, i64::MAX), 100);
    }

    #[test]
    fn weights() {
        assert_eq!(score(1, 0, 0, 0), 10);
        assert_eq!(score(0, 1, 0, 0), 5);
        assert_eq!(score(0, 0, 1, 0), 15);
        assert_eq!(score(0, 0, 0, 1), 2);
        assert_eq!(score(2, 3, 1, 4), 20 + 15 + 15 + 8);
    }

    #[test]
    fn negative_input_fails_closed() {
        assert_eq!(score(-1, 10, 10, 10), 0);
        assert_eq!(score(3, 0, 0, -7), 0);
    }

    #[test]
    fn bands() {
        assert_eq!(ScoreBand::of(100), ScoreBand::High);
        assert_eq!(ScoreBand::of(76), ScoreBand::High);
        assert_eq!(ScoreBand::of(75), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(41), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(40), ScoreBand::Low);
        assert_eq!(ScoreBand::of(0).label(), "Getting Started");
    }

    #[test]
    fn confidence_levels() {
        assert_eq!(ConfidenceLevel::of(0.81), ConfidenceLevel::Critical);
        assert_eq!(ConfidenceLevel::of(0.8), ConfidenceLevel::Elevated);
        assert_eq!(ConfidenceLevel::of(0.5), ConfidenceLevel::Normal);
        assert_eq!(ConfidenceLevel::of(f64::NAN), ConfidenceLevel::Normal);
        assert_eq!(ConfidenceLevel::Critical.color(), "#ef4444");
    }

    #[test]
    fn inputs_from_alert_feed() {
        let inputs = EngagementInputs::from_alerts(2, &[0.95, 0.8, 0.3, 0.81, f64::NAN], 5);
        assert_eq!(inputs.alert_count, 5);
        assert_eq!(inputs.critical_alert_count, 2);
        // 20 + 25 + 30 + 10
        assert_eq!(inputs.score(), 85);
    }

    proptest! {
        #[test]
        fn score_is_bounded(
            loc in any::<i64>(),
            alerts in any::<i64>(),
            critical in any::<i64>(),
            streak in any::<i64>(),
        ) {
            let s = score(loc, alerts, critical, streak);
            prop_assert!(s <= MAX_SCORE);
            if loc < 0 || alerts < 0 || critical < 0 || streak < 0 {
                prop_assert_eq!(s, 0);
            }
        }

        #[test]
        fn score_is_monotone_in_each_input(
            loc in 0i64..50,
            alerts in 0i64..50,
            critical in 0i64..50,
            streak in 0i64..50,
        ) {
            let base = score(loc, alerts, critical, streak);
            prop_assert!(score(loc + 1, alerts, critical, streak) >= base);
            prop_assert!(score(loc, alerts + 1, critical, streak) >= base);
            prop_assert!(score(loc, alerts, critical + 1, streak) >= base);
            prop_assert!(score(loc, alerts, critical, streak + 1) >= base);
        }
    }
}

//! Presentation tiers for a streak value.
//!
//! Two independent ladders: [`StreakTier`] picks the icon and encouragement
//! message, [`StreakBadge`] is the rank shown on the streak card together
//! with progress towards the next milestone. Both are total over `u32`.

use serde::{Deserialize, Serialize};

/// Icon/message tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTier {
    /// 0-2 days
    Seedling,
    /// 3-6 days
    Spark,
    /// 7-13 days
    Trophy,
    /// 14-29 days
    Star,
    /// 30+ days
    Flame,
}

impl StreakTier {
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            0..=2 => StreakTier::Seedling,
            3..=6 => StreakTier::Spark,
            7..=13 => StreakTier::Trophy,
            14..=29 => StreakTier::Star,
            _ => StreakTier::Flame,
        }
    }

    /// Icon name understood by the app's icon set.
    pub fn icon(self) -> &'static str {
        match self {
            StreakTier::Seedling => "leaf",
            StreakTier::Spark => "flash",
            StreakTier::Trophy => "trophy",
            StreakTier::Star => "star",
            StreakTier::Flame => "flame",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            StreakTier::Seedling => "Start your streak!",
            StreakTier::Spark => "Getting Started!",
            StreakTier::Trophy => "Rising Protector!",
            StreakTier::Star => "Dedicated Monitor!",
            StreakTier::Flame => "Legendary Eco Guardian!",
        }
    }
}

pub fn streak_icon(streak: u32) -> &'static str {
    StreakTier::for_streak(streak).icon()
}

pub fn streak_message(streak: u32) -> &'static str {
    StreakTier::for_streak(streak).message()
}

/// Counter label, e.g. "1 day" / "12 days".
pub fn day_label(streak: u32) -> String {
    if streak == 1 {
        "1 day".to_string()
    } else {
        format!("{streak} days")
    }
}

/// Streak card rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakBadge {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Cosmic,
    Celestial,
}

/// (lower bound, badge) in ascending order.
const BADGE_LADDER: [(u32, StreakBadge); 7] = [
    (0, StreakBadge::Bronze),
    (3, StreakBadge::Silver),
    (7, StreakBadge::Gold),
    (14, StreakBadge::Platinum),
    (21, StreakBadge::Diamond),
    (30, StreakBadge::Cosmic),
    (50, StreakBadge::Celestial),
];

impl StreakBadge {
    pub fn for_streak(streak: u32) -> Self {
        BADGE_LADDER
            .iter()
            .rev()
            .find(|(floor, _)| streak >= *floor)
            .map(|(_, badge)| *badge)
            .unwrap_or(StreakBadge::Bronze)
    }

    pub fn label(self) -> &'static str {
        match self {
            StreakBadge::Bronze => "BRONZE",
            StreakBadge::Silver => "SILVER",
            StreakBadge::Gold => "GOLD",
            StreakBadge::Platinum => "PLATINUM",
            StreakBadge::Diamond => "DIAMOND",
            StreakBadge::Cosmic => "COSMIC",
            StreakBadge::Celestial => "CELESTIAL",
        }
    }
}

/// Streak length that unlocks the next badge; `None` once Celestial.
pub fn next_milestone(streak: u32) -> Option<u32> {
    BADGE_LADDER
        .iter()
        .map(|(floor, _)| *floor)
        .find(|floor| *floor > streak)
}

/// Percent (0-100) of the way from the current badge to the next one.
pub fn milestone_progress(streak: u32) -> f64 {
    let Some(next) = next_milestone(streak) else {
        return 100.0;
    };
    let floor = BADGE_LADDER
        .iter()
        .map(|(floor, _)| *floor)
        .filter(|floor| *floor <= streak)
        .max()
        .unwrap_or(0);
    f64::from(streak - floor) / f64::from(next - floor) * 100.0
}

use chrono::NaiveDate;
use clap::Subcommand;
use ecomonitor_core::streak::{
    day_label, milestone_progress, next_milestone, StreakEngine, StreakRecord,
};
use ecomonitor_core::Config;
use serde::Serialize;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Record today's check-in and print the streak
    Check,
    /// Print the stored streak without recording a check-in
    Show,
}

/// Everything the streak card renders.
#[derive(Serialize)]
struct StreakView {
    current_streak: u32,
    last_check_date: Option<NaiveDate>,
    label: String,
    icon: &'static str,
    message: &'static str,
    badge: &'static str,
    next_milestone: Option<u32>,
    progress: f64,
}

impl From<&StreakRecord> for StreakView {
    fn from(record: &StreakRecord) -> Self {
        let tier = record.tier();
        Self {
            current_streak: record.current_streak,
            last_check_date: record.last_check_date,
            label: day_label(record.current_streak),
            icon: tier.icon(),
            message: tier.message(),
            badge: record.badge().label(),
            next_milestone: next_milestone(record.current_streak),
            progress: milestone_progress(record.current_streak),
        }
    }
}

pub async fn run(action: StreakAction, config: &Config) -> CommandResult {
    let engine = StreakEngine::new(open_store(config)?);
    let record = match action {
        StreakAction::Check => engine.record_daily_check().await,
        StreakAction::Show => engine.get_streak().await,
    };
    print_json(&StreakView::from(&record))
}

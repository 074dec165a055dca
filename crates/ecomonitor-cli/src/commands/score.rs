use clap::Args;
use ecomonitor_core::score::{score, ScoreBand};
use ecomonitor_core::streak::StreakEngine;
use ecomonitor_core::Config;
use serde::Serialize;

use super::{open_store, print_json, CommandResult};

#[derive(Args)]
pub struct ScoreArgs {
    /// Monitored locations
    #[arg(allow_negative_numbers = true)]
    locations: i64,
    /// Recent alerts
    #[arg(allow_negative_numbers = true)]
    alerts: i64,
    /// Recent alerts above the critical confidence
    #[arg(allow_negative_numbers = true)]
    critical: i64,
    /// Streak to use instead of the stored one
    #[arg(long, allow_negative_numbers = true)]
    streak: Option<i64>,
}

#[derive(Serialize)]
struct ScoreView {
    score: u8,
    band: ScoreBand,
    label: &'static str,
    color: &'static str,
    current_streak: i64,
}

pub async fn run(args: ScoreArgs, config: &Config) -> CommandResult {
    let current_streak = match args.streak {
        Some(streak) => streak,
        None => {
            let engine = StreakEngine::new(open_store(config)?);
            i64::from(engine.get_streak().await.current_streak)
        }
    };

    let value = score(args.locations, args.alerts, args.critical, current_streak);
    let band = ScoreBand::of(value);
    print_json(&ScoreView {
        score: value,
        band,
        label: band.label(),
        color: band.color(),
        current_streak,
    })
}

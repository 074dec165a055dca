pub mod config;
pub mod guest;
pub mod lock;
pub mod score;
pub mod streak;

use std::error::Error;
use std::sync::Arc;

use ecomonitor_core::{Config, KeyValueStore};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Open the backend selected in config.
pub fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>, Box<dyn Error>> {
    Ok(ecomonitor_core::open_store(config)?)
}

pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

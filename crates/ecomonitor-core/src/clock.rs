//! Calendar-day source for the streak engine.
//!
//! Streaks count local calendar days, so the only thing the engine needs
//! from a clock is "what date is it here, now". Tests swap in a
//! [`FixedClock`] and advance it day by day.

use std::sync::Mutex;

use chrono::{Days, Local, NaiveDate};

/// Canonical persisted form of a calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Clock: Send + Sync {
    /// Today's date in the local timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the device's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        if let Ok(mut today) = self.today.lock() {
            *today = date;
        }
    }

    /// Move the clock forward by `days` calendar days.
    pub fn advance_days(&self, days: u64) {
        if let Ok(mut today) = self.today.lock() {
            if let Some(next) = today.checked_add_days(Days::new(days)) {
                *today = next;
            }
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.lock() {
            Ok(today) => *today,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// The day before `date`, saturating at the calendar's lower bound.
pub fn yesterday_of(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a persisted `YYYY-MM-DD` string; anything else is `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

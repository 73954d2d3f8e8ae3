/// Temporal aggregation core
///
/// Turns (reference date, view, timezone) into a UTC query window, merges
/// habit, mood and goal rows into per-day activity, and derives consistency
/// stats and the month grid. Everything here is pure; the datastore is
/// driven from `analytics`.

pub mod aggregate;
pub mod grid;
pub mod stats;
pub mod timezone;
pub mod window;

pub use aggregate::{
    aggregate, count_rows_by_day, goal_day, per_day_counts, ActivityRecord, DailyActivity,
    DailyCounts, GOAL_UNIT, MOOD_UNIT,
};
pub use grid::{build_month_grid, CalendarCell, MonthGrid, GRID_CELLS};
pub use stats::{compute_stats, consistency_pct, ConsistencyStats};
pub use timezone::{resolve_timezone, ResolvedTimezone, TimezonePolicy};
pub use window::{resolve_window, Window};

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DayKey;
use crate::storage::StorageError;

/// Errors surfaced by calendar and analytics requests
///
/// All of these are scoped to the request that produced them.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid view kind '{0}': expected day, week or month")]
    InvalidViewKind(String),

    #[error("Invalid timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Invalid date range: {first} to {last}")]
    InvalidDateRange { first: String, last: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid week start '{0}': expected 0 (Sunday) or 1 (Monday)")]
    InvalidWeekStart(String),

    #[error("Invalid period of {0} days: expected 1 to 365")]
    InvalidPeriod(u32),

    #[error("Datastore unavailable: {0}")]
    DatastoreUnavailable(#[from] StorageError),
}

impl CalendarError {
    pub(crate) fn range(first: DayKey, last: DayKey) -> Self {
        CalendarError::InvalidDateRange {
            first: first.to_string(),
            last: last.to_string(),
        }
    }
}

/// Calendar view granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Day,
    Week,
    Month,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Day => "day",
            ViewKind::Week => "week",
            ViewKind::Month => "month",
        }
    }
}

impl FromStr for ViewKind {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ViewKind::Day),
            "week" => Ok(ViewKind::Week),
            "month" => Ok(ViewKind::Month),
            _ => Err(CalendarError::InvalidViewKind(s.to_string())),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First day of the week for weekly summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

impl FromStr for WeekStart {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "sunday" | "sun" => Ok(WeekStart::Sunday),
            "1" | "monday" | "mon" => Ok(WeekStart::Monday),
            _ => Err(CalendarError::InvalidWeekStart(s.to_string())),
        }
    }
}

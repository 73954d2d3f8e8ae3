/// MCP tools for calendar, analytics and activity logging
///
/// This module contains all the MCP tools that external clients can call.
/// Each tool has a parameter struct (deserialized from the call arguments,
/// with a generated JSON schema) and an async handler that runs against the
/// analytics engine for the local user.

pub mod calendar;
pub mod create;
pub mod dashboard;
pub mod goal;
pub mod list;
pub mod log;
pub mod mood;
pub mod trends;
pub mod weekly;

pub use calendar::*;
pub use create::*;
pub use dashboard::*;
pub use goal::*;
pub use list::*;
pub use log::*;
pub use mood::*;
pub use trends::*;
pub use weekly::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::analytics::{calendar::parse_reference_day, local_today, AnalyticsEngine};
use crate::calendar::CalendarError;
use crate::domain::{DayKey, DomainError, HabitId, User};
use crate::storage::{ActivityStore, StorageError};

/// Errors a tool call can fail with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid {field}: {message}")]
    InvalidArgument { field: &'static str, message: String },
}

impl ToolError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ToolError::InvalidArgument {
            field,
            message: message.into(),
        }
    }
}

/// Resolve an optional `date` argument to the user's calendar day
///
/// Missing dates mean local today.
pub(crate) fn resolve_entry_day<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(DayKey, DayKey), ToolError> {
    let resolved = engine.resolve_user_timezone(user, None)?;
    let today = local_today(&now, &resolved);
    let day = match date {
        Some(date) => parse_reference_day(date, &resolved.tz)?,
        None => today,
    };
    Ok((day, today))
}

pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    HabitId::from_string(raw.trim()).map_err(|_| ToolError::invalid("habit_id", format!("'{}' is not a valid ID", raw)))
}

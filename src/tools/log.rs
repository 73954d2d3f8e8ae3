/// Tools for logging and removing habit entries
///
/// This module implements the habit_log and habit_entry_delete MCP tools.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{HabitEntry, Streak, User};
use crate::storage::ActivityStore;
use crate::tools::{parse_habit_id, resolve_entry_day, ToolError};

/// Parameters for logging a habit
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LogHabitParams {
    /// ID of the habit to log
    pub habit_id: String,
    /// Day the entry counts for: YYYY-MM-DD or RFC 3339 (defaults to today)
    pub date: Option<String>,
    /// Amount achieved, in the habit's unit
    pub value: Option<f64>,
    pub notes: Option<String>,
    /// Mood score 1-10 attached to the entry
    pub mood: Option<u8>,
}

/// Response from logging a habit
#[derive(Debug, Serialize)]
pub struct LogHabitResponse {
    pub success: bool,
    /// False when an existing entry for the day was updated
    pub created: bool,
    pub entry: HabitEntry,
    pub streak: Streak,
    pub message: String,
}

/// Parameters for removing a logged entry
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteEntryParams {
    /// ID of the habit the entry belongs to
    pub habit_id: String,
    /// Day of the entry: YYYY-MM-DD or RFC 3339 (defaults to today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub deleted: HabitEntry,
    pub streak: Streak,
    pub message: String,
}

/// Upsert the entry for (habit, day) and recompute the habit's streak
pub async fn log_habit<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: LogHabitParams,
) -> Result<LogHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    let (day, today) = resolve_entry_day(engine, user, params.date.as_deref(), Utc::now())?;
    if day > today {
        return Err(ToolError::invalid("date", format!("{} is in the future", day)));
    }

    let store = engine.store();
    let habit = store.get_habit(user.id, habit_id).await?;
    if !habit.is_active {
        return Err(ToolError::invalid(
            "habit_id",
            format!("'{}' is inactive and cannot be logged", habit.name),
        ));
    }
    let entry = HabitEntry::new(habit.id, user.id, day, params.value, params.notes, params.mood)?;
    let upsert = store.upsert_habit_entry(&entry).await?;

    let streak = engine
        .streaks()
        .recompute_and_persist(user.id, habit.id, today)
        .await?;

    let message = format!(
        "{} '{}' for {}. Current streak: {} day{}",
        if upsert.was_created() { "Logged" } else { "Updated" },
        habit.name,
        day,
        streak.current,
        if streak.current == 1 { "" } else { "s" }
    );

    Ok(LogHabitResponse {
        success: true,
        created: upsert.was_created(),
        entry: upsert.entry().clone(),
        streak,
        message,
    })
}

/// Remove the entry for (habit, day) and recompute the habit's streak
pub async fn delete_habit_entry<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: DeleteEntryParams,
) -> Result<DeleteEntryResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let (day, today) = resolve_entry_day(engine, user, params.date.as_deref(), Utc::now())?;

    let store = engine.store();
    let habit = store.get_habit(user.id, habit_id).await?;
    let deleted = store.delete_habit_entry(user.id, habit.id, day).await?;

    let streak = engine
        .streaks()
        .recompute_and_persist(user.id, habit.id, today)
        .await?;

    Ok(DeleteEntryResponse {
        success: true,
        message: format!(
            "Removed '{}' entry for {}. Current streak: {}",
            habit.name, deleted.date, streak.current
        ),
        deleted,
        streak,
    })
}

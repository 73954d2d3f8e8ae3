/// Tool for listing habits
///
/// This module implements the habit_list MCP tool.

use std::collections::HashMap;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{Habit, HabitId, User};
use crate::storage::ActivityStore;
use crate::tools::{resolve_entry_day, ToolError};

/// Parameters for listing habits
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only habits in this category (case-insensitive)
    pub category: Option<String>,
    /// Show only active habits (default: true)
    pub active_only: Option<bool>,
    /// Sort by "name", "streak" or "created" (default: created, newest first)
    pub sort_by: Option<String>,
}

/// A habit with its materialized streak
#[derive(Debug, Serialize)]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: Habit,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitSummary>,
    pub total_habits: usize,
    pub active_habits: usize,
}

pub async fn list_habits<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, ToolError> {
    let (_, today) = resolve_entry_day(engine, user, None, Utc::now())?;
    let store = engine.store();
    let active_only = params.active_only.unwrap_or(true);
    let (habits, streaks) = futures::try_join!(
        store.list_habits(user.id, active_only),
        store.streaks_for_user(user.id),
    )?;

    let streaks: HashMap<HabitId, (u32, u32)> = streaks
        .into_iter()
        .map(|s| (s.habit_id, (s.current_as_of(today), s.longest)))
        .collect();

    let category = params.category.map(|c| c.trim().to_lowercase());
    let mut summaries: Vec<HabitSummary> = habits
        .into_iter()
        .filter(|habit| match &category {
            Some(wanted) => habit.category.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str()),
            None => true,
        })
        .map(|habit| {
            let (current_streak, longest_streak) = streaks.get(&habit.id).copied().unwrap_or((0, 0));
            HabitSummary {
                habit,
                current_streak,
                longest_streak,
            }
        })
        .collect();

    match params.sort_by.as_deref().map(str::trim) {
        None | Some("created") => {}
        Some("name") => summaries.sort_by(|a, b| a.habit.name.to_lowercase().cmp(&b.habit.name.to_lowercase())),
        Some("streak") => summaries.sort_by(|a, b| b.current_streak.cmp(&a.current_streak)),
        Some(other) => {
            return Err(ToolError::invalid(
                "sort_by",
                format!("'{}' (expected name, streak or created)", other),
            ))
        }
    }

    let active_habits = summaries.iter().filter(|s| s.habit.is_active).count();
    Ok(ListHabitsResponse {
        total_habits: summaries.len(),
        active_habits,
        habits: summaries,
    })
}

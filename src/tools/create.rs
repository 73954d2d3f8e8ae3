/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{Habit, User};
use crate::storage::ActivityStore;
use crate::tools::ToolError;

/// Parameters for creating a new habit
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit
    pub name: String,
    pub description: Option<String>,
    /// Free-form category used for grouping (e.g. "health")
    pub category: Option<String>,
    /// Unit for logged values (e.g. "minutes")
    pub unit: Option<String>,
    /// Daily target in `unit`
    pub target_value: Option<f64>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit: Habit,
    pub message: String,
}

/// Create a habit for the user; its streak row starts at zero
pub async fn create_habit<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(
        user.id,
        params.name,
        params.description,
        params.category,
        params.unit,
        params.target_value,
    )?;

    engine.store().create_habit(&habit).await?;
    tracing::info!(habit_id = %habit.id, "created habit '{}'", habit.name);

    let message = match habit.target_display() {
        Some(target) => format!("Created habit '{}' with a daily target of {}", habit.name, target),
        None => format!("Created habit '{}'", habit.name),
    };

    Ok(CreateHabitResponse {
        success: true,
        habit,
        message,
    })
}

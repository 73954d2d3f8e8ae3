/// Tools for goals
///
/// This module implements the goal_create and goal_progress MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsEngine;
use crate::domain::{Goal, GoalId, User};
use crate::storage::ActivityStore;
use crate::tools::ToolError;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateGoalParams {
    pub title: String,
    pub description: Option<String>,
    /// Value at which the goal is complete
    pub target_value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GoalProgressParams {
    /// ID of the goal to update
    pub goal_id: String,
    /// New current value toward the target
    pub current_value: f64,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub success: bool,
    pub goal: Goal,
    /// Progress as a whole percentage
    pub progress: u32,
    pub message: String,
}

pub async fn create_goal<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: CreateGoalParams,
) -> Result<GoalResponse, ToolError> {
    let goal = Goal::new(user.id, params.title, params.description, params.target_value, params.unit)?;
    engine.store().create_goal(&goal).await?;
    tracing::info!(goal_id = %goal.id, "created goal '{}'", goal.title);

    Ok(GoalResponse {
        success: true,
        progress: goal.progress(),
        message: format!("Created goal '{}'", goal.title),
        goal,
    })
}

/// Set the goal's current value; reaching the target completes it
pub async fn update_goal_progress<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: GoalProgressParams,
) -> Result<GoalResponse, ToolError> {
    let goal_id = GoalId::from_string(params.goal_id.trim())
        .map_err(|_| ToolError::invalid("goal_id", format!("'{}' is not a valid ID", params.goal_id)))?;

    let store = engine.store();
    let mut goal = store.get_goal(user.id, goal_id).await?;
    goal.record_progress(params.current_value)?;
    store.update_goal(&goal).await?;

    let progress = goal.progress();
    Ok(GoalResponse {
        success: true,
        progress,
        message: format!("'{}' is {}% complete ({})", goal.title, progress, goal.status.as_str()),
        goal,
    })
}

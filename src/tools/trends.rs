/// Tools for habit trends and per-habit analytics
///
/// This module implements the analytics_trends and habit_analytics MCP tools.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::analytics::{AnalyticsEngine, HabitAnalytics, HabitTrends};
use crate::domain::User;
use crate::storage::ActivityStore;
use crate::tools::{parse_habit_id, ToolError};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TrendsParams {
    /// Number of days to cover, 1 to 365 (default: 30)
    pub period: Option<u32>,
}

pub async fn analytics_trends<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: TrendsParams,
) -> Result<HabitTrends, ToolError> {
    Ok(engine.habit_trends(user, params.period).await?)
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct HabitAnalyticsParams {
    /// ID of the habit to analyze
    pub habit_id: String,
    /// Number of days to analyze, 1 to 365 (default: 30)
    pub period: Option<u32>,
}

pub async fn habit_analytics<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: HabitAnalyticsParams,
) -> Result<HabitAnalytics, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    Ok(engine.habit_analytics(user, habit_id, params.period).await?)
}

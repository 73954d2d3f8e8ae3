/// Tool for the weekly summary
///
/// This module implements the analytics_weekly MCP tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::analytics::{AnalyticsEngine, WeeklySummary};
use crate::calendar::WeekStart;
use crate::domain::User;
use crate::storage::ActivityStore;
use crate::tools::ToolError;

/// Week start as sent by clients: 0/1 or a day name
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum WeekStartArg {
    Number(u8),
    Name(String),
}

impl WeekStartArg {
    pub fn resolve(&self) -> Result<WeekStart, ToolError> {
        let week_start = match self {
            WeekStartArg::Number(n) => n.to_string().parse()?,
            WeekStartArg::Name(name) => name.parse()?,
        };
        Ok(week_start)
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct WeeklyParams {
    /// 0 = Sunday, 1 = Monday (default)
    pub week_start: Option<WeekStartArg>,
}

pub async fn analytics_weekly<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: WeeklyParams,
) -> Result<WeeklySummary, ToolError> {
    let week_start = match params.week_start {
        Some(arg) => arg.resolve()?,
        None => WeekStart::Monday,
    };
    Ok(engine.weekly_summary(user, week_start).await?)
}

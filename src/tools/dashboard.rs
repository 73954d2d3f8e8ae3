/// Tool for the analytics dashboard
///
/// This module implements the analytics_dashboard MCP tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::analytics::{AnalyticsEngine, DashboardPayload};
use crate::domain::User;
use crate::storage::ActivityStore;
use crate::tools::ToolError;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DashboardParams {
    /// Number of days to analyze, 1 to 365 (defaults to the configured period)
    pub period: Option<u32>,
}

pub async fn analytics_dashboard<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: DashboardParams,
) -> Result<DashboardPayload, ToolError> {
    Ok(engine.dashboard(user, params.period).await?)
}

/// Tool for the calendar view
///
/// This module implements the calendar_view MCP tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::analytics::{AnalyticsEngine, CalendarPayload, CalendarRequest};
use crate::domain::User;
use crate::storage::ActivityStore;
use crate::tools::ToolError;

/// Parameters for the calendar view
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalendarParams {
    /// Reference date: RFC 3339 instant or YYYY-MM-DD (defaults to today)
    pub date: Option<String>,
    /// View kind: day, week or month (defaults to month)
    pub view: Option<String>,
    /// IANA timezone such as "Europe/Berlin" (defaults to the profile timezone)
    pub timezone: Option<String>,
}

impl From<CalendarParams> for CalendarRequest {
    fn from(params: CalendarParams) -> Self {
        CalendarRequest {
            date: params.date,
            view: params.view.unwrap_or_else(|| "month".to_string()),
            timezone: params.timezone,
        }
    }
}

pub async fn calendar_view<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: CalendarParams,
) -> Result<CalendarPayload, ToolError> {
    let request = CalendarRequest::from(params);
    Ok(engine.calendar_view(user, &request).await?)
}

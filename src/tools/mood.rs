/// Tool for logging the daily mood
///
/// This module implements the mood_log and mood_analytics MCP tools.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsEngine, MoodAnalytics};
use crate::domain::{MoodEntry, User};
use crate::storage::ActivityStore;
use crate::tools::{resolve_entry_day, ToolError};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LogMoodParams {
    /// Rating from 1 (terrible) to 10 (excellent)
    pub rating: u8,
    /// Day the mood is for: YYYY-MM-DD or RFC 3339 (defaults to today)
    pub date: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LogMoodResponse {
    pub success: bool,
    pub mood: MoodEntry,
    pub message: String,
}

/// Record the mood for a day, replacing any earlier rating that day
pub async fn log_mood<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: LogMoodParams,
) -> Result<LogMoodResponse, ToolError> {
    let (day, _) = resolve_entry_day(engine, user, params.date.as_deref(), Utc::now())?;
    let mood = MoodEntry::new(user.id, day, params.rating, params.notes, params.tags)?;
    let stored = engine.store().upsert_mood(&mood).await?;

    let message = format!("Mood for {}: {}/10 ({})", stored.date, stored.rating, stored.description());
    Ok(LogMoodResponse {
        success: true,
        mood: stored,
        message,
    })
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct MoodAnalyticsParams {
    /// Number of days to analyze, 1 to 365 (default: 30)
    pub period: Option<u32>,
}

pub async fn mood_analytics<S: ActivityStore>(
    engine: &AnalyticsEngine<S>,
    user: &User,
    params: MoodAnalyticsParams,
) -> Result<MoodAnalytics, ToolError> {
    Ok(engine.mood_analytics(user, params.period).await?)
}

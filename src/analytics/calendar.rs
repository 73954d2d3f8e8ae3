/// Calendar view payloads (day, week, month)

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::analytics::{local_today, AnalyticsEngine};
use crate::calendar::{
    aggregate, build_month_grid, compute_stats, per_day_counts, ActivityRecord, CalendarError,
    ConsistencyStats, MonthGrid, ViewKind, Window,
};
use crate::domain::{DayKey, User};
use crate::storage::ActivityStore;

/// A calendar request as received from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarRequest {
    /// RFC 3339 instant or `YYYY-MM-DD`; defaults to now
    pub date: Option<String>,
    /// `day`, `week` or `month`
    pub view: String,
    /// IANA timezone; defaults to the user's profile timezone
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekDay {
    pub day: u32,
    pub day_name: String,
    pub date: DayKey,
    pub activities: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayData {
    /// Number of active habits the user could have logged
    pub activities_scheduled: usize,
    pub activities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarPayload {
    pub success: bool,
    pub view: ViewKind,
    pub timezone: String,
    pub timezone_fallback: bool,
    pub window: Window,
    pub stats: ConsistencyStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<MonthGrid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_days: Option<Vec<WeekDay>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_data: Option<DayData>,
}

/// Parse a reference date into a calendar day in `tz`
///
/// Instants are converted into `tz`; bare dates are taken as already local.
pub fn parse_reference_day(date: &str, tz: &Tz) -> Result<DayKey, CalendarError> {
    let trimmed = date.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(DayKey::from_instant(&instant.with_timezone(&Utc), tz));
    }
    DayKey::parse(trimmed).ok_or_else(|| CalendarError::InvalidDate(date.to_string()))
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub async fn calendar_view(
        &self,
        user: &User,
        request: &CalendarRequest,
    ) -> Result<CalendarPayload, CalendarError> {
        self.calendar_view_at(user, request, Utc::now()).await
    }

    /// Build the calendar payload with `now` as the current instant
    pub async fn calendar_view_at(
        &self,
        user: &User,
        request: &CalendarRequest,
        now: DateTime<Utc>,
    ) -> Result<CalendarPayload, CalendarError> {
        let view: ViewKind = request.view.parse()?;
        let resolved = self.resolve_user_timezone(user, request.timezone.as_deref())?;
        let reference = match request.date.as_deref() {
            Some(date) => parse_reference_day(date, &resolved.tz)?,
            None => local_today(&now, &resolved),
        };
        let window = Window::for_day(reference, view, resolved.tz)?;

        tracing::debug!(
            view = %view,
            timezone = resolved.name(),
            "calendar window {}..={}",
            window.first_day,
            window.last_day
        );

        let rows = self.fetch_window_rows(user.id, &window).await?;
        let activity = aggregate(&window, &rows.habit_entries, &rows.mood_entries, &rows.goals);
        let counts = per_day_counts(&activity);
        let stats = compute_stats(&window, &counts);

        let mut payload = CalendarPayload {
            success: true,
            view,
            timezone: resolved.name().to_string(),
            timezone_fallback: resolved.fell_back,
            window,
            stats,
            days: None,
            week_days: None,
            streak: None,
            day_data: None,
        };

        match view {
            ViewKind::Month => {
                payload.days = Some(build_month_grid(window.first_day, window.last_day, &counts)?);
            }
            ViewKind::Week => {
                let week_days = window
                    .days()
                    .map(|date| {
                        let activities = counts.get(&date).copied().unwrap_or(0);
                        WeekDay {
                            day: date.day(),
                            day_name: date.short_weekday_name(),
                            date,
                            activities,
                            completed: activities > 0,
                        }
                    })
                    .collect();
                let today = local_today(&now, &resolved);
                payload.week_days = Some(week_days);
                payload.streak = Some(self.streaks().user_streak(user.id, today).await?);
            }
            ViewKind::Day => {
                let habits = self.store().list_habits(user.id, true).await?;
                let activities = activity.get(&reference).cloned().unwrap_or_default();
                payload.day_data = Some(DayData {
                    activities_scheduled: habits.len(),
                    activities,
                });
            }
        }

        Ok(payload)
    }
}

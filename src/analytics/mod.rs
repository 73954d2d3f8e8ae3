/// Analytics engine driving the calendar core against a datastore
///
/// This module wires the pure calendar functions to an `ActivityStore`:
/// it resolves the user's timezone and window, fetches the three row
/// collections for the window, and assembles view payloads, the dashboard
/// and the period reports (dashboard, weekly summary, trends, per-habit and
/// mood analytics). Streak persistence lives in `streaks`.

pub mod calendar;
pub mod dashboard;
pub mod habit;
pub mod moods;
pub mod streaks;
pub mod trends;
pub mod weekly;

pub use calendar::{CalendarPayload, CalendarRequest, DayData, WeekDay};
pub use dashboard::{DashboardPayload, HabitStat};
pub use habit::HabitAnalytics;
pub use moods::{MoodAnalytics, MoodPoint, TagCount, WeeklyMood};
pub use streaks::StreakTracker;
pub use trends::{HabitDayStatus, HabitTrends, TrendDay};
pub use weekly::{WeeklyHabitStat, WeeklySummary};

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::calendar::{resolve_timezone, CalendarError, ResolvedTimezone, Window};
use crate::config::CalendarConfig;
use crate::domain::{DayKey, Goal, LoggedHabitEntry, MoodEntry, User, UserId};
use crate::storage::ActivityStore;

/// Default length of the trend and analytics reports, in days
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Rows fetched for one window
#[derive(Debug, Clone, Default)]
pub struct WindowRows {
    pub habit_entries: Vec<LoggedHabitEntry>,
    pub mood_entries: Vec<MoodEntry>,
    pub goals: Vec<Goal>,
}

/// The `period` local days ending on the user's today
#[derive(Debug, Clone)]
pub(crate) struct PeriodWindow {
    pub resolved: ResolvedTimezone,
    pub today: DayKey,
    pub window: Window,
}

/// Analytics engine for processing activity data
///
/// Generic over the datastore so request handling can be exercised against
/// fakes. Every request builds its maps fresh; nothing is cached here.
pub struct AnalyticsEngine<S> {
    store: Arc<S>,
    config: CalendarConfig,
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub fn new(store: Arc<S>, config: CalendarConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn streaks(&self) -> StreakTracker<S> {
        StreakTracker::new(Arc::clone(&self.store), self.config.streak_lookback_days)
    }

    /// Resolve the timezone for a request
    ///
    /// The explicit request value wins over the profile, which wins over the
    /// configured default.
    pub(crate) fn resolve_user_timezone(
        &self,
        user: &User,
        requested: Option<&str>,
    ) -> Result<ResolvedTimezone, CalendarError> {
        let name = requested
            .filter(|tz| !tz.trim().is_empty())
            .or(Some(user.timezone.as_str()).filter(|tz| !tz.trim().is_empty()))
            .unwrap_or(&self.config.default_timezone);
        resolve_timezone(name, self.config.timezone_policy)
    }

    /// Validate `period` (1 to 365 days) and build its window ending on local today
    pub(crate) fn period_window(
        &self,
        user: &User,
        period: u32,
        now: DateTime<Utc>,
    ) -> Result<PeriodWindow, CalendarError> {
        if !(1..=365).contains(&period) {
            return Err(CalendarError::InvalidPeriod(period));
        }

        let resolved = self.resolve_user_timezone(user, None)?;
        let today = local_today(&now, &resolved);
        let first_day = today
            .offset(-(i64::from(period) - 1))
            .ok_or_else(|| CalendarError::InvalidDate(today.to_string()))?;
        let window = Window::range(first_day, today, resolved.tz)?;

        Ok(PeriodWindow {
            resolved,
            today,
            window,
        })
    }

    /// Fetch habit entries, moods and goals for `window` concurrently
    pub(crate) async fn fetch_window_rows(
        &self,
        user_id: UserId,
        window: &Window,
    ) -> Result<WindowRows, CalendarError> {
        let (habit_entries, mood_entries, goals) = futures::try_join!(
            self.store.habit_entries_in_range(user_id, window.first_day, window.last_day),
            self.store.mood_entries_in_range(user_id, window.first_day, window.last_day),
            self.store.goals_created_between(user_id, window.start, window.end),
        )?;

        tracing::debug!(
            habit_entries = habit_entries.len(),
            moods = mood_entries.len(),
            goals = goals.len(),
            "fetched rows for {}..={}",
            window.first_day,
            window.last_day
        );

        Ok(WindowRows {
            habit_entries,
            mood_entries,
            goals,
        })
    }
}

/// Local calendar day of `now` in the resolved timezone
pub(crate) fn local_today(now: &DateTime<Utc>, tz: &ResolvedTimezone) -> DayKey {
    DayKey::from_instant(now, &tz.tz)
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of mood ratings, rounded to two decimals; 0 with no moods
pub(crate) fn average_mood(moods: &[MoodEntry]) -> f64 {
    if moods.is_empty() {
        return 0.0;
    }
    let total: u32 = moods.iter().map(|m| u32::from(m.rating)).sum();
    round2(f64::from(total) / moods.len() as f64)
}

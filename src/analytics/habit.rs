/// Analytics for a single habit over a period

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::{round2, AnalyticsEngine, PeriodWindow, DEFAULT_PERIOD_DAYS};
use crate::calendar::{CalendarError, Window};
use crate::domain::{Habit, HabitEntry, HabitId, User};
use crate::storage::ActivityStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitAnalytics {
    pub habit: Habit,
    pub period_days: u32,
    pub timezone: String,
    pub window: Window,
    pub total_entries: usize,
    /// Days logged as a percentage of the period, two decimals
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Mean logged value for habits with a target; missing values count as 0
    pub average_value: Option<f64>,
    /// Entries in the period, oldest first
    pub entries: Vec<HabitEntry>,
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub async fn habit_analytics(
        &self,
        user: &User,
        habit_id: HabitId,
        period_days: Option<u32>,
    ) -> Result<HabitAnalytics, CalendarError> {
        self.habit_analytics_at(user, habit_id, period_days, Utc::now()).await
    }

    pub async fn habit_analytics_at(
        &self,
        user: &User,
        habit_id: HabitId,
        period_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<HabitAnalytics, CalendarError> {
        let period = period_days.unwrap_or(DEFAULT_PERIOD_DAYS);
        let PeriodWindow {
            resolved,
            today,
            window,
        } = self.period_window(user, period, now)?;

        let store = self.store();
        let (habit, entries, streak) = futures::try_join!(
            store.get_habit(user.id, habit_id),
            store.habit_entries_in_range(user.id, window.first_day, window.last_day),
            store.get_streak(user.id, habit_id),
        )?;

        let entries: Vec<HabitEntry> = entries
            .into_iter()
            .filter(|logged| logged.entry.habit_id == habit.id)
            .map(|logged| logged.entry)
            .collect();

        let average_value = match habit.target_value {
            Some(_) if !entries.is_empty() => {
                let total: f64 = entries.iter().map(|e| e.value.unwrap_or(0.0)).sum();
                Some(round2(total / entries.len() as f64))
            }
            _ => None,
        };

        Ok(HabitAnalytics {
            period_days: period,
            timezone: resolved.name().to_string(),
            window,
            total_entries: entries.len(),
            completion_rate: round2(entries.len() as f64 / f64::from(period) * 100.0),
            current_streak: streak.as_ref().map(|s| s.current_as_of(today)).unwrap_or(0),
            longest_streak: streak.as_ref().map(|s| s.longest).unwrap_or(0),
            average_value,
            entries,
            habit,
        })
    }
}

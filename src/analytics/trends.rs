/// Day-by-day habit trends over a period

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::{AnalyticsEngine, PeriodWindow, DEFAULT_PERIOD_DAYS};
use crate::calendar::{CalendarError, Window};
use crate::domain::{DayKey, HabitEntry, HabitId, User};
use crate::storage::ActivityStore;

/// One habit on one day of the trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitDayStatus {
    pub habit_id: HabitId,
    pub name: String,
    pub completed: bool,
    pub value: Option<f64>,
    pub mood: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDay {
    pub date: DayKey,
    /// Every active habit, in listing order
    pub habits: Vec<HabitDayStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitTrends {
    pub period_days: u32,
    pub timezone: String,
    pub timezone_fallback: bool,
    pub window: Window,
    /// Oldest day first
    pub trends: Vec<TrendDay>,
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub async fn habit_trends(&self, user: &User, period_days: Option<u32>) -> Result<HabitTrends, CalendarError> {
        self.habit_trends_at(user, period_days, Utc::now()).await
    }

    /// Completion grid of active habits over the `period_days` ending today
    pub async fn habit_trends_at(
        &self,
        user: &User,
        period_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<HabitTrends, CalendarError> {
        let period = period_days.unwrap_or(DEFAULT_PERIOD_DAYS);
        let PeriodWindow { resolved, window, .. } = self.period_window(user, period, now)?;

        let store = self.store();
        let (habits, entries) = futures::try_join!(
            store.list_habits(user.id, true),
            store.habit_entries_in_range(user.id, window.first_day, window.last_day),
        )?;

        let logged: HashMap<(HabitId, DayKey), HabitEntry> = entries
            .into_iter()
            .map(|logged| ((logged.entry.habit_id, logged.entry.date), logged.entry))
            .collect();

        let trends = window
            .days()
            .map(|date| TrendDay {
                date,
                habits: habits
                    .iter()
                    .map(|habit| {
                        let entry = logged.get(&(habit.id, date));
                        HabitDayStatus {
                            habit_id: habit.id,
                            name: habit.name.clone(),
                            completed: entry.is_some(),
                            value: entry.and_then(|e| e.value),
                            mood: entry.and_then(|e| e.mood),
                        }
                    })
                    .collect(),
            })
            .collect();

        tracing::debug!(habits = habits.len(), days = period, "built habit trends");

        Ok(HabitTrends {
            period_days: period,
            timezone: resolved.name().to_string(),
            timezone_fallback: resolved.fell_back,
            window,
            trends,
        })
    }
}

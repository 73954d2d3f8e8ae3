/// Weekly summary for the week containing today

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::{average_mood, local_today, round2, AnalyticsEngine};
use crate::calendar::{CalendarError, WeekStart, Window};
use crate::domain::{DayKey, HabitEntry, HabitId, MoodEntry, User};
use crate::storage::ActivityStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyHabitStat {
    pub habit_id: HabitId,
    pub name: String,
    pub week_entries: usize,
    /// Days logged out of 7, as a percentage with two decimals
    pub completion_rate: f64,
    pub current_streak: u32,
    pub entries: Vec<HabitEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub week_start: DayKey,
    pub week_end: DayKey,
    pub timezone: String,
    pub timezone_fallback: bool,
    pub window: Window,
    pub total_habits: usize,
    /// Habits with at least one entry this week
    pub completed_habits: usize,
    pub average_mood: f64,
    pub habit_stats: Vec<WeeklyHabitStat>,
    pub mood_data: Vec<MoodEntry>,
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub async fn weekly_summary(&self, user: &User, week_start: WeekStart) -> Result<WeeklySummary, CalendarError> {
        self.weekly_summary_at(user, week_start, Utc::now()).await
    }

    pub async fn weekly_summary_at(
        &self,
        user: &User,
        week_start: WeekStart,
        now: DateTime<Utc>,
    ) -> Result<WeeklySummary, CalendarError> {
        let resolved = self.resolve_user_timezone(user, None)?;
        let today = local_today(&now, &resolved);
        let window = Window::week_starting(today, week_start, resolved.tz)?;

        let store = self.store();
        let (habits, mut entries, mut moods, streaks) = futures::try_join!(
            store.list_habits(user.id, true),
            store.habit_entries_in_range(user.id, window.first_day, window.last_day),
            store.mood_entries_in_range(user.id, window.first_day, window.last_day),
            store.streaks_for_user(user.id),
        )?;

        entries.retain(|logged| window.contains_day(logged.entry.date));
        moods.retain(|mood| window.contains_day(mood.date));
        moods.sort_by_key(|mood| mood.date);

        let streaks: HashMap<HabitId, u32> = streaks
            .into_iter()
            .map(|s| (s.habit_id, s.current_as_of(today)))
            .collect();

        let habit_stats: Vec<WeeklyHabitStat> = habits
            .iter()
            .map(|habit| {
                let habit_entries: Vec<HabitEntry> = entries
                    .iter()
                    .filter(|logged| logged.entry.habit_id == habit.id)
                    .map(|logged| logged.entry.clone())
                    .collect();

                WeeklyHabitStat {
                    habit_id: habit.id,
                    name: habit.name.clone(),
                    week_entries: habit_entries.len(),
                    completion_rate: round2(habit_entries.len() as f64 / 7.0 * 100.0),
                    current_streak: streaks.get(&habit.id).copied().unwrap_or(0),
                    entries: habit_entries,
                }
            })
            .collect();

        Ok(WeeklySummary {
            week_start: window.first_day,
            week_end: window.last_day,
            timezone: resolved.name().to_string(),
            timezone_fallback: resolved.fell_back,
            window,
            total_habits: habits.len(),
            completed_habits: habit_stats.iter().filter(|s| s.week_entries > 0).count(),
            average_mood: average_mood(&moods),
            habit_stats,
            mood_data: moods,
        })
    }
}

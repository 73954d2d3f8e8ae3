/// Dashboard analytics over the last N days

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::{average_mood, round2, AnalyticsEngine, PeriodWindow};
use crate::calendar::{
    aggregate, compute_stats, per_day_counts, CalendarError, ConsistencyStats, Window,
};
use crate::domain::{DayKey, Goal, GoalStatus, HabitId, MoodEntry, User};
use crate::storage::ActivityStore;

const RECENT_MOODS: usize = 3;
const MOOD_AVERAGE_DAYS: usize = 7;
const GOALS_SHOWN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStat {
    pub habit_id: HabitId,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    /// Days logged as a percentage of the period, two decimals
    pub completion_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_entries: usize,
    pub last_entry: Option<DayKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalSummary {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPayload {
    pub period_days: u32,
    pub timezone: String,
    pub timezone_fallback: bool,
    pub window: Window,
    pub overall_completion_rate: f64,
    pub total_habits: usize,
    pub total_completions: usize,
    /// Mean of the newest seven moods in the period
    pub average_mood: f64,
    pub habit_stats: Vec<HabitStat>,
    pub recent_moods: Vec<MoodEntry>,
    pub active_goals: usize,
    pub goals: Vec<GoalSummary>,
    pub consistency: ConsistencyStats,
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub async fn dashboard(&self, user: &User, period_days: Option<u32>) -> Result<DashboardPayload, CalendarError> {
        self.dashboard_at(user, period_days, Utc::now()).await
    }

    /// Dashboard for the `period_days` local days ending on today
    pub async fn dashboard_at(
        &self,
        user: &User,
        period_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<DashboardPayload, CalendarError> {
        let period = period_days.unwrap_or(self.config().dashboard_period_days);
        let PeriodWindow {
            resolved,
            today,
            window,
        } = self.period_window(user, period, now)?;

        let (rows, habits, streaks, active_goals) = futures::try_join!(
            self.fetch_window_rows(user.id, &window),
            async { Ok::<_, CalendarError>(self.store().list_habits(user.id, true).await?) },
            async { Ok::<_, CalendarError>(self.store().streaks_for_user(user.id).await?) },
            async { Ok::<_, CalendarError>(self.store().goals_with_status(user.id, GoalStatus::Active).await?) },
        )?;

        let streaks: HashMap<HabitId, _> = streaks.into_iter().map(|s| (s.habit_id, s)).collect();

        let habit_stats: Vec<HabitStat> = habits
            .iter()
            .map(|habit| {
                let entries: Vec<DayKey> = rows
                    .habit_entries
                    .iter()
                    .filter(|logged| logged.entry.habit_id == habit.id)
                    .map(|logged| logged.entry.date)
                    .collect();
                let streak = streaks.get(&habit.id);

                HabitStat {
                    habit_id: habit.id,
                    name: habit.name.clone(),
                    category: habit.category.clone(),
                    unit: habit.unit.clone(),
                    completion_rate: round2(entries.len() as f64 / f64::from(period) * 100.0),
                    current_streak: streak.map(|s| s.current_as_of(today)).unwrap_or(0),
                    longest_streak: streak.map(|s| s.longest).unwrap_or(0),
                    total_entries: entries.len(),
                    last_entry: entries.iter().max().copied(),
                }
            })
            .collect();

        let total_habits = habits.len();
        let total_completions: usize = habit_stats.iter().map(|s| s.total_entries).sum();
        let possible = total_habits * period as usize;
        let overall_completion_rate = if possible > 0 {
            round2(total_completions as f64 / possible as f64 * 100.0)
        } else {
            0.0
        };

        let activity = aggregate(&window, &rows.habit_entries, &rows.mood_entries, &rows.goals);
        let consistency = compute_stats(&window, &per_day_counts(&activity));

        let mut recent_moods = rows.mood_entries;
        recent_moods.sort_by(|a, b| b.date.cmp(&a.date));
        let mean_mood = average_mood(&recent_moods[..recent_moods.len().min(MOOD_AVERAGE_DAYS)]);
        recent_moods.truncate(RECENT_MOODS);

        let goals = active_goals
            .iter()
            .take(GOALS_SHOWN)
            .map(|goal| GoalSummary {
                progress: goal.progress(),
                goal: goal.clone(),
            })
            .collect();

        Ok(DashboardPayload {
            period_days: period,
            timezone: resolved.name().to_string(),
            timezone_fallback: resolved.fell_back,
            window,
            overall_completion_rate,
            total_habits,
            total_completions,
            average_mood: mean_mood,
            habit_stats,
            recent_moods,
            active_goals: active_goals.len(),
            goals,
            consistency,
        })
    }
}

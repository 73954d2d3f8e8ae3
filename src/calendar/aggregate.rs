/// Per-day merging of habit, mood and goal activity
///
/// Keying rule, applied everywhere: habit and mood rows already carry the
/// user's calendar day; goals are placed on the day their `created_at`
/// instant falls on in the window's timezone.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar::Window;
use crate::domain::{ActivityKind, DayKey, Goal, LoggedHabitEntry, MoodEntry};

pub const MOOD_UNIT: &str = "/10";
pub const GOAL_UNIT: &str = "%";

/// One tagged activity on a calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub source_id: String,
    pub display_name: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub type DailyActivity = BTreeMap<DayKey, Vec<ActivityRecord>>;
pub type DailyCounts = BTreeMap<DayKey, u32>;

/// The calendar day a goal counts for
///
/// Goals only show up on the day they were created; progress updates on
/// later days are not tracked as activity.
pub fn goal_day(goal: &Goal, tz: &Tz) -> DayKey {
    DayKey::from_instant(&goal.created_at, tz)
}

/// Merge the three collections into tagged records grouped by day
///
/// Rows outside the window are dropped. Days ascend; records inside a day
/// are ordered by timestamp, then kind.
pub fn aggregate(
    window: &Window,
    habit_entries: &[LoggedHabitEntry],
    mood_entries: &[MoodEntry],
    goals: &[Goal],
) -> DailyActivity {
    let mut days: DailyActivity = BTreeMap::new();

    for logged in habit_entries {
        let day = logged.entry.date;
        if !window.contains_day(day) {
            continue;
        }
        days.entry(day).or_default().push(ActivityRecord {
            kind: ActivityKind::Habit,
            source_id: logged.entry.id.to_string(),
            display_name: logged.habit_name.clone(),
            value: logged.entry.value,
            unit: logged.habit_unit.clone(),
            timestamp: logged.entry.created_at,
        });
    }

    for mood in mood_entries {
        if !window.contains_day(mood.date) {
            continue;
        }
        days.entry(mood.date).or_default().push(ActivityRecord {
            kind: ActivityKind::Mood,
            source_id: mood.id.to_string(),
            display_name: mood.display_label(),
            value: Some(f64::from(mood.rating)),
            unit: Some(MOOD_UNIT.to_string()),
            timestamp: mood.created_at,
        });
    }

    for goal in goals {
        let day = goal_day(goal, &window.timezone);
        if !window.contains_day(day) {
            continue;
        }
        days.entry(day).or_default().push(ActivityRecord {
            kind: ActivityKind::Goal,
            source_id: goal.id.to_string(),
            display_name: goal.title.clone(),
            value: Some(f64::from(goal.progress())),
            unit: Some(GOAL_UNIT.to_string()),
            timestamp: goal.created_at,
        });
    }

    for records in days.values_mut() {
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.kind.cmp(&b.kind)));
    }

    days
}

/// Activity count per day, derived from aggregated records
pub fn per_day_counts(activity: &DailyActivity) -> DailyCounts {
    activity
        .iter()
        .map(|(day, records)| (*day, records.len() as u32))
        .collect()
}

/// Activity count per day, grouped directly from the raw rows
///
/// Always equal to `per_day_counts(&aggregate(..))` for the same inputs.
pub fn count_rows_by_day(
    window: &Window,
    habit_entries: &[LoggedHabitEntry],
    mood_entries: &[MoodEntry],
    goals: &[Goal],
) -> DailyCounts {
    let days = habit_entries
        .iter()
        .map(|logged| logged.entry.date)
        .chain(mood_entries.iter().map(|mood| mood.date))
        .chain(goals.iter().map(|goal| goal_day(goal, &window.timezone)))
        .filter(|day| window.contains_day(*day));

    let mut counts = BTreeMap::new();
    for day in days {
        *counts.entry(day).or_insert(0) += 1;
    }
    counts
}

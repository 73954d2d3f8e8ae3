/// Streak calculation and tracking functionality
///
/// This module defines the materialized Streak record for a (user, habit)
/// pair and the pure functions that compute current and longest streaks from
/// sets of active calendar days.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use crate::domain::{DayKey, HabitId, UserId};

/// Materialized streak information for a habit
///
/// This row is recomputed every time an entry is logged for the habit and is
/// keyed by (user, habit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Owner of the habit
    pub user_id: UserId,
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Consecutive active days ending today
    pub current: u32,
    /// Best run of consecutive active days ever recorded
    pub longest: u32,
    /// Most recent active day (None if never logged)
    pub last_date: Option<DayKey>,
}

impl Streak {
    /// Create an empty streak record for a habit that hasn't been logged yet
    pub fn new(user_id: UserId, habit_id: HabitId) -> Self {
        Self {
            user_id,
            habit_id,
            current: 0,
            longest: 0,
            last_date: None,
        }
    }

    /// Recompute the streak from the active days inside the lookback window
    ///
    /// `previous` is the stored row, if any. Because only a bounded window of
    /// history is materialized, the stored `longest` is carried forward when
    /// it beats anything visible in the window.
    pub fn recompute(
        previous: Option<&Streak>,
        user_id: UserId,
        habit_id: HabitId,
        active_days: &BTreeSet<DayKey>,
        today: DayKey,
    ) -> Self {
        let days: Vec<DayKey> = active_days.iter().copied().collect();
        let current = current_streak(active_days, today);
        let longest_in_window = longest_streak(&days);
        let previous_longest = previous.map(|s| s.longest).unwrap_or(0);

        Self {
            user_id,
            habit_id,
            current,
            longest: previous_longest.max(longest_in_window).max(current),
            last_date: active_days.iter().next_back().copied(),
        }
    }

    /// The current run as seen on `today`
    ///
    /// The stored `current` only holds while its last active day is today;
    /// once a day passes without a log the run is broken.
    pub fn current_as_of(&self, today: DayKey) -> u32 {
        if self.last_date == Some(today) {
            self.current
        } else {
            0
        }
    }
}

/// Count consecutive active days walking backward from `today`
///
/// Stops at the first missing day. If `today` itself is not active the
/// streak is 0.
pub fn current_streak(active_days: &BTreeSet<DayKey>, today: DayKey) -> u32 {
    let mut streak = 0;
    let mut checking = Some(today);

    while let Some(day) = checking {
        if !active_days.contains(&day) {
            break;
        }
        streak += 1;
        checking = day.pred();
    }

    streak
}

/// Longest run of calendar-adjacent days in an ascending sequence
///
/// Repeated days are tolerated and do not extend a run.
pub fn longest_streak(sorted_days: &[DayKey]) -> u32 {
    let Some(first) = sorted_days.first() else {
        return 0;
    };

    let mut longest = 1;
    let mut run = 1;
    let mut last = *first;

    for &day in sorted_days.iter().skip(1) {
        if day == last {
            continue;
        }
        if last.is_followed_by(day) {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 1;
        }
        last = day;
    }

    longest.max(run)
}

/// The inclusive day range to materialize for a streak check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub first_day: DayKey,
    pub last_day: DayKey,
}

impl LookbackWindow {
    /// `days` calendar days ending on `today` (at least one day)
    pub fn ending(today: DayKey, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            first_day: today.offset(-span).unwrap_or(today),
            last_day: today,
        }
    }

    pub fn contains(&self, day: DayKey) -> bool {
        day >= self.first_day && day <= self.last_day
    }
}

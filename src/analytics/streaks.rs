/// Streak recomputation against the datastore

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::calendar::CalendarError;
use crate::domain::{current_streak, DayKey, HabitId, LookbackWindow, Streak, UserId};
use crate::storage::ActivityStore;

/// Recomputes and persists materialized streak rows
///
/// The window of history considered is `lookback_days` ending on the
/// caller's local today.
pub struct StreakTracker<S> {
    store: Arc<S>,
    lookback_days: u32,
}

impl<S: ActivityStore> StreakTracker<S> {
    pub fn new(store: Arc<S>, lookback_days: u32) -> Self {
        Self {
            store,
            lookback_days,
        }
    }

    pub fn lookback(&self, today: DayKey) -> LookbackWindow {
        LookbackWindow::ending(today, self.lookback_days)
    }

    /// Recompute the (user, habit) streak as of `today` and store it
    ///
    /// Runs inside the store's atomic update, so concurrent logs for the
    /// same habit cannot interleave their read and write.
    pub async fn recompute_and_persist(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        today: DayKey,
    ) -> Result<Streak, CalendarError> {
        let lookback = self.lookback(today);

        let compute = move |previous: Option<&Streak>, days: &BTreeSet<DayKey>| {
            let in_window: BTreeSet<DayKey> = days
                .iter()
                .copied()
                .filter(|day| lookback.contains(*day))
                .collect();
            Streak::recompute(previous, user_id, habit_id, &in_window, today)
        };

        let streak = self
            .store
            .update_streak_atomically(user_id, habit_id, lookback.first_day, &compute)
            .await?;

        tracing::info!(
            habit_id = %habit_id,
            current = streak.current,
            longest = streak.longest,
            "streak recomputed"
        );
        Ok(streak)
    }

    /// Current streak across all of the user's habits as of `today`
    ///
    /// A day counts when any habit entry was logged on it.
    pub async fn user_streak(&self, user_id: UserId, today: DayKey) -> Result<u32, CalendarError> {
        let lookback = self.lookback(today);
        let entries = self
            .store
            .habit_entries_in_range(user_id, lookback.first_day, lookback.last_day)
            .await?;

        let days: BTreeSet<DayKey> = entries.iter().map(|logged| logged.entry.date).collect();
        Ok(current_streak(&days, today))
    }
}

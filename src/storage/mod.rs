/// Storage layer for persisting MonkPoint data
///
/// This module defines the datastore interface the analytics layer depends
/// on and its SQLite implementation. The interface is a trait so request
/// handlers can be driven against fakes in tests.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    DayKey, Goal, GoalId, GoalStatus, Habit, HabitEntry, HabitId, LoggedHabitEntry, MoodEntry,
    Streak, User, UserId,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("No entry for habit {habit_id} on {date}")]
    EntryNotFound { habit_id: String, date: String },

    #[error("Goal not found: {goal_id}")]
    GoalNotFound { goal_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Outcome of logging a habit entry for a day
#[derive(Debug, Clone, PartialEq)]
pub enum EntryUpsert {
    /// No entry existed for that (habit, day)
    Created(HabitEntry),
    /// The existing entry for that (habit, day) was updated in place
    Updated(HabitEntry),
}

impl EntryUpsert {
    pub fn entry(&self) -> &HabitEntry {
        match self {
            EntryUpsert::Created(entry) | EntryUpsert::Updated(entry) => entry,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, EntryUpsert::Created(_))
    }
}

/// Computes the new streak row from the stored one and the active days
/// since the lookback start
pub type StreakUpdate<'a> = &'a (dyn Fn(Option<&Streak>, &BTreeSet<DayKey>) -> Streak + Send + Sync);

/// Datastore interface consumed by the analytics layer and the tools
///
/// Habits, moods and goals are independent read-only collections, so the
/// range reads may be awaited concurrently. The only write the core cares
/// about is `update_streak_atomically`, which implementations must run under
/// a lock or transaction covering the (user, habit) streak row.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), StorageError>;

    async fn get_user(&self, user_id: UserId) -> Result<User, StorageError>;

    async fn find_user_by_name(&self, display_name: &str) -> Result<Option<User>, StorageError>;

    async fn update_user_timezone(&self, user_id: UserId, timezone: &str) -> Result<(), StorageError>;

    /// Create a habit together with its zeroed streak row
    async fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    async fn get_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<Habit, StorageError>;

    async fn list_habits(&self, user_id: UserId, active_only: bool) -> Result<Vec<Habit>, StorageError>;

    /// Insert the entry, or update the one already logged for the same (habit, day)
    async fn upsert_habit_entry(&self, entry: &HabitEntry) -> Result<EntryUpsert, StorageError>;

    /// Remove the entry logged for (habit, day) and return it
    async fn delete_habit_entry(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        day: DayKey,
    ) -> Result<HabitEntry, StorageError>;

    /// Habit entries whose day lies in `[first_day, last_day]`, joined with habit metadata
    async fn habit_entries_in_range(
        &self,
        user_id: UserId,
        first_day: DayKey,
        last_day: DayKey,
    ) -> Result<Vec<LoggedHabitEntry>, StorageError>;

    /// Insert the mood, or update the one already logged for the same (user, day)
    async fn upsert_mood(&self, mood: &MoodEntry) -> Result<MoodEntry, StorageError>;

    async fn mood_entries_in_range(
        &self,
        user_id: UserId,
        first_day: DayKey,
        last_day: DayKey,
    ) -> Result<Vec<MoodEntry>, StorageError>;

    async fn create_goal(&self, goal: &Goal) -> Result<(), StorageError>;

    async fn get_goal(&self, user_id: UserId, goal_id: GoalId) -> Result<Goal, StorageError>;

    async fn update_goal(&self, goal: &Goal) -> Result<(), StorageError>;

    /// Goals whose `created_at` lies in `[start, end]`
    async fn goals_created_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Goal>, StorageError>;

    async fn goals_with_status(&self, user_id: UserId, status: GoalStatus) -> Result<Vec<Goal>, StorageError>;

    async fn get_streak(&self, user_id: UserId, habit_id: HabitId) -> Result<Option<Streak>, StorageError>;

    async fn streaks_for_user(&self, user_id: UserId) -> Result<Vec<Streak>, StorageError>;

    /// Read the stored streak and the habit's active days since `since`,
    /// compute the new row with `update`, and upsert it, all under one
    /// lock/transaction on the (user, habit) row
    async fn update_streak_atomically(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        since: DayKey,
        update: StreakUpdate<'_>,
    ) -> Result<Streak, StorageError>;
}

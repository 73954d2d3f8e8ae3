/// SQLite implementation of the activity store
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving users, habits, entries, moods, goals and streaks. It
/// handles all SQL queries and row conversion.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::domain::{
    DayKey, EntryId, Goal, GoalId, GoalStatus, Habit, HabitEntry, HabitId, LoggedHabitEntry,
    MoodEntry, MoodId, Streak, User, UserId,
};
use crate::storage::{migrations, ActivityStore, EntryUpsert, StorageError, StreakUpdate};

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so the store can be shared across
/// tasks. Every trait method takes the lock once and never awaits while
/// holding it.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// In-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("Database lock poisoned".to_string()))
    }
}

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, category, unit, target_value, created_at, is_active";

const MOOD_COLUMNS: &str = "id, user_id, date, rating, notes, tags, created_at";

const GOAL_COLUMNS: &str =
    "id, user_id, title, description, current_value, target_value, unit, status, created_at";

const STREAK_COLUMNS: &str = "user_id, habit_id, current, longest, last_date";

/// Timestamps are stored as fixed-width RFC 3339 text so string order is time order
fn timestamp_to_sql(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn invalid_column(idx: usize, what: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, what.to_string(), Type::Text)
}

fn uuid_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl FnOnce(&str) -> Result<T, uuid::Error>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|_| invalid_column(idx, "Invalid UUID"))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_column(idx, "Invalid datetime"))
}

fn day_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DayKey> {
    let raw: String = row.get(idx)?;
    DayKey::parse(&raw).ok_or_else(|| invalid_column(idx, "Invalid date"))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_column(row, 0, UserId::from_string)?,
        display_name: row.get(1)?,
        timezone: row.get(2)?,
        created_at: timestamp_column(row, 3)?,
    })
}

fn row_to_habit(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: uuid_column(row, 0, HabitId::from_string)?,
        user_id: uuid_column(row, 1, UserId::from_string)?,
        name: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        unit: row.get(5)?,
        target_value: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
        is_active: row.get(8)?,
    })
}

/// Maps `SELECT e.id, e.habit_id, e.user_id, e.date, e.value, e.notes, e.mood, e.created_at`
fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<HabitEntry> {
    Ok(HabitEntry {
        id: uuid_column(row, 0, EntryId::from_string)?,
        habit_id: uuid_column(row, 1, HabitId::from_string)?,
        user_id: uuid_column(row, 2, UserId::from_string)?,
        date: day_column(row, 3)?,
        value: row.get(4)?,
        notes: row.get(5)?,
        mood: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
    })
}

fn row_to_mood(row: &Row<'_>) -> rusqlite::Result<MoodEntry> {
    let tags_json: String = row.get(5)?;
    let tags: BTreeSet<String> =
        serde_json::from_str(&tags_json).map_err(|_| invalid_column(5, "Invalid tags"))?;

    Ok(MoodEntry {
        id: uuid_column(row, 0, MoodId::from_string)?,
        user_id: uuid_column(row, 1, UserId::from_string)?,
        date: day_column(row, 2)?,
        rating: row.get(3)?,
        notes: row.get(4)?,
        tags,
        created_at: timestamp_column(row, 6)?,
    })
}

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let status_str: String = row.get(7)?;
    let status = GoalStatus::parse(&status_str).ok_or_else(|| invalid_column(7, "Invalid goal status"))?;

    Ok(Goal {
        id: uuid_column(row, 0, GoalId::from_string)?,
        user_id: uuid_column(row, 1, UserId::from_string)?,
        title: row.get(2)?,
        description: row.get(3)?,
        current_value: row.get(4)?,
        target_value: row.get(5)?,
        unit: row.get(6)?,
        status,
        created_at: timestamp_column(row, 8)?,
    })
}

fn row_to_streak(row: &Row<'_>) -> rusqlite::Result<Streak> {
    let last_date: Option<String> = row.get(4)?;
    let last_date = match last_date {
        Some(raw) => Some(DayKey::parse(&raw).ok_or_else(|| invalid_column(4, "Invalid date"))?),
        None => None,
    };

    Ok(Streak {
        user_id: uuid_column(row, 0, UserId::from_string)?,
        habit_id: uuid_column(row, 1, HabitId::from_string)?,
        current: row.get(2)?,
        longest: row.get(3)?,
        last_date,
    })
}

fn write_streak(conn: &Connection, streak: &Streak) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO streaks (user_id, habit_id, current, longest, last_date, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id, habit_id) DO UPDATE SET
            current = excluded.current,
            longest = excluded.longest,
            last_date = excluded.last_date,
            updated_at = excluded.updated_at",
        params![
            streak.user_id.to_string(),
            streak.habit_id.to_string(),
            streak.current,
            streak.longest,
            streak.last_date.map(|d| d.to_string()),
            timestamp_to_sql(&Utc::now()),
        ],
    )?;
    Ok(())
}

fn read_streak(conn: &Connection, user_id: UserId, habit_id: HabitId) -> Result<Option<Streak>, StorageError> {
    let streak = conn
        .query_row(
            &format!("SELECT {} FROM streaks WHERE user_id = ?1 AND habit_id = ?2", STREAK_COLUMNS),
            params![user_id.to_string(), habit_id.to_string()],
            row_to_streak,
        )
        .optional()?;
    Ok(streak)
}

#[async_trait]
impl ActivityStore for SqliteStorage {
    async fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (id, display_name, timezone, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.to_string(),
                user.display_name,
                user.timezone,
                timestamp_to_sql(&user.created_at),
            ],
        )?;

        tracing::debug!("Created user: {} ({})", user.display_name, user.id);
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, StorageError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, display_name, timezone, created_at FROM users WHERE id = ?1",
            params![user_id.to_string()],
            row_to_user,
        )
        .optional()?
        .ok_or_else(|| StorageError::UserNotFound {
            user_id: user_id.to_string(),
        })
    }

    async fn find_user_by_name(&self, display_name: &str) -> Result<Option<User>, StorageError> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                "SELECT id, display_name, timezone, created_at FROM users WHERE display_name = ?1",
                params![display_name],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    async fn update_user_timezone(&self, user_id: UserId, timezone: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let rows_affected = conn.execute(
            "UPDATE users SET timezone = ?2 WHERE id = ?1",
            params![user_id.to_string(), timezone],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }
        Ok(())
    }

    async fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            &format!("INSERT INTO habits ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", HABIT_COLUMNS),
            params![
                habit.id.to_string(),
                habit.user_id.to_string(),
                habit.name,
                habit.description,
                habit.category,
                habit.unit,
                habit.target_value,
                timestamp_to_sql(&habit.created_at),
                habit.is_active,
            ],
        )?;
        write_streak(&tx, &Streak::new(habit.user_id, habit.id))?;
        tx.commit()?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    async fn get_habit(&self, user_id: UserId, habit_id: HabitId) -> Result<Habit, StorageError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2", HABIT_COLUMNS),
            params![habit_id.to_string(), user_id.to_string()],
            row_to_habit,
        )
        .optional()?
        .ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
    }

    async fn list_habits(&self, user_id: UserId, active_only: bool) -> Result<Vec<Habit>, StorageError> {
        let mut sql = format!("SELECT {} FROM habits WHERE user_id = ?1", HABIT_COLUMNS);
        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let habits = stmt
            .query_map(params![user_id.to_string()], row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    async fn upsert_habit_entry(&self, entry: &HabitEntry) -> Result<EntryUpsert, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existed = tx
            .query_row(
                "SELECT 1 FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
                params![entry.habit_id.to_string(), entry.date.to_string()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        tx.execute(
            "INSERT INTO habit_entries (id, habit_id, user_id, date, value, notes, mood, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(habit_id, date) DO UPDATE SET
                value = excluded.value,
                notes = excluded.notes,
                mood = excluded.mood",
            params![
                entry.id.to_string(),
                entry.habit_id.to_string(),
                entry.user_id.to_string(),
                entry.date.to_string(),
                entry.value,
                entry.notes,
                entry.mood,
                timestamp_to_sql(&entry.created_at),
            ],
        )?;

        let stored = tx.query_row(
            "SELECT id, habit_id, user_id, date, value, notes, mood, created_at
             FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
            params![entry.habit_id.to_string(), entry.date.to_string()],
            row_to_entry,
        )?;
        tx.commit()?;

        tracing::debug!(
            "{} habit entry {} for habit {} on {}",
            if existed { "Updated" } else { "Created" },
            stored.id,
            stored.habit_id,
            stored.date
        );

        Ok(if existed {
            EntryUpsert::Updated(stored)
        } else {
            EntryUpsert::Created(stored)
        })
    }

    async fn delete_habit_entry(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        day: DayKey,
    ) -> Result<HabitEntry, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let entry = tx
            .query_row(
                "SELECT id, habit_id, user_id, date, value, notes, mood, created_at
                 FROM habit_entries WHERE user_id = ?1 AND habit_id = ?2 AND date = ?3",
                params![user_id.to_string(), habit_id.to_string(), day.to_string()],
                row_to_entry,
            )
            .optional()?
            .ok_or_else(|| StorageError::EntryNotFound {
                habit_id: habit_id.to_string(),
                date: day.to_string(),
            })?;

        tx.execute(
            "DELETE FROM habit_entries WHERE id = ?1",
            params![entry.id.to_string()],
        )?;
        tx.commit()?;

        tracing::debug!("Deleted habit entry {} for habit {} on {}", entry.id, habit_id, day);
        Ok(entry)
    }

    async fn habit_entries_in_range(
        &self,
        user_id: UserId,
        first_day: DayKey,
        last_day: DayKey,
    ) -> Result<Vec<LoggedHabitEntry>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT e.id, e.habit_id, e.user_id, e.date, e.value, e.notes, e.mood, e.created_at,
                    h.name, h.unit
             FROM habit_entries e
             JOIN habits h ON h.id = e.habit_id
             WHERE e.user_id = ?1 AND e.date BETWEEN ?2 AND ?3
             ORDER BY e.date ASC, e.created_at ASC",
        )?;

        let entries = stmt
            .query_map(
                params![user_id.to_string(), first_day.to_string(), last_day.to_string()],
                |row| {
                    Ok(LoggedHabitEntry {
                        entry: row_to_entry(row)?,
                        habit_name: row.get(8)?,
                        habit_unit: row.get(9)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn upsert_mood(&self, mood: &MoodEntry) -> Result<MoodEntry, StorageError> {
        let tags_json = serde_json::to_string(&mood.tags)?;
        let conn = self.lock()?;

        conn.execute(
            &format!(
                "INSERT INTO moods ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id, date) DO UPDATE SET
                    rating = excluded.rating,
                    notes = excluded.notes,
                    tags = excluded.tags",
                MOOD_COLUMNS
            ),
            params![
                mood.id.to_string(),
                mood.user_id.to_string(),
                mood.date.to_string(),
                mood.rating,
                mood.notes,
                tags_json,
                timestamp_to_sql(&mood.created_at),
            ],
        )?;

        let stored = conn.query_row(
            &format!("SELECT {} FROM moods WHERE user_id = ?1 AND date = ?2", MOOD_COLUMNS),
            params![mood.user_id.to_string(), mood.date.to_string()],
            row_to_mood,
        )?;

        tracing::debug!("Logged mood {} for {}", stored.rating, stored.date);
        Ok(stored)
    }

    async fn mood_entries_in_range(
        &self,
        user_id: UserId,
        first_day: DayKey,
        last_day: DayKey,
    ) -> Result<Vec<MoodEntry>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM moods WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 ORDER BY date ASC",
            MOOD_COLUMNS
        ))?;

        let moods = stmt
            .query_map(
                params![user_id.to_string(), first_day.to_string(), last_day.to_string()],
                row_to_mood,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(moods)
    }

    async fn create_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO goals ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)", GOAL_COLUMNS),
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.title,
                goal.description,
                goal.current_value,
                goal.target_value,
                goal.unit,
                goal.status.as_str(),
                timestamp_to_sql(&goal.created_at),
            ],
        )?;

        tracing::debug!("Created goal: {} ({})", goal.title, goal.id);
        Ok(())
    }

    async fn get_goal(&self, user_id: UserId, goal_id: GoalId) -> Result<Goal, StorageError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM goals WHERE id = ?1 AND user_id = ?2", GOAL_COLUMNS),
            params![goal_id.to_string(), user_id.to_string()],
            row_to_goal,
        )
        .optional()?
        .ok_or_else(|| StorageError::GoalNotFound {
            goal_id: goal_id.to_string(),
        })
    }

    async fn update_goal(&self, goal: &Goal) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let rows_affected = conn.execute(
            "UPDATE goals SET
                title = ?3,
                description = ?4,
                current_value = ?5,
                target_value = ?6,
                unit = ?7,
                status = ?8
             WHERE id = ?1 AND user_id = ?2",
            params![
                goal.id.to_string(),
                goal.user_id.to_string(),
                goal.title,
                goal.description,
                goal.current_value,
                goal.target_value,
                goal.unit,
                goal.status.as_str(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::GoalNotFound {
                goal_id: goal.id.to_string(),
            });
        }

        tracing::debug!("Updated goal: {} ({})", goal.title, goal.id);
        Ok(())
    }

    async fn goals_created_between(
        &self,
        user_id: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Goal>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ?1 AND created_at BETWEEN ?2 AND ?3
             ORDER BY created_at ASC",
            GOAL_COLUMNS
        ))?;

        let goals = stmt
            .query_map(
                params![user_id.to_string(), timestamp_to_sql(&start), timestamp_to_sql(&end)],
                row_to_goal,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    async fn goals_with_status(&self, user_id: UserId, status: GoalStatus) -> Result<Vec<Goal>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ?1 AND status = ?2 ORDER BY created_at DESC",
            GOAL_COLUMNS
        ))?;

        let goals = stmt
            .query_map(params![user_id.to_string(), status.as_str()], row_to_goal)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    async fn get_streak(&self, user_id: UserId, habit_id: HabitId) -> Result<Option<Streak>, StorageError> {
        let conn = self.lock()?;
        read_streak(&conn, user_id, habit_id)
    }

    async fn streaks_for_user(&self, user_id: UserId) -> Result<Vec<Streak>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM streaks WHERE user_id = ?1 ORDER BY current DESC, longest DESC",
            STREAK_COLUMNS
        ))?;

        let streaks = stmt
            .query_map(params![user_id.to_string()], row_to_streak)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(streaks)
    }

    async fn update_streak_atomically(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        since: DayKey,
        update: StreakUpdate<'_>,
    ) -> Result<Streak, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous = read_streak(&tx, user_id, habit_id)?;

        let active_days = {
            let mut stmt = tx.prepare(
                "SELECT DISTINCT date FROM habit_entries
                 WHERE user_id = ?1 AND habit_id = ?2 AND date >= ?3",
            )?;
            let days = stmt
                .query_map(
                    params![user_id.to_string(), habit_id.to_string(), since.to_string()],
                    |row| day_column(row, 0),
                )?
                .collect::<Result<BTreeSet<_>, _>>()?;
            days
        };

        let streak = update(previous.as_ref(), &active_days);
        write_streak(&tx, &streak)?;
        tx.commit()?;

        tracing::debug!(
            "Updated streak for habit {}: current {}, longest {}",
            habit_id,
            streak.current,
            streak.longest
        );
        Ok(streak)
    }
}

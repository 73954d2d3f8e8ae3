/// HabitEntry entity for tracking habit completions
///
/// A HabitEntry records that a habit was done on a specific calendar day,
/// with an optional value, mood score and notes.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DayKey, EntryId, HabitId, UserId, DomainError};

/// A record of doing a habit on one calendar day
///
/// There is at most one entry per (habit, day); logging the same day again
/// updates the existing entry instead of creating a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Which habit this entry is for
    pub habit_id: HabitId,
    /// Owner of the habit
    pub user_id: UserId,
    /// The calendar day (in the user's timezone) this entry counts for
    pub date: DayKey,
    /// Amount achieved (if the habit is measured)
    pub value: Option<f64>,
    /// User's notes about this day
    pub notes: Option<String>,
    /// Optional mood score 1-10 attached to the entry
    pub mood: Option<u8>,
    /// When this entry was first logged
    pub created_at: DateTime<Utc>,
}

impl HabitEntry {
    /// Create a new habit entry with validation
    pub fn new(
        habit_id: HabitId,
        user_id: UserId,
        date: DayKey,
        value: Option<f64>,
        notes: Option<String>,
        mood: Option<u8>,
    ) -> Result<Self, DomainError> {
        Self::validate_value(&value)?;
        Self::validate_notes(&notes)?;
        Self::validate_mood(&mood)?;

        Ok(Self {
            id: EntryId::new(),
            habit_id,
            user_id,
            date,
            value,
            notes,
            mood,
            created_at: Utc::now(),
        })
    }

    /// Check if this entry has non-empty notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    fn validate_value(value: &Option<f64>) -> Result<(), DomainError> {
        if let Some(val) = value {
            if !val.is_finite() || *val < 0.0 {
                return Err(DomainError::InvalidValue {
                    message: "Value must be a non-negative number".to_string()
                });
            }
            if *val > 1_000_000.0 {
                return Err(DomainError::InvalidValue {
                    message: "Value cannot exceed 1000000".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.chars().count() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }

    fn validate_mood(mood: &Option<u8>) -> Result<(), DomainError> {
        if let Some(score) = mood {
            if !(1..=10).contains(score) {
                return Err(DomainError::InvalidValue {
                    message: "Mood must be between 1 and 10".to_string()
                });
            }
        }
        Ok(())
    }
}

/// A habit entry joined with the habit metadata the calendar displays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedHabitEntry {
    pub entry: HabitEntry,
    pub habit_name: String,
    pub habit_unit: Option<String>,
}

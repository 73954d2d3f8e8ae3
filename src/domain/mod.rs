/// Domain module containing core business logic and data types
///
/// This module defines the core entities (User, Habit, HabitEntry, MoodEntry,
/// Goal, Streak), the canonical calendar-day key, and their validation rules.

pub mod day;
pub mod entry;
pub mod goal;
pub mod habit;
pub mod mood;
pub mod streak;
pub mod types;
pub mod user;

// Re-export public types for easy access
pub use day::*;
pub use entry::*;
pub use goal::*;
pub use habit::*;
pub use mood::*;
pub use streak::*;
pub use types::*;
pub use user::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}

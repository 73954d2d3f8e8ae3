/// Mood entries: one rating per user per calendar day

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DayKey, DomainError, MoodId, UserId};

/// A daily mood rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: MoodId,
    pub user_id: UserId,
    /// Calendar day in the user's timezone
    pub date: DayKey,
    /// Rating from 1 (terrible) to 10 (excellent)
    pub rating: u8,
    pub notes: Option<String>,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(
        user_id: UserId,
        date: DayKey,
        rating: u8,
        notes: Option<String>,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<Self, DomainError> {
        if !(1..=10).contains(&rating) {
            return Err(DomainError::InvalidValue {
                message: format!("Mood rating must be between 1 and 10, got {}", rating),
            });
        }
        if notes.as_deref().is_some_and(|n| n.chars().count() > 500) {
            return Err(DomainError::InvalidValue {
                message: "Mood notes cannot be longer than 500 characters".to_string(),
            });
        }

        let tags = tags
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            id: MoodId::new(),
            user_id,
            date,
            rating,
            notes,
            tags,
            created_at: Utc::now(),
        })
    }

    /// Label shown in calendar activity lists
    pub fn display_label(&self) -> String {
        match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => format!("Mood: {}", notes),
            _ => "Mood".to_string(),
        }
    }

    /// One-word description of the rating
    pub fn description(&self) -> &'static str {
        match self.rating {
            9..=10 => "Excellent",
            7..=8 => "Good",
            5..=6 => "Okay",
            3..=4 => "Not great",
            _ => "Terrible",
        }
    }
}

/// Goals with numeric progress toward an optional target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, GoalId, GoalStatus, UserId};

/// A user goal
///
/// For calendar purposes a goal is an event on the day it was created. Later
/// progress updates do not move it to other days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub current_value: f64,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        user_id: UserId,
        title: String,
        description: Option<String>,
        target_value: Option<f64>,
        unit: Option<String>,
    ) -> Result<Self, DomainError> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::Validation {
                message: "Goal title cannot be empty".to_string(),
            });
        }
        if title.chars().count() > 200 {
            return Err(DomainError::Validation {
                message: "Goal title cannot be longer than 200 characters".to_string(),
            });
        }
        if let Some(target) = target_value {
            if !target.is_finite() || target <= 0.0 {
                return Err(DomainError::InvalidValue {
                    message: "Goal target must be greater than 0".to_string(),
                });
            }
        }

        Ok(Self {
            id: GoalId::new(),
            user_id,
            title,
            description,
            current_value: 0.0,
            target_value,
            unit,
            status: GoalStatus::Active,
            created_at: Utc::now(),
        })
    }

    /// Progress as a whole percentage, clamped to 0..=100
    pub fn progress(&self) -> u32 {
        let raw = match self.target_value {
            Some(target) if target > 0.0 => self.current_value / target * 100.0,
            _ => self.current_value,
        };
        if raw.is_finite() {
            raw.round().clamp(0.0, 100.0) as u32
        } else {
            0
        }
    }

    /// Set the current value; reaching the target completes an active goal
    pub fn record_progress(&mut self, current_value: f64) -> Result<(), DomainError> {
        if !current_value.is_finite() || current_value < 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Goal progress must be a non-negative number".to_string(),
            });
        }
        self.current_value = current_value;
        if self.status == GoalStatus::Active
            && self.target_value.is_some_and(|t| current_value >= t)
        {
            self.status = GoalStatus::Completed;
        }
        Ok(())
    }
}

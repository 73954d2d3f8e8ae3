/// Habits a user logs against calendar days

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, HabitId, UserId};

const MAX_NAME_CHARS: usize = 100;
const MAX_DESCRIPTION_CHARS: usize = 500;
const MAX_UNIT_CHARS: usize = 20;

/// A habit owned by one user
///
/// Carries the display metadata (name, unit) the calendar attaches to each
/// logged entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    /// Display name, e.g. "Read"
    pub name: String,
    pub description: Option<String>,
    /// Free-form grouping label
    pub category: Option<String>,
    /// Unit of logged values, e.g. "pages"
    pub unit: Option<String>,
    /// Daily target in `unit`
    pub target_value: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Inactive habits are kept for history but not scheduled
    pub is_active: bool,
}

impl Habit {
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        category: Option<String>,
        unit: Option<String>,
        target_value: Option<f64>,
    ) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
            return Err(DomainError::InvalidHabitName(format!(
                "name must be 1 to {} characters",
                MAX_NAME_CHARS
            )));
        }

        if description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_CHARS)
        {
            return Err(DomainError::Validation {
                message: format!("description is limited to {} characters", MAX_DESCRIPTION_CHARS),
            });
        }

        let unit = unit.map(|u| u.trim().to_string());
        if unit
            .as_deref()
            .is_some_and(|u| u.is_empty() || u.chars().count() > MAX_UNIT_CHARS)
        {
            return Err(DomainError::InvalidValue {
                message: format!("unit must be 1 to {} characters when given", MAX_UNIT_CHARS),
            });
        }

        if target_value.is_some_and(|t| !t.is_finite() || t <= 0.0) {
            return Err(DomainError::InvalidValue {
                message: "target must be a positive number".to_string(),
            });
        }

        Ok(Self {
            id: HabitId::new(),
            user_id,
            name,
            description,
            category: category.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            unit,
            target_value,
            created_at: Utc::now(),
            is_active: true,
        })
    }

    /// Target with its unit, e.g. "30 minutes"
    pub fn target_display(&self) -> Option<String> {
        let target = self.target_value?;
        Some(match &self.unit {
            Some(unit) => format!("{} {}", target, unit),
            None => target.to_string(),
        })
    }
}

/// The local user profile every operation runs for

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    /// IANA timezone identifier used to resolve calendar days
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(display_name: String, timezone: String) -> Self {
        Self {
            id: UserId::new(),
            display_name,
            timezone,
            created_at: Utc::now(),
        }
    }
}

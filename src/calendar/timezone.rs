/// Timezone identifier resolution

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calendar::CalendarError;

/// What to do with an unknown timezone identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimezonePolicy {
    /// Fail the request with `InvalidTimezone`
    #[default]
    Reject,
    /// Use UTC, log a warning and flag the payload
    FallbackToUtc,
}

/// A parsed timezone plus whether it is a fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTimezone {
    pub tz: Tz,
    /// True when the requested identifier was unknown and UTC was substituted
    pub fell_back: bool,
}

impl ResolvedTimezone {
    pub fn exact(tz: Tz) -> Self {
        Self { tz, fell_back: false }
    }

    pub fn name(&self) -> &'static str {
        self.tz.name()
    }
}

/// Parse an IANA timezone identifier according to `policy`
pub fn resolve_timezone(name: &str, policy: TimezonePolicy) -> Result<ResolvedTimezone, CalendarError> {
    let trimmed = name.trim();
    match trimmed.parse::<Tz>() {
        Ok(tz) if !trimmed.is_empty() => Ok(ResolvedTimezone::exact(tz)),
        _ => match policy {
            TimezonePolicy::Reject => Err(CalendarError::InvalidTimezone(name.to_string())),
            TimezonePolicy::FallbackToUtc => {
                warn!(timezone = %trimmed, "unknown timezone id, falling back to UTC");
                Ok(ResolvedTimezone {
                    tz: chrono_tz::UTC,
                    fell_back: true,
                })
            }
        },
    }
}

/// Query windows for day, week and month views

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::calendar::{CalendarError, ViewKind, WeekStart};
use crate::domain::DayKey;

/// An inclusive range of calendar days in one timezone, plus the UTC
/// instants bounding it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub timezone: Tz,
    pub first_day: DayKey,
    pub last_day: DayKey,
    /// Local midnight of `first_day`
    pub start: DateTime<Utc>,
    /// Local 23:59:59.999 of `last_day`
    pub end: DateTime<Utc>,
}

/// Resolve the window containing `reference` for the given view
pub fn resolve_window(reference: &DateTime<Utc>, view: ViewKind, tz: Tz) -> Result<Window, CalendarError> {
    Window::for_day(DayKey::from_instant(reference, &tz), view, tz)
}

impl Window {
    /// Window for `view` around an already-resolved calendar day
    pub fn for_day(day: DayKey, view: ViewKind, tz: Tz) -> Result<Self, CalendarError> {
        match view {
            ViewKind::Day => Self::range(day, day, tz),
            ViewKind::Week => Self::week_starting(day, WeekStart::Sunday, tz),
            ViewKind::Month => {
                let first = day.first_of_month();
                let last = first
                    .last_of_month()
                    .ok_or_else(|| CalendarError::InvalidDate(day.to_string()))?;
                Self::range(first, last, tz)
            }
        }
    }

    /// The 7-day week containing `day`, starting on `week_start`
    pub fn week_starting(day: DayKey, week_start: WeekStart, tz: Tz) -> Result<Self, CalendarError> {
        let back = match week_start {
            WeekStart::Sunday => day.date().weekday().num_days_from_sunday(),
            WeekStart::Monday => day.date().weekday().num_days_from_monday(),
        };
        let first = day
            .offset(-i64::from(back))
            .ok_or_else(|| CalendarError::InvalidDate(day.to_string()))?;
        let last = first
            .offset(6)
            .ok_or_else(|| CalendarError::InvalidDate(day.to_string()))?;
        Self::range(first, last, tz)
    }

    /// Arbitrary inclusive day range; fails when `last` precedes `first`
    pub fn range(first_day: DayKey, last_day: DayKey, tz: Tz) -> Result<Self, CalendarError> {
        if last_day < first_day {
            return Err(CalendarError::range(first_day, last_day));
        }
        let end = last_day
            .end_instant(&tz)
            .ok_or_else(|| CalendarError::InvalidDate(last_day.to_string()))?;
        let start = first_day.start_instant(&tz);
        // A range made only of skipped local days has no instants at all.
        if end < start {
            return Err(CalendarError::range(first_day, last_day));
        }

        Ok(Self {
            timezone: tz,
            first_day,
            last_day,
            start,
            end,
        })
    }

    pub fn contains_day(&self, day: DayKey) -> bool {
        day >= self.first_day && day <= self.last_day
    }

    pub fn contains_instant(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }

    /// Inclusive number of calendar days, independent of DST
    pub fn total_days(&self) -> u32 {
        let span = self.first_day.days_until(self.last_day) + 1;
        u32::try_from(span).unwrap_or(0)
    }

    /// Every day of the window, in order
    pub fn days(&self) -> impl Iterator<Item = DayKey> + '_ {
        (0..i64::from(self.total_days())).filter_map(move |offset| self.first_day.offset(offset))
    }
}

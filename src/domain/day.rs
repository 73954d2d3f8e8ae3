/// Canonical calendar-day key
///
/// A `DayKey` is a plain (year, month, day) date that has already been
/// resolved in the user's timezone. Every component keys activity by this
/// type; full timestamps are never compared for day-equality.

use std::fmt;

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Date format used on the wire and in the database
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar day in a specific (already applied) timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The calendar day `instant` falls on when viewed from `tz`
    pub fn from_instant(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        Self(instant.with_timezone(tz).date_naive())
    }

    /// Parse a `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT).ok().map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Day of week counted from Sunday (Sunday = 0 .. Saturday = 6)
    pub fn weekday_from_sunday(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// Short English weekday name ("Sun", "Mon", ...)
    pub fn short_weekday_name(&self) -> String {
        self.0.format("%a").to_string()
    }

    pub fn pred(&self) -> Option<Self> {
        self.0.checked_sub_days(Days::new(1)).map(Self)
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(Self)
    }

    /// Shift by a signed number of days
    pub fn offset(&self, days: i64) -> Option<Self> {
        let shifted = if days >= 0 {
            self.0.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        shifted.map(Self)
    }

    /// Signed number of calendar days from `self` to `other`
    pub fn days_until(&self, other: DayKey) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Whether `other` is exactly the next calendar day
    pub fn is_followed_by(&self, other: DayKey) -> bool {
        self.days_until(other) == 1
    }

    pub fn first_of_month(&self) -> Self {
        // Day 1 exists in every month.
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    /// Last day of this day's month ("day 0 of next month")
    pub fn last_of_month(&self) -> Option<Self> {
        let first = self.first_of_month().0;
        first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .map(Self)
    }

    /// Local midnight of this day in `tz`, as a UTC instant
    ///
    /// When midnight is ambiguous the earliest mapping wins; when it falls in
    /// a DST gap the first valid local time after it is used.
    pub fn start_instant(&self, tz: &Tz) -> DateTime<Utc> {
        let midnight = self.0.and_time(NaiveTime::MIN);
        match tz.from_local_datetime(&midnight) {
            LocalResult::Single(local) => local.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            LocalResult::None => {
                // Gaps are at most a day long (Pacific/Apia skipped 2011-12-30).
                let mut candidate = midnight;
                for _ in 0..(4 * 48) {
                    candidate += Duration::minutes(15);
                    if let Some(local) = tz.from_local_datetime(&candidate).earliest() {
                        return local.with_timezone(&Utc);
                    }
                }
                let offset = tz.offset_from_utc_datetime(&midnight).fix();
                Utc.from_utc_datetime(&(midnight - Duration::seconds(offset.local_minus_utc() as i64)))
            }
        }
    }

    /// Last millisecond of this day in `tz` (local 23:59:59.999), as a UTC instant
    pub fn end_instant(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        self.succ()
            .map(|next| next.start_instant(tz) - Duration::milliseconds(1))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

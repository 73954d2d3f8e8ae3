/// Unit tests for windows, aggregation, stats and the month grid
use chrono::{Duration, TimeZone, Utc};
use chrono_tz::Tz;

use monkpoint_mcp::calendar::*;
use monkpoint_mcp::{ActivityKind, DayKey, Goal, HabitEntry, HabitId, LoggedHabitEntry, MoodEntry, UserId};

fn day(y: i32, m: u32, d: u32) -> DayKey {
    DayKey::new(y, m, d).unwrap()
}

fn tz(name: &str) -> Tz {
    name.parse().unwrap()
}

fn logged(user: UserId, date: DayKey, hour: u32) -> LoggedHabitEntry {
    let mut entry = HabitEntry::new(HabitId::new(), user, date, Some(1.0), None, None).unwrap();
    entry.created_at = Utc
        .with_ymd_and_hms(date.year(), date.month(), date.day(), hour, 0, 0)
        .unwrap();
    LoggedHabitEntry {
        entry,
        habit_name: "Stretch".to_string(),
        habit_unit: None,
    }
}

#[cfg(test)]
mod window_tests {
    use super::*;

    #[test]
    fn test_month_window_in_new_york() {
        let window = Window::for_day(day(2024, 3, 10), ViewKind::Month, tz("America/New_York")).unwrap();

        assert_eq!(window.first_day, day(2024, 3, 1));
        assert_eq!(window.last_day, day(2024, 3, 31));
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap());
        // April 1 midnight is already on daylight time.
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2024, 4, 1, 4, 0, 0).unwrap() - Duration::milliseconds(1)
        );
        assert_eq!(window.total_days(), 31);
    }

    #[test]
    fn test_week_window_starts_on_sunday() {
        // 2024-01-17 is a Wednesday.
        let window = Window::for_day(day(2024, 1, 17), ViewKind::Week, chrono_tz::UTC).unwrap();
        assert_eq!(window.first_day, day(2024, 1, 14));
        assert_eq!(window.last_day, day(2024, 1, 20));
        assert_eq!(window.days().count(), 7);

        let monday = Window::week_starting(day(2024, 1, 17), WeekStart::Monday, chrono_tz::UTC).unwrap();
        assert_eq!(monday.first_day, day(2024, 1, 15));
        assert_eq!(monday.last_day, day(2024, 1, 21));
    }

    #[test]
    fn test_spring_forward_day_is_23_hours() {
        let window = Window::for_day(day(2024, 3, 10), ViewKind::Day, tz("America/New_York")).unwrap();

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap());
        assert_eq!(window.end - window.start, Duration::hours(23) - Duration::milliseconds(1));
        assert_eq!(window.total_days(), 1);
    }

    #[test]
    fn test_fall_back_day_is_25_hours() {
        let window = Window::for_day(day(2024, 11, 3), ViewKind::Day, tz("America/New_York")).unwrap();
        assert_eq!(window.end - window.start, Duration::hours(25) - Duration::milliseconds(1));
    }

    #[test]
    fn test_reference_instant_resolves_in_timezone() {
        // 03:30 UTC on Feb 1 is still January 31 in Los Angeles.
        let reference = Utc.with_ymd_and_hms(2024, 2, 1, 3, 30, 0).unwrap();
        let window = resolve_window(&reference, ViewKind::Month, tz("America/Los_Angeles")).unwrap();
        assert_eq!(window.first_day, day(2024, 1, 1));

        let utc_window = resolve_window(&reference, ViewKind::Month, chrono_tz::UTC).unwrap();
        assert_eq!(utc_window.first_day, day(2024, 2, 1));
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        let result = Window::range(day(2024, 1, 10), day(2024, 1, 9), chrono_tz::UTC);
        assert!(matches!(result, Err(CalendarError::InvalidDateRange { .. })));
    }

    #[test]
    fn test_invalid_view_and_timezone() {
        assert!(matches!("year".parse::<ViewKind>(), Err(CalendarError::InvalidViewKind(_))));
        assert_eq!("Week".parse::<ViewKind>().unwrap(), ViewKind::Week);

        assert!(matches!(
            resolve_timezone("Mars/Olympus_Mons", TimezonePolicy::Reject),
            Err(CalendarError::InvalidTimezone(_))
        ));

        let fallback = resolve_timezone("Mars/Olympus_Mons", TimezonePolicy::FallbackToUtc).unwrap();
        assert!(fallback.fell_back);
        assert_eq!(fallback.name(), "UTC");

        let exact = resolve_timezone("Asia/Tokyo", TimezonePolicy::Reject).unwrap();
        assert!(!exact.fell_back);
    }
}

#[cfg(test)]
mod aggregate_tests {
    use super::*;

    #[test]
    fn test_goal_day_follows_window_timezone() {
        let user = UserId::new();
        let mut goal = Goal::new(user, "Run a 10k".to_string(), None, None, None).unwrap();
        goal.created_at = Utc.with_ymd_and_hms(2024, 1, 31, 16, 0, 0).unwrap();
        let goals = vec![goal];

        let utc = Window::for_day(day(2024, 1, 1), ViewKind::Month, chrono_tz::UTC).unwrap();
        let tokyo = Window::for_day(day(2024, 1, 1), ViewKind::Month, tz("Asia/Tokyo")).unwrap();

        assert_eq!(per_day_counts(&aggregate(&utc, &[], &[], &goals)).get(&day(2024, 1, 31)), Some(&1));
        // Already February 1 in Tokyo.
        assert!(aggregate(&tokyo, &[], &[], &goals).is_empty());
    }

    #[test]
    fn test_records_are_ordered_within_a_day() {
        let user = UserId::new();
        let window = Window::for_day(day(2024, 1, 15), ViewKind::Day, chrono_tz::UTC).unwrap();

        let entries = vec![logged(user, day(2024, 1, 15), 18), logged(user, day(2024, 1, 16), 7)];
        let mut mood = MoodEntry::new(user, day(2024, 1, 15), 6, None, Vec::new()).unwrap();
        mood.created_at = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();

        let activity = aggregate(&window, &entries, &[mood], &[]);
        let records = &activity[&day(2024, 1, 15)];

        assert_eq!(activity.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ActivityKind::Mood);
        assert_eq!(records[0].unit.as_deref(), Some(MOOD_UNIT));
        assert_eq!(records[1].kind, ActivityKind::Habit);
    }

    #[test]
    fn test_counts_match_direct_grouping() {
        let user = UserId::new();
        let window = Window::for_day(day(2024, 1, 1), ViewKind::Month, chrono_tz::UTC).unwrap();
        let entries: Vec<_> = [3, 3, 9, 31].iter().map(|d| logged(user, day(2024, 1, *d), 9)).collect();
        let moods = vec![MoodEntry::new(user, day(2024, 1, 9), 8, None, Vec::new()).unwrap()];

        let via_records = per_day_counts(&aggregate(&window, &entries, &moods, &[]));
        let direct = count_rows_by_day(&window, &entries, &moods, &[]);

        assert_eq!(via_records, direct);
        assert_eq!(direct.get(&day(2024, 1, 3)), Some(&2));
        assert_eq!(direct.get(&day(2024, 1, 9)), Some(&2));
    }
}

#[cfg(test)]
mod stats_and_grid_tests {
    use super::*;

    #[test]
    fn test_three_of_seven_days_is_43_percent() {
        let window = Window::range(day(2024, 1, 1), day(2024, 1, 7), chrono_tz::UTC).unwrap();
        let counts: DailyCounts = [(day(2024, 1, 1), 2), (day(2024, 1, 3), 1), (day(2024, 1, 6), 4)]
            .into_iter()
            .collect();

        let stats = compute_stats(&window, &counts);
        assert_eq!(stats.active_days, 3);
        assert_eq!(stats.total_activities, 7);
        assert_eq!(stats.total_days, 7);
        assert_eq!(stats.consistency_pct, 43);
    }

    #[test]
    fn test_consistency_rounding() {
        assert_eq!(consistency_pct(0, 31), 0);
        assert_eq!(consistency_pct(31, 31), 100);
        assert_eq!(consistency_pct(1, 3), 33);
        assert_eq!(consistency_pct(2, 3), 67);
        assert_eq!(consistency_pct(0, 0), 0);
    }

    #[test]
    fn test_grid_for_month_starting_on_sunday() {
        // February 2026 starts on a Sunday and has 28 days.
        let start = day(2026, 2, 1);
        let counts: DailyCounts = [(day(2026, 2, 14), 3)].into_iter().collect();
        let grid = build_month_grid(start, start.last_of_month().unwrap(), &counts).unwrap();
        let cells = grid.cells();

        assert_eq!(cells.len(), GRID_CELLS);
        assert_eq!(cells[0].date, start);
        assert!(cells[0].is_current_month);
        assert_eq!(cells[13].activities, 3);
        assert_eq!(cells[28].date, day(2026, 3, 1));
        assert!(!cells[28].is_current_month);
        assert_eq!(grid.rows().count(), 6);
    }

    #[test]
    fn test_grid_leading_cells_come_from_previous_month() {
        // March 2024 starts on a Friday.
        let start = day(2024, 3, 1);
        let counts: DailyCounts = [(day(2024, 2, 29), 5)].into_iter().collect();
        let grid = build_month_grid(start, start.last_of_month().unwrap(), &counts).unwrap();
        let cells = grid.cells();

        assert_eq!(cells[0].date, day(2024, 2, 25));
        assert_eq!(cells[4].date, day(2024, 2, 29));
        assert_eq!(cells[4].activities, 0);
        assert_eq!(cells[5].date, start);
        assert_eq!(cells.iter().filter(|c| c.is_current_month).count(), 31);
    }

    #[test]
    fn test_grid_rejects_partial_month() {
        let result = build_month_grid(day(2024, 3, 2), day(2024, 3, 31), &DailyCounts::new());
        assert!(result.is_err());
    }
}

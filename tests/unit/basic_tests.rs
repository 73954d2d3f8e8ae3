/// Basic unit tests to verify core domain functionality
use std::collections::BTreeSet;

use monkpoint_mcp::*;

fn day(y: i32, m: u32, d: u32) -> DayKey {
    DayKey::new(y, m, d).unwrap()
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_habit_creation() {
        let user = User::new("Ada".to_string(), "UTC".to_string());
        let habit = Habit::new(
            user.id,
            "  Morning run ".to_string(),
            Some("Around the park".to_string()),
            Some("fitness".to_string()),
            Some("minutes".to_string()),
            Some(30.0),
        )
        .unwrap();

        assert_eq!(habit.name, "Morning run");
        assert_eq!(habit.user_id, user.id);
        assert!(habit.is_active);
    }

    #[test]
    fn test_habit_requires_name() {
        let user = User::new("Ada".to_string(), "UTC".to_string());
        let result = Habit::new(user.id, "   ".to_string(), None, None, None, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_habit_entry_creation() {
        let user = User::new("Ada".to_string(), "UTC".to_string());
        let habit_id = HabitId::new();

        let entry = HabitEntry::new(
            habit_id,
            user.id,
            day(2024, 1, 15),
            Some(20.0),
            Some("Great work!".to_string()),
            Some(8),
        )
        .unwrap();

        assert_eq!(entry.habit_id, habit_id);
        assert_eq!(entry.date, day(2024, 1, 15));
        assert!(entry.has_notes());
    }

    #[test]
    fn test_mood_rating_bounds() {
        let user = User::new("Ada".to_string(), "UTC".to_string());
        assert!(MoodEntry::new(user.id, day(2024, 1, 15), 0, None, Vec::new()).is_err());
        assert!(MoodEntry::new(user.id, day(2024, 1, 15), 11, None, Vec::new()).is_err());

        let mood = MoodEntry::new(
            user.id,
            day(2024, 1, 15),
            7,
            None,
            vec![" Calm ".to_string(), "calm".to_string(), String::new()],
        )
        .unwrap();
        assert_eq!(mood.tags.len(), 1);
        assert!(mood.tags.contains("calm"));
    }

    #[test]
    fn test_goal_without_target_uses_raw_value() {
        let user = User::new("Ada".to_string(), "UTC".to_string());
        let mut goal = Goal::new(user.id, "Meditate more".to_string(), None, None, None).unwrap();

        goal.record_progress(42.4).unwrap();
        assert_eq!(goal.progress(), 42);
        assert_eq!(goal.status, GoalStatus::Active);

        assert!(goal.record_progress(-1.0).is_err());
        assert!(Goal::new(user.id, " ".to_string(), None, None, None).is_err());
    }

    #[test]
    fn test_day_key_parsing() {
        assert_eq!(DayKey::parse("2024-02-29"), Some(day(2024, 2, 29)));
        assert_eq!(DayKey::parse("2023-02-29"), None);
        assert_eq!(DayKey::parse("15/01/2024"), None);
        assert_eq!(day(2024, 1, 5).to_string(), "2024-01-05");
    }

    #[test]
    fn test_current_streak_requires_today() {
        let days: BTreeSet<DayKey> = [day(2024, 1, 13), day(2024, 1, 14), day(2024, 1, 15)]
            .into_iter()
            .collect();

        assert_eq!(current_streak(&days, day(2024, 1, 15)), 3);
        assert_eq!(current_streak(&days, day(2024, 1, 16)), 0);
        assert_eq!(current_streak(&BTreeSet::new(), day(2024, 1, 15)), 0);
    }

    #[test]
    fn test_longest_streak_across_month_boundary() {
        let days = [
            day(2024, 1, 30),
            day(2024, 1, 31),
            day(2024, 2, 1),
            day(2024, 2, 1),
            day(2024, 2, 5),
        ];
        assert_eq!(longest_streak(&days), 3);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_recompute_keeps_previous_longest() {
        let user = UserId::new();
        let habit = HabitId::new();
        let mut previous = Streak::new(user, habit);
        previous.longest = 12;

        let days: BTreeSet<DayKey> = [day(2024, 3, 9), day(2024, 3, 10)].into_iter().collect();
        let streak = Streak::recompute(Some(&previous), user, habit, &days, day(2024, 3, 10));

        assert_eq!(streak.current, 2);
        assert_eq!(streak.longest, 12);
        assert_eq!(streak.last_date, Some(day(2024, 3, 10)));
    }

    #[test]
    fn test_lookback_window() {
        let lookback = LookbackWindow::ending(day(2024, 3, 10), 30);
        assert_eq!(lookback.first_day, day(2024, 2, 10));
        assert!(lookback.contains(day(2024, 2, 10)));
        assert!(!lookback.contains(day(2024, 2, 9)));
        assert!(!lookback.contains(day(2024, 3, 11)));
    }
}

/// Consistency statistics over a window

use serde::Serialize;

use crate::calendar::{DailyCounts, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsistencyStats {
    /// Days in the window with at least one activity
    pub active_days: u32,
    /// Sum of all activity counts in the window
    pub total_activities: u32,
    /// Inclusive number of calendar days in the window
    pub total_days: u32,
    /// round(active_days / total_days * 100), 0 for an empty window
    pub consistency_pct: u32,
}

/// Compute stats for the days of `counts` that fall inside `window`
pub fn compute_stats(window: &Window, counts: &DailyCounts) -> ConsistencyStats {
    let (active_days, total_activities) = counts
        .iter()
        .filter(|(day, _)| window.contains_day(**day))
        .fold((0u32, 0u32), |(active, total), (_, &count)| {
            (active + u32::from(count > 0), total + count)
        });
    let total_days = window.total_days();

    ConsistencyStats {
        active_days,
        total_activities,
        total_days,
        consistency_pct: consistency_pct(active_days, total_days),
    }
}

/// Whole percentage of active days, rounding halves up
pub fn consistency_pct(active_days: u32, total_days: u32) -> u32 {
    if total_days == 0 {
        return 0;
    }
    let active = u64::from(active_days.min(total_days));
    let total = u64::from(total_days);
    ((active * 200 + total) / (total * 2)) as u32
}

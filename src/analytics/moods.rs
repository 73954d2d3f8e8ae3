/// Mood analytics: averages, recent trend, common tags and weekly means

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::{average_mood, AnalyticsEngine, PeriodWindow, DEFAULT_PERIOD_DAYS};
use crate::calendar::{CalendarError, Window};
use crate::domain::{DayKey, MoodEntry, User};
use crate::storage::ActivityStore;

const TREND_ENTRIES: usize = 7;
const TOP_TAGS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodPoint {
    pub date: DayKey,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Mean rating of one 7-day block of the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyMood {
    /// 1 for the block starting on the window's first day
    pub week: u32,
    pub first_day: DayKey,
    pub last_day: DayKey,
    pub entries: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodAnalytics {
    pub period_days: u32,
    pub timezone: String,
    pub window: Window,
    pub average_rating: f64,
    pub total_entries: usize,
    /// The newest moods of the period, oldest first
    pub mood_trend: Vec<MoodPoint>,
    pub common_tags: Vec<TagCount>,
    /// Blocks without any mood are left out
    pub weekly_averages: Vec<WeeklyMood>,
}

impl<S: ActivityStore> AnalyticsEngine<S> {
    pub async fn mood_analytics(&self, user: &User, period_days: Option<u32>) -> Result<MoodAnalytics, CalendarError> {
        self.mood_analytics_at(user, period_days, Utc::now()).await
    }

    pub async fn mood_analytics_at(
        &self,
        user: &User,
        period_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<MoodAnalytics, CalendarError> {
        let period = period_days.unwrap_or(DEFAULT_PERIOD_DAYS);
        let PeriodWindow { resolved, window, .. } = self.period_window(user, period, now)?;

        let mut moods = self
            .store()
            .mood_entries_in_range(user.id, window.first_day, window.last_day)
            .await?;
        moods.sort_by_key(|mood| mood.date);

        let skip = moods.len().saturating_sub(TREND_ENTRIES);
        let mood_trend = moods[skip..]
            .iter()
            .map(|mood| MoodPoint {
                date: mood.date,
                rating: mood.rating,
            })
            .collect();

        Ok(MoodAnalytics {
            period_days: period,
            timezone: resolved.name().to_string(),
            average_rating: average_mood(&moods),
            total_entries: moods.len(),
            mood_trend,
            common_tags: common_tags(&moods, TOP_TAGS),
            weekly_averages: weekly_averages(&window, &moods),
            window,
        })
    }
}

/// The `limit` most used tags, most frequent first and alphabetical on ties
pub fn common_tags(moods: &[MoodEntry], limit: usize) -> Vec<TagCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in moods.iter().flat_map(|mood| &mood.tags) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the alphabetical order among equal counts
    tags.sort_by(|a, b| b.count.cmp(&a.count));
    tags.truncate(limit);
    tags
}

/// Average moods over consecutive 7-day blocks starting on the window's first day
pub fn weekly_averages(window: &Window, moods: &[MoodEntry]) -> Vec<WeeklyMood> {
    let mut blocks: BTreeMap<u32, Vec<MoodEntry>> = BTreeMap::new();
    for mood in moods.iter().filter(|mood| window.contains_day(mood.date)) {
        let index = window.first_day.days_until(mood.date) / 7;
        if let Ok(index) = u32::try_from(index) {
            blocks.entry(index).or_default().push(mood.clone());
        }
    }

    blocks
        .into_iter()
        .filter_map(|(index, block)| {
            let first_day = window.first_day.offset(i64::from(index) * 7)?;
            let last_day = first_day.offset(6).map_or(window.last_day, |d| d.min(window.last_day));
            Some(WeeklyMood {
                week: index + 1,
                first_day,
                last_day,
                entries: block.len(),
                average: average_mood(&block),
            })
        })
        .collect()
}

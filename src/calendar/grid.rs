/// Fixed 6x7 month grid for rendering

use serde::Serialize;

use crate::calendar::{CalendarError, DailyCounts};
use crate::domain::DayKey;

/// Cells in a month grid (6 rows of 7 days, Sunday first)
pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    /// Day of month shown in the cell
    pub day: u32,
    pub date: DayKey,
    pub is_current_month: bool,
    /// Activities on this day; always 0 for spillover days
    pub activities: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MonthGrid {
    cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn cells(&self) -> &[CalendarCell] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

/// Lay out a month as 42 Sunday-first cells
///
/// Leading cells come from the previous month and trailing cells from the
/// next one. Spillover days carry no activity counts.
pub fn build_month_grid(
    month_start: DayKey,
    month_end: DayKey,
    counts: &DailyCounts,
) -> Result<MonthGrid, CalendarError> {
    let is_whole_month = month_start.day() == 1
        && month_start.last_of_month() == Some(month_end);
    if !is_whole_month {
        return Err(CalendarError::range(month_start, month_end));
    }

    let mut cells = Vec::with_capacity(GRID_CELLS);
    let leading = i64::from(month_start.weekday_from_sunday());

    for back in (1..=leading).rev() {
        let date = month_start
            .offset(-back)
            .ok_or_else(|| CalendarError::range(month_start, month_end))?;
        cells.push(spillover(date));
    }

    let mut current = Some(month_start);
    while let Some(date) = current.filter(|d| *d <= month_end) {
        cells.push(CalendarCell {
            day: date.day(),
            date,
            is_current_month: true,
            activities: counts.get(&date).copied().unwrap_or(0),
        });
        current = date.succ();
    }

    let mut ahead = 1;
    while cells.len() < GRID_CELLS {
        let date = month_end
            .offset(ahead)
            .ok_or_else(|| CalendarError::range(month_start, month_end))?;
        cells.push(spillover(date));
        ahead += 1;
    }

    Ok(MonthGrid { cells })
}

fn spillover(date: DayKey) -> CalendarCell {
    CalendarCell {
        day: date.day(),
        date,
        is_current_month: false,
        activities: 0,
    }
}

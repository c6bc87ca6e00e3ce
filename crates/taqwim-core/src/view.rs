//! Derived calendar views, rebuilt from scratch on every change.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::CalendarResult;
use crate::grid::{CalendarDayCell, MonthCursor};
use crate::occasions::OccasionTable;
use crate::projection::project_events;
use crate::recurrence::expand_tasks;
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub cursor: MonthCursor,
    pub title: String,
    pub cells: Vec<CalendarDayCell>,
}

/// Grid, expansion and projection for the displayed month.
#[tracing::instrument(skip(tasks, occasions, today), fields(year = cursor.year, month = cursor.month))]
pub fn build_month_view(
    cursor: MonthCursor,
    tasks: &[Task],
    occasions: &OccasionTable,
    today: NaiveDate,
) -> CalendarResult<MonthView> {
    let mut cells = cursor.grid(today)?;
    // Last visible date.
    let horizon = cells.last().map(CalendarDayCell::date).unwrap_or(today);
    let events = expand_tasks(tasks, horizon);
    project_events(&mut cells, &events, occasions);
    Ok(MonthView {
        cursor,
        title: cursor.title(),
        cells,
    })
}

/// One month of a printable year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSheet {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub cells: Vec<CalendarDayCell>,
}

/// The twelve projected months of `hijri_year`, for the print layer.
#[tracing::instrument(skip(tasks, occasions, today))]
pub fn year_sheet(
    hijri_year: i32,
    tasks: &[Task],
    occasions: &OccasionTable,
    today: NaiveDate,
) -> CalendarResult<Vec<MonthSheet>> {
    let mut sheets = Vec::with_capacity(12);
    for month in 0..12 {
        let cursor = MonthCursor::new(hijri_year, month)?;
        let view = build_month_view(cursor, tasks, occasions, today)?;
        sheets.push(MonthSheet {
            year: hijri_year,
            month,
            month_name: cursor.month_name(),
            cells: view.cells,
        });
    }
    info!(hijri_year, months = sheets.len(), "built year sheet");
    Ok(sheets)
}

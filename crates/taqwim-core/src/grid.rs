use chrono::{
  Datelike,
  Days,
  NaiveDate
};
use serde::Serialize;
use tracing::debug;

use crate::error::{
  CalendarError,
  CalendarResult
};
use crate::event::CalendarEvent;
use crate::hijri::{
  HIJRI_MONTH_NAMES,
  HijriDate,
  from_hijri,
  to_hijri
};

/// Six Sunday-first weeks.
pub const GRID_CELLS: usize = 42;

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct CalendarDayCell {
  pub hijri:              HijriDate,
  pub events:             Vec<CalendarEvent>,
  pub is_in_target_month: bool,
  pub is_today:           bool
}

impl CalendarDayCell {
  pub fn date(&self) -> NaiveDate {
    self.hijri.gregorian
  }
}

/// The 42 cells covering Hijri `hijri_month` (0-indexed) of
/// `hijri_year`, starting on the Sunday on or before the 1st.
#[tracing::instrument(skip(today))]
pub fn generate_month_grid(
  hijri_year: i32,
  hijri_month: u32,
  today: NaiveDate
) -> CalendarResult<Vec<CalendarDayCell>> {
  if hijri_month >= 12 {
    return Err(
      CalendarError::invalid_date(
        format!(
          "hijri month {hijri_month} \
           outside 0..=11"
        )
      )
    );
  }

  let first = from_hijri(
    hijri_year,
    hijri_month as i32,
    1
  )?;
  let lead = first
    .weekday()
    .num_days_from_sunday();
  let start = first
    .checked_sub_days(Days::new(
      u64::from(lead)
    ))
    .ok_or_else(|| {
      CalendarError::invalid_date(
        format!(
          "grid start before {first} is \
           unrepresentable"
        )
      )
    })?;

  let mut cells =
    Vec::with_capacity(GRID_CELLS);
  for date in start
    .iter_days()
    .take(GRID_CELLS)
  {
    let hijri = to_hijri(date)?;
    cells.push(CalendarDayCell {
      is_in_target_month: hijri.month
        == hijri_month,
      is_today: date == today,
      events: Vec::new(),
      hijri
    });
  }

  if cells.len() != GRID_CELLS {
    return Err(
      CalendarError::invalid_date(
        format!(
          "grid for {hijri_year}/\
           {hijri_month} runs past the \
           last representable date"
        )
      )
    );
  }

  debug!(
    %start,
    %first,
    "generated month grid"
  );
  Ok(cells)
}

/// The displayed (Hijri year, month) pair.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
)]
pub struct MonthCursor {
  pub year:  i32,
  pub month: u32
}

impl MonthCursor {
  pub fn new(
    year: i32,
    month: u32
  ) -> CalendarResult<Self> {
    if year < 1 || month >= 12 {
      return Err(
        CalendarError::invalid_date(
          format!(
            "no hijri month {year}/{month}"
          )
        )
      );
    }
    Ok(Self { year, month })
  }

  /// Hijri month containing `date`.
  pub fn containing(
    date: NaiveDate
  ) -> CalendarResult<Self> {
    let hijri = to_hijri(date)?;
    Ok(Self {
      year:  hijri.year,
      month: hijri.month
    })
  }

  #[must_use]
  pub fn next(self) -> Self {
    if self.month == 11 {
      Self {
        year:  self.year.saturating_add(1),
        month: 0
      }
    } else {
      Self {
        year:  self.year,
        month: self.month + 1
      }
    }
  }

  #[must_use]
  pub fn prev(self) -> Self {
    if self.month == 0 {
      Self {
        year:  self.year.saturating_sub(1),
        month: 11
      }
    } else {
      Self {
        year:  self.year,
        month: self.month - 1
      }
    }
  }

  pub fn month_name(
    &self
  ) -> &'static str {
    HIJRI_MONTH_NAMES
      [(self.month % 12) as usize]
  }

  pub fn title(&self) -> String {
    format!(
      "{} {} هـ",
      self.month_name(),
      self.year
    )
  }

  pub fn grid(
    &self,
    today: NaiveDate
  ) -> CalendarResult<Vec<CalendarDayCell>>
  {
    generate_month_grid(
      self.year, self.month, today
    )
  }
}

//! Arithmetic (tabular) Hijri calendar.
//!
//! Civil epoch: 1 Muharram 1 AH is 0622-07-19 in the proleptic Gregorian
//! calendar. Years run in 30-year cycles with leap years 2, 5, 7, 10, 13,
//! 16, 18, 21, 24, 26 and 29. Odd months have 30 days and even months 29,
//! except Dhu al-Hijjah which has 30 days in a leap year.
//!
//! Months are 0-indexed (Muharram = 0) throughout the public API.

use std::fmt;

use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use serde::Serialize;

use crate::error::{
  CalendarError,
  CalendarResult
};

/// Day number (counted from 0001-01-01 = 1) of 1 Muharram 1 AH.
const ISLAMIC_EPOCH: i64 = 227_015;

pub const HIJRI_MONTH_NAMES: [&str; 12] = [
  "محرم",
  "صفر",
  "ربيع الأول",
  "ربيع الثاني",
  "جمادى الأولى",
  "جمادى الثانية",
  "رجب",
  "شعبان",
  "رمضان",
  "شوال",
  "ذو القعدة",
  "ذو الحجة"
];

/// Sunday first, matching the grid's week start.
pub const WEEKDAY_NAMES: [&str; 7] = [
  "الأحد",
  "الاثنين",
  "الثلاثاء",
  "الأربعاء",
  "الخميس",
  "الجمعة",
  "السبت"
];

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct HijriDate {
  pub day:          u32,
  pub month:        u32,
  pub year:         i32,
  pub weekday_name: &'static str,
  pub month_name:   &'static str,
  pub gregorian:    NaiveDate
}

impl HijriDate {
  /// 1-based month number, as printed.
  pub fn month_number(&self) -> u32 {
    self.month + 1
  }
}

impl fmt::Display for HijriDate {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(
      f,
      "{} {} {} هـ",
      self.day, self.month_name, self.year
    )
  }
}

#[must_use]
pub fn hijri_month_name(
  month: u32
) -> Option<&'static str> {
  HIJRI_MONTH_NAMES
    .get(month as usize)
    .copied()
}

#[must_use]
pub fn weekday_name(
  weekday: Weekday
) -> &'static str {
  WEEKDAY_NAMES[weekday
    .num_days_from_sunday()
    as usize]
}

#[must_use]
pub fn is_hijri_leap_year(
  year: i32
) -> bool {
  (14 + 11 * i64::from(year))
    .rem_euclid(30)
    < 11
}

pub fn to_hijri(
  date: NaiveDate
) -> CalendarResult<HijriDate> {
  let fixed =
    i64::from(date.num_days_from_ce());
  if fixed < ISLAMIC_EPOCH {
    return Err(
      CalendarError::invalid_date(
        format!(
          "{date} precedes the Hijri \
           epoch"
        )
      )
    );
  }

  let year = (30
    * (fixed - ISLAMIC_EPOCH)
    + 10_646)
    .div_euclid(10_631);
  let prior_days =
    fixed - fixed_from_parts(year, 1, 1);
  let month_one_based =
    (11 * prior_days + 330)
      .div_euclid(325);
  let day = fixed
    - fixed_from_parts(
      year,
      month_one_based,
      1
    )
    + 1;

  let year =
    i32::try_from(year).map_err(|_| {
      CalendarError::invalid_date(
        format!(
          "hijri year out of range for \
           {date}"
        )
      )
    })?;
  let month = (month_one_based - 1) as u32;

  Ok(HijriDate {
    day: day as u32,
    month,
    year,
    weekday_name: weekday_name(
      date.weekday()
    ),
    month_name: HIJRI_MONTH_NAMES
      [month as usize],
    gregorian: date
  })
}

/// Gregorian date of a Hijri (year, month, day).
///
/// `month` is normalized modulo 12 with a carry into the year, so
/// `month = 12` is Muharram of the next year and `month = -1` is Dhu
/// al-Hijjah of the previous one. `day = 0` is the last day of the
/// previous month.
pub fn from_hijri(
  year: i32,
  month: i32,
  day: i32
) -> CalendarResult<NaiveDate> {
  let (year, month) =
    normalize_month(year, month)?;
  let length = month_length(year, month);
  if day < 0 || day > length as i32 {
    return Err(
      CalendarError::invalid_date(
        format!(
          "day {day} outside 0..={length} \
           for {year}/{month}"
        )
      )
    );
  }
  if day == 0 && year == 1 && month == 0
  {
    return Err(
      CalendarError::invalid_date(
        "day before 1 Muharram 1 AH"
      )
    );
  }

  let fixed = fixed_from_parts(
    i64::from(year),
    i64::from(month) + 1,
    i64::from(day)
  );
  i32::try_from(fixed)
    .ok()
    .and_then(
      NaiveDate::from_num_days_from_ce_opt
    )
    .ok_or_else(|| {
      CalendarError::invalid_date(
        format!(
          "{year}/{month}/{day} has no \
           gregorian equivalent"
        )
      )
    })
}

pub fn days_in_hijri_month(
  year: i32,
  month: i32
) -> CalendarResult<u32> {
  let (year, month) =
    normalize_month(year, month)?;
  Ok(month_length(year, month))
}

fn normalize_month(
  year: i32,
  month: i32
) -> CalendarResult<(i32, u32)> {
  let carry = month.div_euclid(12);
  let month = month.rem_euclid(12) as u32;
  let year = year
    .checked_add(carry)
    .filter(|y| *y >= 1)
    .ok_or_else(|| {
      CalendarError::invalid_date(
        format!(
          "hijri year {year} (carry \
           {carry}) is before 1 AH"
        )
      )
    })?;
  Ok((year, month))
}

fn month_length(
  year: i32,
  month: u32
) -> u32 {
  if month % 2 == 0 {
    30
  } else if month == 11
    && is_hijri_leap_year(year)
  {
    30
  } else {
    29
  }
}

/// Day number of a Hijri date with a 1-based month. Day 0 is allowed.
fn fixed_from_parts(
  year: i64,
  month: i64,
  day: i64
) -> i64 {
  ISLAMIC_EPOCH - 1
    + (year - 1) * 354
    + (3 + 11 * year).div_euclid(30)
    + 29 * (month - 1)
    + (6 * month - 1).div_euclid(11)
    + day
}

#[cfg(test)]
mod tests {
  use chrono::{
    Duration,
    NaiveDate
  };

  use super::{
    days_in_hijri_month,
    from_hijri,
    is_hijri_leap_year,
    to_hijri
  };
  use crate::error::CalendarError;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn converts_known_new_year() {
    let h = to_hijri(ymd(2025, 6, 27))
      .expect("convert");
    assert_eq!(
      (h.year, h.month, h.day),
      (1447, 0, 1)
    );
    assert_eq!(h.month_name, "محرم");
    assert_eq!(h.weekday_name, "الجمعة");
    assert_eq!(
      h.to_string(),
      "1 محرم 1447 هـ"
    );
  }

  #[test]
  fn converts_ramadan_start() {
    let h = to_hijri(ymd(2026, 2, 18))
      .expect("convert");
    assert_eq!(
      (h.year, h.month, h.day),
      (1447, 8, 1)
    );
    assert_eq!(
      from_hijri(1447, 8, 1)
        .expect("from hijri"),
      ymd(2026, 2, 18)
    );
  }

  #[test]
  fn epoch_is_first_of_muharram() {
    let h = to_hijri(ymd(622, 7, 19))
      .expect("epoch");
    assert_eq!(
      (h.year, h.month, h.day),
      (1, 0, 1)
    );
    assert!(matches!(
      to_hijri(ymd(622, 7, 18)),
      Err(CalendarError::InvalidDate(_))
    ));
  }

  #[test]
  fn round_trips_over_two_centuries() {
    let mut date = ymd(1900, 1, 1);
    let end = ymd(2100, 12, 31);
    while date <= end {
      let h =
        to_hijri(date).expect("convert");
      assert!((1..=30).contains(&h.day));
      assert!(h.month < 12);
      let back = from_hijri(
        h.year,
        h.month as i32,
        h.day as i32
      )
      .expect("back");
      assert_eq!(back, date);
      date += Duration::days(1);
    }
  }

  #[test]
  fn month_twelve_rolls_into_next_year() {
    assert_eq!(
      from_hijri(1446, 12, 1)
        .expect("rollover"),
      from_hijri(1447, 0, 1)
        .expect("new year")
    );
    assert_eq!(
      from_hijri(1447, -1, 1)
        .expect("negative month"),
      from_hijri(1446, 11, 1)
        .expect("dhu al-hijjah")
    );
  }

  #[test]
  fn day_zero_is_last_day_of_previous_month(
  ) {
    let last_of_safar =
      from_hijri(1447, 2, 0)
        .expect("day zero");
    let first_of_rabi =
      from_hijri(1447, 2, 1)
        .expect("first");
    assert_eq!(
      last_of_safar.succ_opt(),
      Some(first_of_rabi)
    );
    let h = to_hijri(last_of_safar)
      .expect("convert");
    assert_eq!((h.month, h.day), (1, 29));
  }

  #[test]
  fn month_lengths_follow_tabular_rules() {
    assert!(is_hijri_leap_year(1447));
    assert!(!is_hijri_leap_year(1446));
    assert_eq!(
      days_in_hijri_month(1447, 0)
        .expect("len"),
      30
    );
    assert_eq!(
      days_in_hijri_month(1447, 1)
        .expect("len"),
      29
    );
    assert_eq!(
      days_in_hijri_month(1447, 11)
        .expect("len"),
      30
    );
    assert_eq!(
      days_in_hijri_month(1446, 11)
        .expect("len"),
      29
    );

    let year_length: u32 = (0..12)
      .map(|m| {
        days_in_hijri_month(1446, m)
          .expect("len")
      })
      .sum();
    assert_eq!(year_length, 354);
  }

  #[test]
  fn rejects_invalid_inputs() {
    assert!(matches!(
      from_hijri(0, 0, 1),
      Err(CalendarError::InvalidDate(_))
    ));
    assert!(matches!(
      from_hijri(1, -1, 1),
      Err(CalendarError::InvalidDate(_))
    ));
    assert!(matches!(
      from_hijri(1, 0, 0),
      Err(CalendarError::InvalidDate(_))
    ));
    assert!(matches!(
      from_hijri(1447, 1, 30),
      Err(CalendarError::InvalidDate(_))
    ));
    assert!(matches!(
      from_hijri(1447, 0, 31),
      Err(CalendarError::InvalidDate(_))
    ));
    assert!(matches!(
      from_hijri(1447, 0, -1),
      Err(CalendarError::InvalidDate(_))
    ));
  }
}

use chrono::{
  Datelike,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};

use crate::event::OccasionSource;
use crate::hijri::HijriDate;

/// Hijri month (0-indexed), day, label.
const ISLAMIC_OCCASIONS: [(u32, u32, &str);
  10] = [
  (0, 1, "رأس السنة الهجرية"),
  (0, 10, "يوم عاشوراء"),
  (2, 12, "مولد النبي محمد ﷺ"),
  (6, 27, "الإسراء والمعراج"),
  (7, 15, "ليلة النصف من شعبان"),
  (8, 1, "بداية شهر رمضان"),
  (8, 27, "ليلة القدر"),
  (9, 1, "عيد الفطر"),
  (11, 9, "يوم عرفة"),
  (11, 10, "عيد الأضحى")
];

/// Gregorian month (1-indexed), day, label. Replaced by configuration.
const DEFAULT_NATIONAL_OCCASIONS: [(
  u32,
  u32,
  &str
); 2] = [
  (9, 23, "اليوم الوطني"),
  (2, 22, "يوم التأسيس")
];

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct OccasionEntry {
  pub month: u32,
  pub day:   u32,
  pub label: String
}

impl OccasionEntry {
  pub fn new(
    month: u32,
    day: u32,
    label: impl Into<String>
  ) -> Self {
    Self {
      month,
      day,
      label: label.into()
    }
  }
}

/// Fixed annual occasions keyed by (month, day).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccasionTable {
  islamic:  Vec<OccasionEntry>,
  national: Vec<OccasionEntry>
}

impl Default for OccasionTable {
  fn default() -> Self {
    Self {
      islamic:  to_entries(
        &ISLAMIC_OCCASIONS
      ),
      national: to_entries(
        &DEFAULT_NATIONAL_OCCASIONS
      )
    }
  }
}

impl OccasionTable {
  pub fn with_national(
    mut self,
    national: Vec<OccasionEntry>
  ) -> Self {
    self.national = national;
    self
  }

  pub fn islamic(
    &self
  ) -> &[OccasionEntry] {
    &self.islamic
  }

  pub fn national(
    &self
  ) -> &[OccasionEntry] {
    &self.national
  }

  /// `hijri_month` is 0-indexed.
  pub fn resolve_islamic_occasions(
    &self,
    hijri_month: u32,
    hijri_day: u32
  ) -> Vec<String> {
    lookup(
      &self.islamic,
      hijri_month,
      hijri_day
    )
  }

  pub fn resolve_national_occasions(
    &self,
    date: NaiveDate
  ) -> Vec<String> {
    lookup(
      &self.national,
      date.month(),
      date.day()
    )
  }

  /// Islamic matches first, then national.
  pub fn occasions_on(
    &self,
    hijri: &HijriDate
  ) -> Vec<(String, OccasionSource)> {
    self
      .resolve_islamic_occasions(
        hijri.month,
        hijri.day
      )
      .into_iter()
      .map(|label| {
        (label, OccasionSource::Islamic)
      })
      .chain(
        self
          .resolve_national_occasions(
            hijri.gregorian
          )
          .into_iter()
          .map(|label| {
            (
              label,
              OccasionSource::National
            )
          })
      )
      .collect()
  }
}

fn lookup(
  table: &[OccasionEntry],
  month: u32,
  day: u32
) -> Vec<String> {
  table
    .iter()
    .filter(|entry| {
      entry.month == month
        && entry.day == day
    })
    .map(|entry| entry.label.clone())
    .collect()
}

fn to_entries(
  raw: &[(u32, u32, &str)]
) -> Vec<OccasionEntry> {
  raw
    .iter()
    .map(|(month, day, label)| {
      OccasionEntry::new(
        *month, *day, *label
      )
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    OccasionEntry,
    OccasionTable
  };
  use crate::event::OccasionSource;
  use crate::hijri::to_hijri;

  #[test]
  fn ramadan_start_has_one_label() {
    let table = OccasionTable::default();
    let labels =
      table.resolve_islamic_occasions(8, 1);
    assert_eq!(
      labels,
      vec!["بداية شهر رمضان".to_string()]
    );
  }

  #[test]
  fn unmatched_day_is_empty() {
    let table = OccasionTable::default();
    assert!(
      table
        .resolve_islamic_occasions(1, 1)
        .is_empty()
    );
  }

  #[test]
  fn national_days_use_gregorian_dates() {
    let table = OccasionTable::default();
    let date =
      NaiveDate::from_ymd_opt(2025, 9, 23)
        .expect("valid date");
    assert_eq!(
      table.resolve_national_occasions(date),
      vec!["اليوم الوطني".to_string()]
    );
  }

  #[test]
  fn returns_every_match_in_table_order() {
    let table = OccasionTable::default()
      .with_national(vec![
        OccasionEntry::new(1, 1, "first"),
        OccasionEntry::new(1, 1, "second"),
        OccasionEntry::new(5, 1, "other"),
      ]);
    let date =
      NaiveDate::from_ymd_opt(2026, 1, 1)
        .expect("valid date");
    assert_eq!(
      table.resolve_national_occasions(date),
      vec![
        "first".to_string(),
        "second".to_string()
      ]
    );
  }

  #[test]
  fn occasions_on_orders_islamic_before_national(
  ) {
    // 1 Muharram 1447
    let date =
      NaiveDate::from_ymd_opt(2025, 6, 27)
        .expect("valid date");
    let table = OccasionTable::default()
      .with_national(vec![
        OccasionEntry::new(6, 27, "local"),
      ]);
    let hijri =
      to_hijri(date).expect("convert");
    let found = table.occasions_on(&hijri);
    assert_eq!(found.len(), 2);
    assert_eq!(
      found[0].1,
      OccasionSource::Islamic
    );
    assert_eq!(
      found[1],
      (
        "local".to_string(),
        OccasionSource::National
      )
    );
  }
}

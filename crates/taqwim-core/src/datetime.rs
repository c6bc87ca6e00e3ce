use chrono::{
  DateTime,
  Local,
  LocalResult,
  NaiveDate,
  TimeZone
};

/// Today's local wall-clock date.
#[must_use]
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

/// Local midnight of `date`. On a DST gap the earliest valid instant of
/// the day is used.
#[must_use]
pub fn local_midnight(
  date: NaiveDate
) -> Option<DateTime<Local>> {
  let midnight = date.and_hms_opt(0, 0, 0)?;
  match Local.from_local_datetime(&midnight)
  {
    | LocalResult::Single(dt) => Some(dt),
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::warn!(
        %date,
        first = %first,
        second = %second,
        "ambiguous local midnight; using earliest"
      );
      Some(first.min(second))
    }
    | LocalResult::None => {
      let one_am = date.and_hms_opt(1, 0, 0)?;
      Local
        .from_local_datetime(&one_am)
        .earliest()
    }
  }
}

/// `createdAt` codec: writes UTC ISO-8601 with milliseconds
/// (`2025-06-27T09:00:00.000Z`), reads any RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date (local midnight).
pub mod iso_datetime_serde {
  use chrono::{
    DateTime,
    Local,
    NaiveDate,
    SecondsFormat,
    Utc
  };
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    dt: &DateTime<Local>,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &dt
        .with_timezone(&Utc)
        .to_rfc3339_opts(
          SecondsFormat::Millis,
          true
        )
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<DateTime<Local>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    parse(&raw)
      .map_err(serde::de::Error::custom)
  }

  pub fn parse(
    raw: &str
  ) -> Result<DateTime<Local>, String> {
    let token = raw.trim();
    if let Ok(dt) =
      DateTime::parse_from_rfc3339(token)
    {
      return Ok(
        dt.with_timezone(&Local)
      );
    }
    if let Ok(date) =
      NaiveDate::parse_from_str(
        token, "%Y-%m-%d"
      )
    {
      return super::local_midnight(date)
        .ok_or_else(|| {
          format!(
            "no local midnight for \
             {date}"
          )
        });
    }
    Err(format!(
      "unparseable createdAt: {token}"
    ))
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Local,
    NaiveDate,
    TimeZone
  };

  use super::iso_datetime_serde;

  #[test]
  fn parses_javascript_iso_strings() {
    let parsed = iso_datetime_serde::parse(
      "2025-06-27T09:30:00.000Z"
    )
    .expect("parse iso");
    let expected = chrono::Utc
      .with_ymd_and_hms(
        2025, 6, 27, 9, 30, 0
      )
      .single()
      .expect("valid utc");
    assert_eq!(parsed, expected);
  }

  #[test]
  fn parses_bare_dates_as_local_midnight() {
    let parsed = iso_datetime_serde::parse(
      "2025-06-27"
    )
    .expect("parse date");
    assert_eq!(
      parsed.date_naive(),
      NaiveDate::from_ymd_opt(2025, 6, 27)
        .expect("valid date")
    );
  }

  #[test]
  fn rejects_garbage() {
    assert!(
      iso_datetime_serde::parse(
        "next tuesday"
      )
      .is_err()
    );
  }

  #[test]
  fn keeps_local_wall_clock_date() {
    let local = Local
      .with_ymd_and_hms(
        2025, 6, 27, 12, 0, 0
      )
      .single()
      .expect("valid local");
    let json = serde_json::to_string(
      &Wrapper { at: local }
    )
    .expect("serialize");
    let back: Wrapper =
      serde_json::from_str(&json)
        .expect("deserialize");
    assert_eq!(
      back.at.date_naive(),
      local.date_naive()
    );
  }

  #[derive(
    serde::Serialize, serde::Deserialize,
  )]
  struct Wrapper {
    #[serde(with = "iso_datetime_serde")]
    at: chrono::DateTime<Local>
  }
}

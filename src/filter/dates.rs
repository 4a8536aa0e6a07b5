//! Calendar windows for `--recent`, `--this-week` and `--this-month`.

use chrono::{Datelike, Duration, Months, NaiveDate};

use super::ExprError;

/// Bills store dates as zero-padded ISO strings.
pub fn iso(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// Cutoff date for `--recent <n><d|w|m>`, counted back from `today`.
///
/// Months are calendar months; a day that doesn't exist in the target month
/// is clamped to its last day.
pub fn parse_recent(expr: &str, today: NaiveDate) -> Result<NaiveDate, ExprError> {
  let expr = expr.trim();
  let invalid = || ExprError::InvalidRecent(expr.to_string());

  if expr.chars().count() < 2 {
    return Err(invalid());
  }

  let unit = expr.chars().last().ok_or_else(invalid)?;
  let value_str = &expr[..expr.len() - unit.len_utf8()];
  let value: i64 = value_str
    .parse()
    .map_err(|_| ExprError::InvalidRecentValue(value_str.to_string()))?;

  let out_of_range = || ExprError::InvalidRecentValue(value_str.to_string());

  match unit {
    'd' => days_before(today, value).ok_or_else(out_of_range),
    'w' => value
      .checked_mul(7)
      .and_then(|days| days_before(today, days))
      .ok_or_else(out_of_range),
    'm' => months_before(today, value).ok_or_else(out_of_range),
    other => Err(ExprError::InvalidRecentUnit(other)),
  }
}

fn days_before(today: NaiveDate, days: i64) -> Option<NaiveDate> {
  today.checked_sub_signed(Duration::try_days(days)?)
}

fn months_before(today: NaiveDate, months: i64) -> Option<NaiveDate> {
  let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
  if months >= 0 {
    today.checked_sub_months(count)
  } else {
    today.checked_add_months(count)
  }
}

/// Monday and Sunday of the ISO week containing `today`.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  // Monday = 1 .. Sunday = 7
  let offset = i64::from(today.weekday().number_from_monday()) - 1;
  let start = today - Duration::days(offset);
  (start, start + Duration::days(6))
}

/// "YYYY-MM" prefix shared by every date in the month of `today`.
pub fn month_prefix(today: NaiveDate) -> String {
  today.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_parse_recent_units() {
    let today = day(2026, 3, 20);
    assert_eq!(parse_recent("7d", today).unwrap(), day(2026, 3, 13));
    assert_eq!(parse_recent("2w", today).unwrap(), day(2026, 3, 6));
    assert_eq!(parse_recent("1m", today).unwrap(), day(2026, 2, 20));
    assert_eq!(parse_recent("0d", today).unwrap(), today);
    assert_eq!(parse_recent(" 3d ", today).unwrap(), day(2026, 3, 17));
  }

  #[test]
  fn test_parse_recent_months_are_calendar_months() {
    assert_eq!(parse_recent("1m", day(2026, 3, 31)).unwrap(), day(2026, 2, 28));
    assert_eq!(parse_recent("12m", day(2026, 1, 15)).unwrap(), day(2025, 1, 15));
  }

  #[test]
  fn test_parse_recent_invalid() {
    let today = day(2026, 1, 1);
    assert!(matches!(parse_recent("", today), Err(ExprError::InvalidRecent(_))));
    assert!(matches!(parse_recent("d", today), Err(ExprError::InvalidRecent(_))));
    assert!(matches!(
      parse_recent("xd", today),
      Err(ExprError::InvalidRecentValue(_))
    ));
    assert!(matches!(
      parse_recent("7y", today),
      Err(ExprError::InvalidRecentUnit('y'))
    ));
    assert!(matches!(
      parse_recent("17", today),
      Err(ExprError::InvalidRecentUnit('7'))
    ));
    assert!(parse_recent("99999999999999w", today).is_err());
  }

  #[test]
  fn test_week_bounds() {
    // Wednesday
    assert_eq!(
      week_bounds(day(2026, 10, 21)),
      (day(2026, 10, 19), day(2026, 10, 25))
    );
    // Monday
    assert_eq!(
      week_bounds(day(2026, 10, 19)),
      (day(2026, 10, 19), day(2026, 10, 25))
    );
    // Sunday belongs to the week that started six days earlier
    assert_eq!(
      week_bounds(day(2026, 10, 25)),
      (day(2026, 10, 19), day(2026, 10, 25))
    );
    // Across a year boundary
    assert_eq!(
      week_bounds(day(2027, 1, 1)),
      (day(2026, 12, 28), day(2027, 1, 3))
    );
  }

  #[test]
  fn test_month_prefix_and_iso() {
    assert_eq!(month_prefix(day(2026, 2, 9)), "2026-02");
    assert_eq!(iso(day(2026, 2, 9)), "2026-02-09");
  }
}

//! Operator-prefixed comparisons used by `--amount` and `--date`.

use chrono::{Datelike, NaiveDate};

use super::ExprError;

/// Comparison operator, `=` when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
  Eq,
  Gt,
  Lt,
  Ge,
  Le,
}

impl Comparison {
  /// Split `expr` into its operator and the trimmed operand.
  pub fn split(expr: &str) -> (Self, &str) {
    let expr = expr.trim();

    // Two-character operators first so ">=" isn't read as ">" + "=5"
    let operators = [
      (">=", Self::Ge),
      ("<=", Self::Le),
      (">", Self::Gt),
      ("<", Self::Lt),
      ("=", Self::Eq),
    ];

    for (prefix, op) in operators {
      if let Some(rest) = expr.strip_prefix(prefix) {
        return (op, rest.trim());
      }
    }

    (Self::Eq, expr)
  }

  pub fn holds<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
    match self {
      Self::Eq => lhs == rhs,
      Self::Gt => lhs > rhs,
      Self::Lt => lhs < rhs,
      Self::Ge => lhs >= rhs,
      Self::Le => lhs <= rhs,
    }
  }
}

/// `--amount` filter, e.g. `>=50`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountFilter {
  pub op: Comparison,
  pub value: f64,
}

impl AmountFilter {
  pub fn parse(expr: &str) -> Result<Self, ExprError> {
    let (op, operand) = Comparison::split(expr);
    let value = operand
      .parse::<f64>()
      .map_err(|_| ExprError::InvalidAmount(operand.to_string()))?;

    Ok(Self { op, value })
  }

  pub fn matches(&self, amount: f64) -> bool {
    self.op.holds(&amount, &self.value)
  }
}

/// `--date` filter, e.g. `<=01-15`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
  pub op: Comparison,
  /// Normalized "YYYY-MM-DD"
  pub date: String,
}

impl DateFilter {
  /// Parse `YYYY-MM-DD` or `MM-DD`; the short form takes the year of `today`.
  pub fn parse(expr: &str, today: NaiveDate) -> Result<Self, ExprError> {
    let (op, operand) = Comparison::split(expr);
    let date = normalize_date(operand, today.year())
      .ok_or_else(|| ExprError::InvalidDate(operand.to_string()))?;

    Ok(Self { op, date })
  }

  pub fn matches(&self, date: &str) -> bool {
    self.op.holds(date, self.date.as_str())
  }
}

fn normalize_date(operand: &str, year: i32) -> Option<String> {
  // Both forms are zero-padded
  if operand.len() == 10 {
    let date = NaiveDate::parse_from_str(operand, "%Y-%m-%d").ok()?;
    return Some(date.format("%Y-%m-%d").to_string());
  }

  // Validate month/day against a leap year so "02-29" is always accepted
  let (month, day) = operand.split_once('-')?;
  if month.len() != 2 || day.len() != 2 {
    return None;
  }
  let date = NaiveDate::parse_from_str(&format!("2000-{}", operand), "%Y-%m-%d").ok()?;
  Some(format!("{:04}-{:02}-{:02}", year, date.month(), date.day()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_split_operators() {
    assert_eq!(Comparison::split(">=50"), (Comparison::Ge, "50"));
    assert_eq!(Comparison::split("<= 100"), (Comparison::Le, "100"));
    assert_eq!(Comparison::split(">30"), (Comparison::Gt, "30"));
    assert_eq!(Comparison::split("<5"), (Comparison::Lt, "5"));
    assert_eq!(Comparison::split("=25"), (Comparison::Eq, "25"));
    assert_eq!(Comparison::split("  42  "), (Comparison::Eq, "42"));
  }

  #[test]
  fn test_parse_amount_filter() {
    assert_eq!(
      AmountFilter::parse("50").unwrap(),
      AmountFilter {
        op: Comparison::Eq,
        value: 50.0
      }
    );
    assert_eq!(AmountFilter::parse(">=50").unwrap().op, Comparison::Ge);
    assert_eq!(AmountFilter::parse("<= 10.5").unwrap().value, 10.5);

    for bad in ["", ">=", "abc", ">fifty", "=="] {
      assert!(AmountFilter::parse(bad).is_err(), "{:?} should fail", bad);
    }
  }

  #[test]
  fn test_match_amount() {
    let at_least_50 = AmountFilter::parse(">=50").unwrap();
    assert!(!at_least_50.matches(49.99));
    assert!(at_least_50.matches(50.0));
    assert!(at_least_50.matches(120.0));

    let exactly = AmountFilter::parse("25").unwrap();
    assert!(exactly.matches(25.0));
    assert!(!exactly.matches(25.01));

    let below = AmountFilter::parse("<10").unwrap();
    assert!(below.matches(9.99));
    assert!(!below.matches(10.0));

    let above = AmountFilter::parse(">10").unwrap();
    assert!(above.matches(10.01));
    assert!(!above.matches(10.0));

    let at_most = AmountFilter::parse("<=10").unwrap();
    assert!(at_most.matches(10.0));
    assert!(!at_most.matches(10.01));
  }

  #[test]
  fn test_parse_full_date() {
    let today = day(2026, 6, 1);
    let filter = DateFilter::parse(">=2026-01-01", today).unwrap();
    assert_eq!(filter.op, Comparison::Ge);
    assert_eq!(filter.date, "2026-01-01");
  }

  #[test]
  fn test_parse_short_date_uses_current_year() {
    let filter = DateFilter::parse("<=01-15", day(2031, 3, 3)).unwrap();
    assert_eq!(filter.op, Comparison::Le);
    assert_eq!(filter.date, "2031-01-15");
    assert!(filter.matches("2031-01-14"));
    assert!(filter.matches("2031-01-15"));
    assert!(!filter.matches("2031-01-16"));
  }

  #[test]
  fn test_parse_leap_day_short_form() {
    let filter = DateFilter::parse("02-29", day(2027, 1, 1)).unwrap();
    assert_eq!(filter.date, "2027-02-29");
  }

  #[test]
  fn test_parse_invalid_dates() {
    let today = day(2026, 1, 1);
    for bad in [
      "", "tomorrow", "2026-13-01", "13-01", "1-5", "2026/01/01", "01-32", "2026-1-5", "2026-01-5",
    ] {
      assert!(DateFilter::parse(bad, today).is_err(), "{:?} should fail", bad);
    }
  }

  #[test]
  fn test_match_date_operators() {
    let today = day(2026, 1, 1);
    let eq = DateFilter::parse("2026-01-15", today).unwrap();
    assert!(eq.matches("2026-01-15"));
    assert!(!eq.matches("2026-01-16"));

    let gt = DateFilter::parse(">2026-01-15", today).unwrap();
    assert!(gt.matches("2026-01-16"));
    assert!(!gt.matches("2026-01-15"));

    let lt = DateFilter::parse("<2026-01-15", today).unwrap();
    assert!(lt.matches("2025-12-31"));
    assert!(!lt.matches("2026-01-15"));
  }
}

//! Client-side bill filtering for `cospend list`.
//!
//! Filtering happens in two phases so that bad input is reported before any
//! network traffic:
//! 1. [`ListFilters::parse`] validates the raw flag values and pins the
//!    calendar windows to the invocation date.
//! 2. [`FilterPlan::build`] resolves member/category/payment-mode names
//!    against the project and produces a [`FilterSet`].
//!
//! A bill is kept iff every predicate in the set accepts it.

mod compare;
mod dates;

use chrono::NaiveDate;
use thiserror::Error;

use crate::cospend::types::{Bill, Project};
use crate::resolve::ResolveError;

use compare::{AmountFilter, DateFilter};

/// Malformed filter expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
  #[error("invalid amount value: {0}")]
  InvalidAmount(String),
  #[error("invalid date format: {0} (expected YYYY-MM-DD or MM-DD)")]
  InvalidDate(String),
  #[error("invalid recent format: {0} (expected e.g. 7d, 2w, 1m)")]
  InvalidRecent(String),
  #[error("invalid recent value: {0}")]
  InvalidRecentValue(String),
  #[error("invalid recent unit: {0} (expected d, w, or m)")]
  InvalidRecentUnit(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
  #[error("parsing {filter} filter: {source}")]
  Parse {
    filter: &'static str,
    #[source]
    source: ExprError,
  },
  #[error("resolving {filter} filter: {source}")]
  Resolve {
    filter: &'static str,
    #[source]
    source: ResolveError,
  },
}

impl FilterError {
  fn parse(filter: &'static str) -> impl FnOnce(ExprError) -> Self {
    move |source| Self::Parse { filter, source }
  }

  fn resolve(filter: &'static str) -> impl FnOnce(ResolveError) -> Self {
    move |source| Self::Resolve { filter, source }
  }
}

/// Raw filter flags as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ListFilters {
  pub paid_by: Option<String>,
  pub paid_for: Vec<String>,
  pub amount: Option<String>,
  pub name: Option<String>,
  pub payment_method: Option<String>,
  pub category: Option<String>,
  pub date: Option<String>,
  pub today: bool,
  pub this_month: bool,
  pub this_week: bool,
  pub recent: Option<String>,
}

impl ListFilters {
  /// Validate every expression and fix the calendar windows to `today`.
  pub fn parse(&self, today: NaiveDate) -> Result<FilterPlan, FilterError> {
    let amount = self
      .amount
      .as_deref()
      .map(AmountFilter::parse)
      .transpose()
      .map_err(FilterError::parse("amount"))?;

    let date = self
      .date
      .as_deref()
      .map(|expr| DateFilter::parse(expr, today))
      .transpose()
      .map_err(FilterError::parse("date"))?;

    let recent_cutoff = self
      .recent
      .as_deref()
      .map(|expr| dates::parse_recent(expr, today).map(dates::iso))
      .transpose()
      .map_err(FilterError::parse("recent"))?;

    let week = self.this_week.then(|| {
      let (start, end) = dates::week_bounds(today);
      (dates::iso(start), dates::iso(end))
    });

    Ok(FilterPlan {
      paid_by: self.paid_by.clone(),
      paid_for: self.paid_for.clone(),
      amount,
      name: self.name.as_ref().map(|n| n.to_lowercase()),
      payment_method: self.payment_method.clone(),
      category: self.category.clone(),
      today: self.today.then(|| dates::iso(today)),
      date,
      month_prefix: self.this_month.then(|| dates::month_prefix(today)),
      week,
      recent_cutoff,
    })
  }
}

/// Validated filters, still holding unresolved member/category tokens.
#[derive(Debug, Clone, Default)]
pub struct FilterPlan {
  paid_by: Option<String>,
  paid_for: Vec<String>,
  amount: Option<AmountFilter>,
  /// Lowercased
  name: Option<String>,
  payment_method: Option<String>,
  category: Option<String>,
  today: Option<String>,
  date: Option<DateFilter>,
  month_prefix: Option<String>,
  week: Option<(String, String)>,
  recent_cutoff: Option<String>,
}

impl FilterPlan {
  /// Resolve names against `project` and assemble the predicates.
  ///
  /// Any unresolvable token fails the whole build.
  pub fn build(self, project: &Project) -> Result<FilterSet, FilterError> {
    let payer = self
      .paid_by
      .as_deref()
      .map(|token| project.resolve_member(token))
      .transpose()
      .map_err(FilterError::resolve("payer"))?;

    let owed = self
      .paid_for
      .iter()
      .map(|token| project.resolve_member(token))
      .collect::<Result<Vec<_>, _>>()
      .map_err(FilterError::resolve("owed member"))?;

    let method = self
      .payment_method
      .as_deref()
      .map(|token| project.resolve_payment_mode(token))
      .transpose()
      .map_err(FilterError::resolve("payment method"))?;

    let category = self
      .category
      .as_deref()
      .map(|token| project.resolve_category(token))
      .transpose()
      .map_err(FilterError::resolve("category"))?;

    let mut filters = FilterSet::new();

    if let Some(payer) = payer {
      filters.push(move |bill| bill.payer_id == payer);
    }

    if !owed.is_empty() {
      filters.push(move |bill| owed.iter().all(|id| bill.is_owed_by(*id)));
    }

    if let Some(amount) = self.amount {
      filters.push(move |bill| amount.matches(bill.amount));
    }

    if let Some(name) = self.name {
      filters.push(move |bill| bill.what.to_lowercase().contains(&name));
    }

    if let Some(method) = method {
      filters.push(move |bill| bill.payment_mode_id == method);
    }

    if let Some(category) = category {
      filters.push(move |bill| bill.category_id == category);
    }

    if let Some(today) = self.today {
      filters.push(move |bill| bill.date == today);
    }

    if let Some(date) = self.date {
      filters.push(move |bill| date.matches(&bill.date));
    }

    if let Some(prefix) = self.month_prefix {
      filters.push(move |bill| bill.date.starts_with(&prefix));
    }

    if let Some((start, end)) = self.week {
      filters.push(move |bill| bill.date >= start && bill.date <= end);
    }

    if let Some(cutoff) = self.recent_cutoff {
      filters.push(move |bill| bill.date >= cutoff);
    }

    Ok(filters)
  }
}

/// A predicate over bills.
pub type Predicate = Box<dyn Fn(&Bill) -> bool>;

/// Conjunction of predicates.
#[derive(Default)]
pub struct FilterSet {
  predicates: Vec<Predicate>,
}

impl FilterSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, predicate: impl Fn(&Bill) -> bool + 'static) {
    self.predicates.push(Box::new(predicate));
  }

  pub fn len(&self) -> usize {
    self.predicates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.predicates.is_empty()
  }

  /// True iff every predicate accepts `bill`. Stops at the first rejection.
  pub fn matches(&self, bill: &Bill) -> bool {
    self.predicates.iter().all(|predicate| predicate(bill))
  }

  /// Keep matching bills, preserving their order.
  pub fn apply(&self, bills: Vec<Bill>) -> Vec<Bill> {
    if self.is_empty() {
      return bills;
    }
    bills.into_iter().filter(|bill| self.matches(bill)).collect()
  }
}

impl std::fmt::Debug for FilterSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FilterSet")
      .field("predicates", &self.predicates.len())
      .finish()
  }
}

use serde::{Deserialize, Serialize};

use super::api_types::{keyed_or_list, null_as_empty, Keyed};

/// A project member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
  pub id: i64,
  #[serde(default)]
  pub name: String,
  /// Nextcloud account name, empty for guest members
  #[serde(rename = "userid", default)]
  pub user_id: String,
  #[serde(default)]
  pub activated: bool,
}

/// Bill category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  #[serde(default)]
  pub id: i64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub color: String,
}

/// Payment method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMode {
  #[serde(default)]
  pub id: i64,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub color: String,
}

/// Secondary project currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
  pub id: i64,
  /// Symbol, ISO code or a description containing a symbol
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub exchange_rate: f64,
}

/// Project snapshot with all reference data needed to resolve names.
///
/// Categories and payment modes arrive either as an array or as an object
/// keyed by ID; both shapes are normalized into ID-tagged records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "currencyname", default, deserialize_with = "null_as_empty")]
  pub currency_name: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub members: Vec<Member>,
  #[serde(default, deserialize_with = "keyed_or_list")]
  pub categories: Vec<Category>,
  #[serde(rename = "paymentmodes", default, deserialize_with = "keyed_or_list")]
  pub payment_modes: Vec<PaymentMode>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub currencies: Vec<Currency>,
}

impl Project {
  pub fn member(&self, id: i64) -> Option<&Member> {
    self.members.iter().find(|m| m.id == id)
  }

  pub fn category(&self, id: i64) -> Option<&Category> {
    self.categories.iter().find(|c| c.id == id)
  }

  pub fn payment_mode(&self, id: i64) -> Option<&PaymentMode> {
    self.payment_modes.iter().find(|pm| pm.id == id)
  }
}

impl Keyed for Category {
  fn id(&self) -> i64 {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = id;
  }
}

impl Keyed for PaymentMode {
  fn id(&self) -> i64 {
    self.id
  }

  fn set_id(&mut self, id: i64) {
    self.id = id;
  }
}

/// Entry of the project list endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectSummary {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "currencyname", default, deserialize_with = "null_as_empty")]
  pub currency_name: String,
  #[serde(default)]
  pub archived_ts: Option<i64>,
}

impl ProjectSummary {
  pub fn is_archived(&self) -> bool {
    self.archived_ts.is_some()
  }
}

/// Member share of a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ower {
  pub id: i64,
  #[serde(default)]
  pub weight: f64,
}

/// An expense as returned by the API
#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
  pub id: i64,
  /// Single-line description
  pub what: String,
  pub amount: f64,
  /// "YYYY-MM-DD"; compares lexically in date order
  pub date: String,
  pub payer_id: i64,
  pub owers: Vec<Ower>,
  pub comment: String,
  /// 0 when unset
  pub payment_mode_id: i64,
  /// 0 when unset
  pub category_id: i64,
  pub repeat: String,
  /// Creation time, unix seconds
  pub timestamp: i64,
}

impl Bill {
  pub fn is_owed_by(&self, member_id: i64) -> bool {
    self.owers.iter().any(|o| o.id == member_id)
  }
}

/// A bill to create
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewBill {
  pub what: String,
  pub amount: f64,
  pub payer_id: i64,
  pub owed_to: Vec<i64>,
  pub date: String,
  pub comment: Option<String>,
  pub payment_mode_id: Option<i64>,
  pub category_id: Option<i64>,
  pub original_currency_id: Option<i64>,
}

/// Nextcloud account info relevant for formatting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInfo {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub locale: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub language: String,
}

impl UserInfo {
  /// Locale for number formatting: locale, then language.
  pub fn effective_locale(&self) -> Option<&str> {
    [self.locale.as_str(), self.language.as_str()]
      .into_iter()
      .find(|s| !s.is_empty())
  }
}

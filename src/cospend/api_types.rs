//! Serde-deserializable types matching Cospend OCS API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

use super::types::{Bill, Ower};

// ============================================================================
// Shape helpers
// ============================================================================

/// Records whose ID may come from an enclosing object key.
pub trait Keyed {
  fn id(&self) -> i64;
  fn set_id(&mut self, id: i64);
}

/// Deserialize `null` as the type's default (older servers send null lists).
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a list given either as `{"<id>": {...}}` or as `[{...}]`.
///
/// The object form is tried first and its keys are authoritative for IDs.
/// Anything that matches neither shape yields an empty list.
pub fn keyed_or_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned + Keyed,
{
  let value = Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null);
  Ok(normalize_keyed(value))
}

fn normalize_keyed<T: DeserializeOwned + Keyed>(value: Value) -> Vec<T> {
  let keyed = value
    .is_object()
    .then(|| serde_json::from_value::<BTreeMap<String, T>>(value.clone()).ok())
    .flatten();

  let mut records: Vec<T> = match keyed {
    Some(map) => map
      .into_iter()
      .map(|(key, mut record)| {
        if let Ok(id) = key.trim().parse() {
          record.set_id(id);
        }
        record
      })
      .collect(),
    None => serde_json::from_value(value).unwrap_or_default(),
  };

  records.sort_by_key(|r| r.id());
  records
}

// ============================================================================
// OCS envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OcsResponse {
  pub ocs: Ocs,
}

#[derive(Debug, Deserialize)]
pub struct Ocs {
  pub meta: OcsMeta,
  #[serde(default)]
  pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct OcsMeta {
  #[serde(rename = "statuscode")]
  pub status_code: u16,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub message: String,
}

impl OcsResponse {
  /// Check the OCS status and decode the payload.
  pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
    if self.ocs.meta.status_code != 200 {
      return Err(eyre!("API error: {}", self.ocs.meta.message));
    }

    serde_json::from_value(self.ocs.data).map_err(|e| eyre!("Failed to decode response data: {}", e))
  }

  /// Check the OCS status, ignoring the payload.
  pub fn ensure_ok(self) -> Result<()> {
    if self.ocs.meta.status_code != 200 {
      return Err(eyre!("API error: {}", self.ocs.meta.message));
    }
    Ok(())
  }
}

// ============================================================================
// Bills endpoint response
// ============================================================================

/// `{"nb_bills": N, "bills": [...], "allBillIds": [...], "timestamp": N}`
#[derive(Debug, Deserialize)]
pub struct ApiBillsResponse {
  #[serde(default, deserialize_with = "null_as_empty")]
  pub bills: Vec<ApiBill>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBill {
  pub id: i64,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub what: String,
  #[serde(default)]
  pub amount: f64,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub date: String,
  #[serde(default)]
  pub payer_id: i64,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub owers: Vec<Ower>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub comment: String,
  #[serde(rename = "paymentmodeid", default)]
  pub payment_mode_id: i64,
  #[serde(rename = "categoryid", default)]
  pub category_id: i64,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub repeat: String,
  #[serde(default)]
  pub timestamp: i64,
}

impl ApiBill {
  pub fn into_bill(self) -> Bill {
    Bill {
      id: self.id,
      what: single_line(&self.what),
      amount: self.amount,
      date: self.date,
      payer_id: self.payer_id,
      owers: self.owers,
      comment: self.comment,
      payment_mode_id: self.payment_mode_id,
      category_id: self.category_id,
      repeat: self.repeat,
      timestamp: self.timestamp,
    }
  }
}

/// Trim and replace line breaks and tabs with spaces.
pub fn single_line(s: &str) -> String {
  s.trim()
    .chars()
    .map(|c| match c {
      '\n' | '\r' | '\t' => ' ',
      other => other,
    })
    .collect()
}

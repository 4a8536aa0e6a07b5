//! Resolve user-typed tokens (ID, name, currency code) to project entities.
//!
//! Precedence for every kind of reference:
//! 1. a decimal token equal to an entity ID
//! 2. a case-insensitive exact name match
//! 3. categories and payment modes: first case-insensitive substring match
//! 4. currencies: an ISO code whose symbol appears in the currency name

use thiserror::Error;

use crate::cospend::types::{Category, Currency, Member, PaymentMode, Project};
use crate::currency;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  #[error("{kind} not found: {token}")]
  NotFound { kind: &'static str, token: String },
}

/// An entity that can be referenced by ID or name.
pub trait Reference {
  /// Human name of the entity kind, used in errors
  const KIND: &'static str;
  /// Whether a partial name is accepted when nothing matches exactly
  const SUBSTRING_FALLBACK: bool = false;

  fn id(&self) -> i64;

  /// Case-insensitive exact match; `needle` is already lowercase.
  fn matches_name(&self, needle: &str) -> bool;

  /// Name used for the substring fallback.
  fn name(&self) -> &str;

  /// Match through a currency code. Only currencies support this.
  fn matches_code(&self, _code: &str) -> bool {
    false
  }
}

impl Reference for Member {
  const KIND: &'static str = "member";

  fn id(&self) -> i64 {
    self.id
  }

  fn matches_name(&self, needle: &str) -> bool {
    self.name.to_lowercase() == needle || self.user_id.to_lowercase() == needle
  }

  fn name(&self) -> &str {
    &self.name
  }
}

impl Reference for Category {
  const KIND: &'static str = "category";
  const SUBSTRING_FALLBACK: bool = true;

  fn id(&self) -> i64 {
    self.id
  }

  fn matches_name(&self, needle: &str) -> bool {
    self.name.to_lowercase() == needle
  }

  fn name(&self) -> &str {
    &self.name
  }
}

impl Reference for PaymentMode {
  const KIND: &'static str = "payment mode";
  const SUBSTRING_FALLBACK: bool = true;

  fn id(&self) -> i64 {
    self.id
  }

  fn matches_name(&self, needle: &str) -> bool {
    self.name.to_lowercase() == needle
  }

  fn name(&self) -> &str {
    &self.name
  }
}

impl Reference for Currency {
  const KIND: &'static str = "currency";

  fn id(&self) -> i64 {
    self.id
  }

  fn matches_name(&self, needle: &str) -> bool {
    self.name.to_lowercase() == needle
  }

  fn name(&self) -> &str {
    &self.name
  }

  fn matches_code(&self, code: &str) -> bool {
    currency::code_to_symbol(code).is_some_and(|symbol| self.name.contains(symbol))
  }
}

/// Find the entity `token` refers to.
pub fn resolve<'a, T: Reference>(items: &'a [T], token: &str) -> Result<&'a T, ResolveError> {
  let not_found = || ResolveError::NotFound {
    kind: T::KIND,
    token: token.to_string(),
  };

  if token.is_empty() {
    return Err(not_found());
  }

  if let Ok(id) = token.parse::<i64>() {
    if let Some(item) = items.iter().find(|item| item.id() == id) {
      return Ok(item);
    }
  }

  let needle = token.to_lowercase();

  if let Some(item) = items.iter().find(|item| item.matches_name(&needle)) {
    return Ok(item);
  }

  if T::SUBSTRING_FALLBACK {
    if let Some(item) = items
      .iter()
      .find(|item| item.name().to_lowercase().contains(&needle))
    {
      return Ok(item);
    }
  }

  items
    .iter()
    .find(|item| item.matches_code(&needle))
    .ok_or_else(not_found)
}

/// Resolve `token` to the ID of the entity it refers to.
pub fn resolve_id<T: Reference>(items: &[T], token: &str) -> Result<i64, ResolveError> {
  resolve(items, token).map(Reference::id)
}

impl Project {
  pub fn resolve_member(&self, token: &str) -> Result<i64, ResolveError> {
    resolve_id(&self.members, token)
  }

  pub fn resolve_category(&self, token: &str) -> Result<i64, ResolveError> {
    resolve_id(&self.categories, token)
  }

  pub fn resolve_payment_mode(&self, token: &str) -> Result<i64, ResolveError> {
    resolve_id(&self.payment_modes, token)
  }

  pub fn resolve_currency(&self, token: &str) -> Result<i64, ResolveError> {
    resolve_id(&self.currencies, token)
  }
}

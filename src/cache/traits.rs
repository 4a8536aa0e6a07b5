//! Core traits and types for the caching system.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::cospend::types::{Project, UserInfo};

/// Trait for payloads that can be cached.
///
/// Each payload is stored in its own file as
/// `{ "<payload_field>": <payload>, "cached_at": "<RFC3339>" }`.
pub trait Cacheable: Serialize + DeserializeOwned {
  /// JSON field the payload is stored under
  fn payload_field() -> &'static str;
}

impl Cacheable for Project {
  fn payload_field() -> &'static str {
    "project"
  }
}

impl Cacheable for UserInfo {
  fn payload_field() -> &'static str {
    "user_info"
  }
}

/// A cached payload together with the time it was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
  pub payload: T,
  pub cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
  /// An entry is usable while `now - cached_at <= ttl`.
  pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
    now - self.cached_at <= ttl
  }
}

/// Address of a cache file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheKey {
  /// Reference data of one project
  Project(String),
  /// Account info of the configured user
  UserInfo,
}

impl CacheKey {
  /// File stem for this key.
  ///
  /// Project IDs made of `[A-Za-z0-9._-]` that don't start with `.` or `_`
  /// are used verbatim. Anything else is hashed so it can never escape the
  /// cache directory or land on the user-info file. Hashed stems are
  /// `p-<sha256 hex>`; an ID of that exact shape is hashed too.
  pub fn file_stem(&self) -> String {
    match self {
      Self::UserInfo => "_userinfo".to_string(),
      Self::Project(id) if is_safe_stem(id) => id.clone(),
      Self::Project(id) => {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        format!("p-{}", hex::encode(hasher.finalize()))
      }
    }
  }

  pub fn description(&self) -> String {
    match self {
      Self::Project(id) => format!("project {}", id),
      Self::UserInfo => "user info".to_string(),
    }
  }
}

fn is_safe_stem(id: &str) -> bool {
  !id.is_empty()
    && !id.starts_with(['.', '_'])
    && !looks_hashed(id)
    && id
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn looks_hashed(id: &str) -> bool {
  id.strip_prefix("p-")
    .is_some_and(|rest| rest.len() == 64 && rest.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plain_project_id_used_verbatim() {
    assert_eq!(CacheKey::Project("my-project_2".into()).file_stem(), "my-project_2");
    assert_eq!(CacheKey::UserInfo.file_stem(), "_userinfo");
  }

  #[test]
  fn test_traversal_ids_are_hashed() {
    for id in ["../etc/passwd", "a/b", "..", ".hidden", "", "with space"] {
      let stem = CacheKey::Project(id.into()).file_stem();
      assert!(stem.starts_with("p-"), "{} -> {}", id, stem);
      assert_eq!(stem.len(), 2 + 64);
      assert!(!stem.contains('/'));
    }
  }

  #[test]
  fn test_project_ids_never_share_the_user_info_file() {
    let user_info = CacheKey::UserInfo.file_stem();
    for id in ["_userinfo", "_other"] {
      let stem = CacheKey::Project(id.into()).file_stem();
      assert_ne!(stem, user_info);
      assert!(stem.starts_with("p-"), "{} -> {}", id, stem);
    }

    let hashed = CacheKey::Project("a/b".into()).file_stem();
    assert_ne!(CacheKey::Project(hashed.clone()).file_stem(), hashed);
    assert_eq!(CacheKey::Project("p-trip".into()).file_stem(), "p-trip");
  }

  #[test]
  fn test_hashed_stems_are_stable_and_distinct() {
    let a = CacheKey::Project("a/b".into()).file_stem();
    let b = CacheKey::Project("a/c".into()).file_stem();
    assert_eq!(a, CacheKey::Project("a/b".into()).file_stem());
    assert_ne!(a, b);
  }

  #[test]
  fn test_entry_freshness_boundary() {
    let now = Utc::now();
    let ttl = Duration::hours(1);
    let entry = CacheEntry {
      payload: (),
      cached_at: now - ttl,
    };
    assert!(entry.is_fresh(ttl, now));

    let stale = CacheEntry {
      payload: (),
      cached_at: now - ttl - Duration::seconds(1),
    };
    assert!(!stale.is_fresh(ttl, now));
  }
}

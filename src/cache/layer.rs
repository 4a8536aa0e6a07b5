//! Cache layer that applies TTL rules on top of a storage backend.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Result;
use std::sync::Arc;

use crate::cospend::types::{Project, UserInfo};

use super::storage::{decode_entry, encode_entry, CacheStorage, FileStorage, NoopStorage};
use super::traits::{CacheEntry, CacheKey, Cacheable};

/// Project and user-info cache.
///
/// Loads never fail: a missing, unreadable, malformed or expired entry is
/// reported as `None` and the caller falls back to the API. Saves overwrite
/// the whole entry and only fail on filesystem errors.
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// How long a stored entry stays usable
  ttl: Duration,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      ttl: Duration::hours(1),
    }
  }

  /// Cache at the default location, or a no-op cache if there is none.
  pub fn open() -> Self {
    match FileStorage::open() {
      Some(storage) => {
        tracing::debug!(root = %storage.root().display(), "Using cache directory");
        Self::new(storage)
      }
      None => {
        tracing::debug!("No cache directory available, caching disabled");
        Self::new(NoopStorage)
      }
    }
  }

  /// Set the time-to-live for cached entries.
  #[cfg(test)]
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn load_project(&self, project_id: &str) -> Option<Project> {
    self.load(&CacheKey::Project(project_id.to_string()), Utc::now())
  }

  pub fn save_project(&self, project_id: &str, project: &Project) -> Result<()> {
    self.store(
      &CacheKey::Project(project_id.to_string()),
      project,
      Utc::now(),
    )
  }

  pub fn load_user_info(&self) -> Option<UserInfo> {
    self.load(&CacheKey::UserInfo, Utc::now())
  }

  pub fn save_user_info(&self, user_info: &UserInfo) -> Result<()> {
    self.store(&CacheKey::UserInfo, user_info, Utc::now())
  }

  /// Fresh payload for `key`, or `None` for any kind of miss.
  fn load<T: Cacheable>(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<T> {
    let entry = match self.read_entry::<T>(key) {
      Ok(Some(entry)) => entry,
      Ok(None) => {
        tracing::debug!(key = %key.description(), "Cache miss");
        return None;
      }
      Err(e) => {
        tracing::debug!(key = %key.description(), error = %e, "Ignoring unreadable cache entry");
        return None;
      }
    };

    if !entry.is_fresh(self.ttl, now) {
      tracing::debug!(key = %key.description(), cached_at = %entry.cached_at, "Cache entry expired");
      return None;
    }
    Some(entry.payload)
  }

  fn read_entry<T: Cacheable>(&self, key: &CacheKey) -> Result<Option<CacheEntry<T>>> {
    match self.storage.read(key)? {
      Some(document) => decode_entry(&document).map(Some),
      None => Ok(None),
    }
  }

  fn store<T: Cacheable>(&self, key: &CacheKey, payload: &T, cached_at: DateTime<Utc>) -> Result<()> {
    let document = encode_entry(payload, cached_at)?;
    self.storage.write(key, &document)
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      ttl: self.ttl,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cospend::types::{Category, Currency, Member, PaymentMode};
  use std::fs;

  fn sample_project() -> Project {
    Project {
      id: "test-project".into(),
      name: "Test Project".into(),
      currency_name: "EUR".into(),
      members: vec![Member {
        id: 1,
        name: "Alice".into(),
        user_id: "alice".into(),
        activated: true,
      }],
      categories: vec![Category {
        id: 1,
        name: "Food".into(),
        icon: "🍔".into(),
        color: "#ff0000".into(),
      }],
      payment_modes: vec![PaymentMode {
        id: 1,
        name: "Cash".into(),
        icon: String::new(),
        color: String::new(),
      }],
      currencies: vec![Currency {
        id: 1,
        name: "$".into(),
        exchange_rate: 1.0,
      }],
    }
  }

  fn cache_in(dir: &tempfile::TempDir) -> (CacheLayer, FileStorage) {
    let root = dir.path().join("cospend");
    (CacheLayer::new(FileStorage::at(&root)), FileStorage::at(root))
  }

  #[test]
  fn test_save_and_load_project() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, files) = cache_in(&dir);
    let project = sample_project();

    cache.save_project("test-project", &project).unwrap();
    assert!(files
      .path_for(&CacheKey::Project("test-project".into()))
      .exists());

    let loaded = cache.load_project("test-project");
    assert_eq!(loaded, Some(project));
  }

  #[test]
  fn test_load_missing_project() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, _) = cache_in(&dir);
    assert_eq!(cache.load_project("non-existent-project"), None);
  }

  #[test]
  fn test_load_expired_project() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, _) = cache_in(&dir);
    let key = CacheKey::Project("expired-project".into());

    cache
      .store(&key, &sample_project(), Utc::now() - Duration::hours(2))
      .unwrap();

    assert_eq!(cache.load_project("expired-project"), None);
  }

  #[test]
  fn test_load_just_within_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, _) = cache_in(&dir);
    let key = CacheKey::Project("p".into());
    let now = Utc::now();

    cache.store(&key, &sample_project(), now - Duration::minutes(59)).unwrap();
    assert!(cache.load::<Project>(&key, now).is_some());
    assert!(cache
      .load::<Project>(&key, now + Duration::minutes(2))
      .is_none());
  }

  #[test]
  fn test_load_corrupt_file_is_a_miss() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, files) = cache_in(&dir);

    cache.save_project("p", &sample_project()).unwrap();
    fs::write(files.path_for(&CacheKey::Project("p".into())), "{ truncated").unwrap();

    assert_eq!(cache.load_project("p"), None);
  }

  #[test]
  fn test_load_legacy_document() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, files) = cache_in(&dir);
    fs::create_dir_all(files.root()).unwrap();

    let cached_at = Utc::now().to_rfc3339();
    let document = format!(
      r#"{{"project":{{"id":"p","name":"P","members":null,"categories":null,"paymentmodes":null,"currencies":null}},"cached_at":"{}"}}"#,
      cached_at
    );
    fs::write(files.path_for(&CacheKey::Project("p".into())), document).unwrap();

    let project = cache.load_project("p").unwrap();
    assert_eq!(project.name, "P");
    assert!(project.members.is_empty());
  }

  #[test]
  fn test_save_overwrites_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, _) = cache_in(&dir);

    let mut project = sample_project();
    cache.save_project("p", &project).unwrap();

    project.members.clear();
    project.name = "Renamed".into();
    cache.save_project("p", &project).unwrap();

    assert_eq!(cache.load_project("p"), Some(project));
  }

  #[test]
  fn test_user_info_is_independent_of_projects() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, files) = cache_in(&dir);
    let info = UserInfo {
      locale: "he_IL".into(),
      language: "he".into(),
    };

    assert_eq!(cache.load_user_info(), None);
    cache.save_user_info(&info).unwrap();
    assert_eq!(cache.load_user_info(), Some(info.clone()));
    assert!(files.root().join("_userinfo.json").exists());
    assert_eq!(cache.load_project("_userinfo"), None);

    // A project whose ID matches the user-info file name gets its own file
    cache.save_project("_userinfo", &sample_project()).unwrap();
    assert_eq!(cache.load_user_info(), Some(info));
    assert_eq!(cache.load_project("_userinfo"), Some(sample_project()));
  }

  #[test]
  fn test_save_fails_when_root_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("cospend");
    fs::write(&blocker, "not a directory").unwrap();

    let cache = CacheLayer::new(FileStorage::at(&blocker));
    assert!(cache.save_project("p", &sample_project()).is_err());
    assert_eq!(cache.load_project("p"), None);
  }

  #[test]
  fn test_custom_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let (cache, _) = cache_in(&dir);
    let cache = cache.with_ttl(Duration::zero());
    let key = CacheKey::UserInfo;

    cache
      .store(&key, &UserInfo::default(), Utc::now() - Duration::seconds(5))
      .unwrap();
    assert_eq!(cache.load_user_info(), None);
  }

  #[test]
  fn test_noop_cache() {
    let cache = CacheLayer::new(NoopStorage);
    cache.save_project("p", &sample_project()).unwrap();
    assert_eq!(cache.load_project("p"), None);
  }
}

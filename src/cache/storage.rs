//! Cache storage trait and file-per-key implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::traits::{CacheEntry, CacheKey, Cacheable};

const APP_DIR: &str = "cospend";
const CACHED_AT_FIELD: &str = "cached_at";

/// Trait for cache storage backends.
///
/// Backends only move opaque documents around; encoding and TTL checks live
/// in the cache layer.
pub trait CacheStorage: Send + Sync {
  /// Read the document stored under `key`, `None` if there is none.
  fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

  /// Replace the document stored under `key`.
  fn write(&self, key: &CacheKey, document: &[u8]) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when no cache directory can be determined - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn read(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>> {
    Ok(None) // Always miss
  }

  fn write(&self, _key: &CacheKey, _document: &[u8]) -> Result<()> {
    Ok(()) // Discard
  }
}

/// One JSON file per key under a cache directory.
pub struct FileStorage {
  root: PathBuf,
}

impl FileStorage {
  /// Create a storage at the default location, if one can be determined.
  pub fn open() -> Option<Self> {
    Self::default_root().map(Self::at)
  }

  /// Create a storage rooted at `root` (the directory is created lazily).
  pub fn at(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// `$XDG_CACHE_HOME/cospend`, falling back to the platform cache directory.
  pub fn default_root() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CACHE_HOME")
      .filter(|dir| !dir.is_empty())
      .map(PathBuf::from)
      .or_else(dirs::cache_dir)
      .or_else(|| dirs::home_dir().map(|p| p.join(".cache")))?;

    Some(base.join(APP_DIR))
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the file backing `key`.
  pub fn path_for(&self, key: &CacheKey) -> PathBuf {
    self.root.join(format!("{}.json", key.file_stem()))
  }

  fn ensure_dir(&self) -> Result<()> {
    fs::create_dir_all(&self.root).map_err(|e| {
      eyre!(
        "Failed to create cache directory {}: {}",
        self.root.display(),
        e
      )
    })?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      fs::set_permissions(&self.root, fs::Permissions::from_mode(0o700)).map_err(|e| {
        eyre!(
          "Failed to set permissions on {}: {}",
          self.root.display(),
          e
        )
      })?;
    }

    Ok(())
  }
}

impl CacheStorage for FileStorage {
  fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
    let path = self.path_for(key);
    match fs::read(&path) {
      Ok(data) => Ok(Some(data)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(eyre!("Failed to read cache file {}: {}", path.display(), e)),
    }
  }

  fn write(&self, key: &CacheKey, document: &[u8]) -> Result<()> {
    self.ensure_dir()?;

    let path = self.path_for(key);
    // Write next to the target and rename so readers never see a partial file
    let tmp = self
      .root
      .join(format!(".{}.{}.tmp", key.file_stem(), std::process::id()));

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt;
      options.mode(0o644);
    }

    let written = options
      .open(&tmp)
      .and_then(|mut file| file.write_all(document).and_then(|_| file.sync_all()));
    if let Err(e) = written {
      let _ = fs::remove_file(&tmp);
      return Err(eyre!("Failed to write cache file {}: {}", tmp.display(), e));
    }

    fs::rename(&tmp, &path).map_err(|e| {
      let _ = fs::remove_file(&tmp);
      eyre!("Failed to replace cache file {}: {}", path.display(), e)
    })
  }
}

/// Encode `{ "<field>": payload, "cached_at": "<RFC3339>" }`.
pub fn encode_entry<T: Cacheable>(payload: &T, cached_at: DateTime<Utc>) -> Result<Vec<u8>> {
  let mut document = Map::new();
  document.insert(
    T::payload_field().to_string(),
    serde_json::to_value(payload).map_err(|e| eyre!("Failed to serialize cache payload: {}", e))?,
  );
  document.insert(
    CACHED_AT_FIELD.to_string(),
    Value::String(cached_at.to_rfc3339()),
  );

  serde_json::to_vec_pretty(&Value::Object(document))
    .map_err(|e| eyre!("Failed to serialize cache entry: {}", e))
}

/// Decode a document written by [`encode_entry`].
pub fn decode_entry<T: Cacheable>(document: &[u8]) -> Result<CacheEntry<T>> {
  let mut fields: Map<String, Value> =
    serde_json::from_slice(document).map_err(|e| eyre!("Malformed cache entry: {}", e))?;

  let cached_at = fields
    .remove(CACHED_AT_FIELD)
    .and_then(|v| v.as_str().map(String::from))
    .ok_or_else(|| eyre!("Cache entry has no {} field", CACHED_AT_FIELD))?;
  let cached_at = DateTime::parse_from_rfc3339(&cached_at)
    .map_err(|e| eyre!("Failed to parse cache timestamp '{}': {}", cached_at, e))?
    .with_timezone(&Utc);

  let payload = fields
    .remove(T::payload_field())
    .ok_or_else(|| eyre!("Cache entry has no {} field", T::payload_field()))?;
  let payload =
    serde_json::from_value(payload).map_err(|e| eyre!("Malformed cache payload: {}", e))?;

  Ok(CacheEntry { payload, cached_at })
}

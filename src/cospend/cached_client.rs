//! Cospend client that wraps CospendClient with the local project cache.

use color_eyre::Result;

use crate::cache::CacheLayer;
use crate::config::Config;

use super::client::CospendClient;
use super::types::{Bill, NewBill, Project, ProjectSummary, UserInfo};

/// Cospend client with transparent caching of reference data.
///
/// Project snapshots and user info are served from the cache while fresh.
/// Bills, project listings and writes always go to the server.
#[derive(Clone)]
pub struct CachedCospendClient {
  inner: CospendClient,
  cache: CacheLayer,
}

impl CachedCospendClient {
  /// Create a client backed by the default cache directory.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = CospendClient::new(config)?;
    Ok(Self::with_cache(inner, CacheLayer::open()))
  }

  pub fn with_cache(inner: CospendClient, cache: CacheLayer) -> Self {
    Self { inner, cache }
  }

  /// Get a project, preferring a fresh cache entry.
  pub async fn get_project(&self, project_id: &str) -> Result<Project> {
    if let Some(project) = self.cache.load_project(project_id) {
      tracing::debug!(project_id, "Project served from cache");
      return Ok(project);
    }

    self.refresh_project(project_id).await
  }

  /// Fetch a project from the server and replace its cache entry.
  pub async fn refresh_project(&self, project_id: &str) -> Result<Project> {
    tracing::debug!(project_id, "Fetching project");
    let project = self.inner.get_project(project_id).await?;

    if let Err(e) = self.cache.save_project(project_id, &project) {
      tracing::warn!(project_id, error = %e, "Failed to cache project");
    }

    Ok(project)
  }

  /// Get the user's locale settings, preferring a fresh cache entry.
  pub async fn get_user_info(&self) -> Result<UserInfo> {
    if let Some(info) = self.cache.load_user_info() {
      tracing::debug!("User info served from cache");
      return Ok(info);
    }

    self.refresh_user_info().await
  }

  /// Fetch user info from the server and replace its cache entry.
  pub async fn refresh_user_info(&self) -> Result<UserInfo> {
    tracing::debug!("Fetching user info");
    let info = self.inner.get_user_info().await?;

    if let Err(e) = self.cache.save_user_info(&info) {
      tracing::warn!(error = %e, "Failed to cache user info");
    }

    Ok(info)
  }

  /// Get all bills (never cached).
  pub async fn get_bills(&self, project_id: &str) -> Result<Vec<Bill>> {
    self.inner.get_bills(project_id).await
  }

  /// List projects (not cached).
  pub async fn get_projects(&self) -> Result<Vec<ProjectSummary>> {
    self.inner.get_projects().await
  }

  /// Create a bill (not cached - write operation).
  pub async fn create_bill(&self, project_id: &str, bill: &NewBill) -> Result<()> {
    self.inner.create_bill(project_id, bill).await
  }

  /// Delete a bill (not cached - write operation).
  pub async fn delete_bill(&self, project_id: &str, bill_id: i64) -> Result<()> {
    self.inner.delete_bill(project_id, bill_id).await
  }
}

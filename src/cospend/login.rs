//! Nextcloud Login Flow v2.
//!
//! The server hands out a browser login URL plus a poll token. Polling the
//! endpoint answers 404 until the user grants access, then returns an app
//! password for the account.

use color_eyre::{eyre::eyre, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::normalize_url;

const USER_AGENT: &str = "Cospend CLI";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginSession {
  pub poll: PollTarget,
  /// URL the user opens to grant access
  pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollTarget {
  pub token: String,
  pub endpoint: String,
}

/// Credentials granted by a completed login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
  #[serde(default)]
  pub server: String,
  pub login_name: String,
  pub app_password: String,
}

pub struct LoginFlow {
  http: reqwest::Client,
  poll_interval: Duration,
  /// Poll tokens expire after 20 minutes
  timeout: Duration,
}

impl LoginFlow {
  pub fn new() -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(USER_AGENT)
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      poll_interval: Duration::from_secs(2),
      timeout: Duration::from_secs(20 * 60),
    })
  }

  #[cfg(test)]
  fn with_timing(mut self, poll_interval: Duration, timeout: Duration) -> Self {
    self.poll_interval = poll_interval;
    self.timeout = timeout;
    self
  }

  /// Ask the server for a login URL and poll token.
  pub async fn start(&self, domain: &str) -> Result<LoginSession> {
    let url = format!("{}/index.php/login/v2", normalize_url(domain));
    tracing::debug!(%url, "Initiating login flow");

    let response = self
      .http
      .post(&url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to initiate login flow: {}", e))?;

    if response.status() != StatusCode::OK {
      return Err(eyre!(
        "Login flow initiation failed with status {}",
        response.status().as_u16()
      ));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse login flow response: {}", e))
  }

  /// Poll until the user grants access or the token expires.
  ///
  /// Transport errors are retried; any status other than 200 or 404 aborts.
  pub async fn wait_for_credentials(&self, session: &LoginSession) -> Result<LoginCredentials> {
    let deadline = Instant::now() + self.timeout;

    while Instant::now() < deadline {
      match self.poll_once(&session.poll).await {
        Ok(Some(credentials)) => return Ok(credentials),
        Ok(None) => {}
        Err(PollError::Transport(e)) => tracing::debug!(error = %e, "Login poll failed, retrying"),
        Err(PollError::Fatal(e)) => return Err(e),
      }
      tokio::time::sleep(self.poll_interval).await;
    }

    Err(eyre!(
      "Authentication timed out ({} minutes)",
      self.timeout.as_secs() / 60
    ))
  }

  async fn poll_once(&self, target: &PollTarget) -> Result<Option<LoginCredentials>, PollError> {
    let response = self
      .http
      .post(&target.endpoint)
      .form(&[("token", target.token.as_str())])
      .send()
      .await
      .map_err(PollError::Transport)?;

    match response.status() {
      StatusCode::OK => response
        .json()
        .await
        .map(Some)
        .map_err(|e| PollError::Fatal(eyre!("Failed to parse login result: {}", e))),
      StatusCode::NOT_FOUND => Ok(None),
      status => Err(PollError::Fatal(eyre!(
        "Unexpected status during polling: {}",
        status.as_u16()
      ))),
    }
  }
}

enum PollError {
  Transport(reqwest::Error),
  Fatal(color_eyre::Report),
}

impl LoginCredentials {
  /// Server the credentials belong to, falling back to `domain` when the
  /// response omits it.
  pub fn server_or<'a>(&'a self, domain: &'a str) -> &'a str {
    if self.server.is_empty() {
      domain
    } else {
      &self.server
    }
  }
}

/// Open `url` in the default browser.
pub fn open_browser(url: &str) -> Result<()> {
  let mut command = if cfg!(target_os = "macos") {
    let mut c = std::process::Command::new("open");
    c.arg(url);
    c
  } else if cfg!(target_os = "windows") {
    let mut c = std::process::Command::new("cmd");
    c.args(["/c", "start", url]);
    c
  } else {
    let mut c = std::process::Command::new("xdg-open");
    c.arg(url);
    c
  };

  command
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
    .map(|_| ())
    .map_err(|e| eyre!("{}", e))
}

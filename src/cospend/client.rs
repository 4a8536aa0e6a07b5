use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{normalize_url, Config};
use crate::cospend::api_types::{ApiBillsResponse, OcsResponse};
use crate::cospend::types::{Bill, NewBill, Project, ProjectSummary, UserInfo};

const COSPEND_API: &[&str] = &["ocs", "v2.php", "apps", "cospend", "api", "v1", "projects"];
const USER_API: &[&str] = &["ocs", "v2.php", "cloud", "user"];

/// Cospend OCS API client
#[derive(Clone)]
pub struct CospendClient {
  http: reqwest::Client,
  base_url: Url,
  user: String,
  password: String,
}

impl CospendClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base_url = Url::parse(&normalize_url(&config.domain))
      .map_err(|e| eyre!("Invalid Nextcloud domain {}: {}", config.domain, e))?;

    if base_url.cannot_be_a_base() {
      return Err(eyre!("Invalid Nextcloud domain: {}", config.domain));
    }

    let http = reqwest::Client::builder()
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      user: config.user.clone(),
      password: config.password.clone(),
    })
  }

  /// Get a project with its members, categories, payment modes and currencies
  pub async fn get_project(&self, project_id: &str) -> Result<Project> {
    let url = self.project_url(project_id, &[])?;
    self
      .fetch(self.request(Method::GET, url))
      .await
      .map_err(|e| eyre!("Failed to get project {}: {}", project_id, e))
  }

  /// Get all projects the user has access to
  pub async fn get_projects(&self) -> Result<Vec<ProjectSummary>> {
    let url = self.endpoint(COSPEND_API)?;
    self
      .fetch(self.request(Method::GET, url))
      .await
      .map_err(|e| eyre!("Failed to get projects: {}", e))
  }

  /// Get all bills of a project
  pub async fn get_bills(&self, project_id: &str) -> Result<Vec<Bill>> {
    let url = self.project_url(project_id, &["bills"])?;
    let response: ApiBillsResponse = self
      .fetch(self.request(Method::GET, url))
      .await
      .map_err(|e| eyre!("Failed to get bills: {}", e))?;

    Ok(response.bills.into_iter().map(|bill| bill.into_bill()).collect())
  }

  /// Create a bill
  pub async fn create_bill(&self, project_id: &str, bill: &NewBill) -> Result<()> {
    let url = self.project_url(project_id, &["bills"])?;
    let form = bill_form(bill, chrono::Utc::now().timestamp());
    tracing::debug!(?form, "Bill form");

    self
      .execute(self.request(Method::POST, url).form(&form))
      .await
      .and_then(OcsResponse::ensure_ok)
      .map_err(|e| eyre!("Failed to create bill: {}", e))
  }

  /// Delete a bill
  pub async fn delete_bill(&self, project_id: &str, bill_id: i64) -> Result<()> {
    let id = bill_id.to_string();
    let url = self.project_url(project_id, &["bills", id.as_str()])?;

    self
      .execute(self.request(Method::DELETE, url))
      .await
      .and_then(OcsResponse::ensure_ok)
      .map_err(|e| eyre!("Failed to delete bill {}: {}", bill_id, e))
  }

  /// Get the authenticated user's locale settings
  pub async fn get_user_info(&self) -> Result<UserInfo> {
    let url = self.endpoint(USER_API)?;
    self
      .fetch(self.request(Method::GET, url))
      .await
      .map_err(|e| eyre!("Failed to get user info: {}", e))
  }

  fn project_url(&self, project_id: &str, rest: &[&str]) -> Result<Url> {
    let mut url = self.endpoint(COSPEND_API)?;
    url
      .path_segments_mut()
      .map_err(|_| eyre!("Invalid base URL: {}", self.base_url))?
      .push(project_id)
      .extend(rest);
    Ok(url)
  }

  /// `segments` appended to the base URL, each percent-encoded.
  fn endpoint(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| eyre!("Invalid base URL: {}", self.base_url))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    tracing::debug!(%method, %url, user = %self.user, "Request");
    self
      .http
      .request(method, url)
      .basic_auth(&self.user, Some(&self.password))
      .header("OCS-APIRequest", "true")
      .header(reqwest::header::ACCEPT, "application/json")
  }

  async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
    self.execute(request).await?.into_data()
  }

  /// Send the request and decode the OCS envelope. Non-200 HTTP statuses
  /// are errors carrying the response body.
  async fn execute(&self, request: RequestBuilder) -> Result<OcsResponse> {
    let response = request.send().await.map_err(|e| eyre!("{}", e))?;
    let status = response.status();
    tracing::debug!(%status, "Response");

    let body = response
      .text()
      .await
      .map_err(|e| eyre!("Failed to read response body: {}", e))?;

    if !status.is_success() {
      return Err(eyre!("API returned status {}: {}", status.as_u16(), body));
    }

    serde_json::from_str(&body).map_err(|e| eyre!("Failed to decode response: {}", e))
  }
}

/// Form fields for the bill creation endpoint.
fn bill_form(bill: &NewBill, timestamp: i64) -> Vec<(&'static str, String)> {
  let owed = bill
    .owed_to
    .iter()
    .map(|id| id.to_string())
    .collect::<Vec<_>>()
    .join(",");

  let mut form = vec![
    ("what", bill.what.clone()),
    ("amount", format!("{:.2}", bill.amount)),
    ("payer", bill.payer_id.to_string()),
    ("date", bill.date.clone()),
    ("timestamp", timestamp.to_string()),
    ("repeat", "n".to_string()),
    ("payedFor", owed),
  ];

  if let Some(comment) = bill.comment.as_ref().filter(|c| !c.is_empty()) {
    form.push(("comment", comment.clone()));
  }
  if let Some(id) = bill.payment_mode_id {
    form.push(("paymentmodeid", id.to_string()));
  }
  if let Some(id) = bill.category_id {
    form.push(("categoryid", id.to_string()));
  }
  if let Some(id) = bill.original_currency_id {
    form.push(("original_currency_id", id.to_string()));
  }

  form
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(domain: &str) -> CospendClient {
    CospendClient::new(&Config {
      domain: domain.into(),
      user: "alice".into(),
      password: "secret".into(),
    })
    .unwrap()
  }

  #[test]
  fn test_project_urls() {
    let client = client("cloud.example.com/");

    assert_eq!(
      client.endpoint(COSPEND_API).unwrap().as_str(),
      "https://cloud.example.com/ocs/v2.php/apps/cospend/api/v1/projects"
    );
    assert_eq!(
      client.project_url("trip", &["bills", "42"]).unwrap().as_str(),
      "https://cloud.example.com/ocs/v2.php/apps/cospend/api/v1/projects/trip/bills/42"
    );
    assert_eq!(
      client.endpoint(USER_API).unwrap().as_str(),
      "https://cloud.example.com/ocs/v2.php/cloud/user"
    );
  }

  #[test]
  fn test_project_id_is_path_escaped() {
    let client = client("https://cloud.example.com");
    let url = client.project_url("my trip/2024", &[]).unwrap();
    assert_eq!(
      url.path(),
      "/ocs/v2.php/apps/cospend/api/v1/projects/my%20trip%2F2024"
    );
  }

  #[test]
  fn test_subdirectory_install() {
    let client = client("https://example.com/nextcloud");
    assert_eq!(
      client.project_url("p", &["bills"]).unwrap().as_str(),
      "https://example.com/nextcloud/ocs/v2.php/apps/cospend/api/v1/projects/p/bills"
    );
  }

  #[test]
  fn test_invalid_domain() {
    let result = CospendClient::new(&Config {
      domain: "https://exa mple.com".into(),
      user: "u".into(),
      password: "p".into(),
    });
    assert!(result.is_err());
  }

  #[test]
  fn test_bill_form_minimal() {
    let bill = NewBill {
      what: "Coffee".into(),
      amount: 3.5,
      payer_id: 1,
      owed_to: vec![1, 2, 3],
      date: "2026-10-19".into(),
      ..Default::default()
    };

    let form = bill_form(&bill, 1_700_000_000);
    assert_eq!(
      form,
      vec![
        ("what", "Coffee".to_string()),
        ("amount", "3.50".to_string()),
        ("payer", "1".to_string()),
        ("date", "2026-10-19".to_string()),
        ("timestamp", "1700000000".to_string()),
        ("repeat", "n".to_string()),
        ("payedFor", "1,2,3".to_string()),
      ]
    );
  }

  #[test]
  fn test_bill_form_optional_fields() {
    let bill = NewBill {
      what: "Taxi".into(),
      amount: 12.346,
      payer_id: 2,
      owed_to: vec![2],
      date: "2026-10-19".into(),
      comment: Some("airport".into()),
      payment_mode_id: Some(5),
      category_id: Some(7),
      original_currency_id: Some(3),
    };

    let form = bill_form(&bill, 0);
    let get = |key: &str| {
      form
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
    };

    assert_eq!(get("amount"), Some("12.35"));
    assert_eq!(get("payedFor"), Some("2"));
    assert_eq!(get("comment"), Some("airport"));
    assert_eq!(get("paymentmodeid"), Some("5"));
    assert_eq!(get("categoryid"), Some("7"));
    assert_eq!(get("original_currency_id"), Some("3"));
  }

  #[test]
  fn test_bill_form_skips_empty_comment() {
    let bill = NewBill {
      comment: Some(String::new()),
      ..Default::default()
    };
    assert!(bill_form(&bill, 0).iter().all(|(k, _)| *k != "comment"));
  }
}

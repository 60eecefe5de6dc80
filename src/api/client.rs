use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;

use super::types::{
  ApiErrorResponse, CloneDomainPayload, CreateDomainPayload, Domain, DomainRecord, Filter,
  ImportZonePayload, InstanceType, Params, ResourcePage, UpdateDomainPayload,
};

/// Typed client for the cloud REST API.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: Url,
  token: String,
}

impl ApiClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    Self::with_token(&config.api.url, token)
  }

  /// Build a client against an explicit base URL and token.
  pub fn with_token(base_url: &str, token: String) -> Result<Self> {
    // A trailing slash keeps Url::join from replacing the last path segment
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };

    let base_url = Url::parse(&normalized)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", normalized, e))?;

    Ok(Self {
      http: reqwest::Client::new(),
      base_url,
      token,
    })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    self
      .base_url
      .join(path)
      .map_err(|e| eyre!("Invalid API path {}: {}", path, e))
  }

  /// Turn a non-2xx response into an error report carrying the API's
  /// error reasons verbatim.
  async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> color_eyre::Report {
    match response.json::<ApiErrorResponse>().await {
      Ok(body) => {
        let reasons = body
          .errors
          .iter()
          .map(ToString::to_string)
          .collect::<Vec<_>>()
          .join("; ");
        eyre!("API request failed ({}): {}", status, reasons)
      }
      Err(_) => eyre!("API request failed ({})", status),
    }
  }

  async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
      return Err(Self::api_error(status, response).await);
    }

    response
      .json::<T>()
      .await
      .map_err(|e| eyre!("Failed to parse API response: {}", e))
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    params: Option<&Params>,
    filter: Option<&Filter>,
  ) -> Result<T> {
    let mut request = self.http.get(self.endpoint(path)?).bearer_auth(&self.token);

    if let Some(params) = params {
      request = request.query(params);
    }
    if let Some(filter) = filter {
      let header = serde_json::to_string(filter)
        .map_err(|e| eyre!("Failed to serialize filter: {}", e))?;
      request = request.header("X-Filter", header);
    }

    let response = request
      .send()
      .await
      .map_err(|e| eyre!("GET {} failed: {}", path, e))?;

    Self::read_json(response).await
  }

  async fn post_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
    let response = self
      .http
      .post(self.endpoint(path)?)
      .bearer_auth(&self.token)
      .json(body)
      .send()
      .await
      .map_err(|e| eyre!("POST {} failed: {}", path, e))?;

    Self::read_json(response).await
  }

  async fn put_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
    let response = self
      .http
      .put(self.endpoint(path)?)
      .bearer_auth(&self.token)
      .json(body)
      .send()
      .await
      .map_err(|e| eyre!("PUT {} failed: {}", path, e))?;

    Self::read_json(response).await
  }

  async fn delete(&self, path: &str) -> Result<()> {
    let response = self
      .http
      .delete(self.endpoint(path)?)
      .bearer_auth(&self.token)
      .send()
      .await
      .map_err(|e| eyre!("DELETE {} failed: {}", path, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(Self::api_error(status, response).await);
    }
    Ok(())
  }

  // ==========================================================================
  // Domains
  // ==========================================================================

  /// Get one page of domains, optionally filtered.
  pub async fn get_domains(
    &self,
    params: Params,
    filter: Option<&Filter>,
  ) -> Result<ResourcePage<Domain>> {
    self.get_json("domains", Some(&params), filter).await
  }

  /// Get a single domain by id.
  pub async fn get_domain(&self, id: u64) -> Result<Domain> {
    self.get_json(&format!("domains/{}", id), None, None).await
  }

  /// Get one page of a domain's records.
  pub async fn get_domain_records(
    &self,
    domain_id: u64,
    params: Params,
  ) -> Result<ResourcePage<DomainRecord>> {
    self
      .get_json(&format!("domains/{}/records", domain_id), Some(&params), None)
      .await
  }

  pub async fn create_domain(&self, payload: &CreateDomainPayload) -> Result<Domain> {
    self.post_json("domains", payload).await
  }

  pub async fn update_domain(&self, id: u64, payload: &UpdateDomainPayload) -> Result<Domain> {
    self.put_json(&format!("domains/{}", id), payload).await
  }

  pub async fn delete_domain(&self, id: u64) -> Result<()> {
    self.delete(&format!("domains/{}", id)).await
  }

  /// Clone an existing domain's records onto a new domain.
  pub async fn clone_domain(&self, id: u64, payload: &CloneDomainPayload) -> Result<Domain> {
    self
      .post_json(&format!("domains/{}/clone", id), payload)
      .await
  }

  /// Import a zone from a remote nameserver.
  pub async fn import_zone(&self, payload: &ImportZonePayload) -> Result<Domain> {
    self.post_json("domains/import", payload).await
  }

  // ==========================================================================
  // Instance types
  // ==========================================================================

  /// Get one page of the instance type catalogue.
  pub async fn get_types(&self, params: Params) -> Result<ResourcePage<InstanceType>> {
    self.get_json("linode/types", Some(&params), None).await
  }

  /// Get a single instance type by id.
  pub async fn get_type(&self, id: &str) -> Result<InstanceType> {
    self.get_json(&format!("linode/types/{}", id), None, None).await
  }
}

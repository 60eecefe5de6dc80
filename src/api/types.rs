//! Resource types, mutation payloads and wire shapes for the cloud API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One page of a paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePage<T> {
  pub data: Vec<T>,
  pub page: u32,
  pub pages: u32,
  /// Total number of items across all pages
  pub results: u32,
}

/// Pagination parameters for list endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Params {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub page_size: Option<u32>,
}

/// List filter, sent to the API as the `X-Filter` header.
pub type Filter = serde_json::Value;

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
  pub errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorItem {
  pub reason: String,
  #[serde(default)]
  pub field: Option<String>,
}

impl fmt::Display for ApiErrorItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.field {
      Some(field) => write!(f, "{}: {}", field, self.reason),
      None => write!(f, "{}", self.reason),
    }
  }
}

// ============================================================================
// Domains
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
  Master,
  Slave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
  Active,
  Disabled,
  EditMode,
  HasErrors,
}

/// A DNS domain (zone) on the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
  pub id: u64,
  pub domain: String,
  #[serde(rename = "type")]
  pub kind: DomainType,
  pub status: DomainStatus,
  #[serde(default)]
  pub soa_email: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub master_ips: Vec<String>,
  #[serde(default)]
  pub tags: Vec<String>,
}

/// A single record within a domain's zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRecord {
  pub id: u64,
  /// Record type: A, AAAA, CNAME, MX, TXT, SRV, NS, CAA
  #[serde(rename = "type")]
  pub kind: String,
  pub name: String,
  pub target: String,
  pub ttl_sec: u32,
  #[serde(default)]
  pub priority: Option<u32>,
  #[serde(default)]
  pub weight: Option<u32>,
  #[serde(default)]
  pub port: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDomainPayload {
  pub domain: String,
  #[serde(rename = "type")]
  pub kind: DomainType,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub soa_email: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub master_ips: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDomainPayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub soa_email: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<DomainStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
}

/// Payload for cloning an existing domain's records onto a new domain name.
#[derive(Debug, Clone, Serialize)]
pub struct CloneDomainPayload {
  pub domain: String,
}

/// Payload for importing a zone from a remote nameserver via AXFR.
#[derive(Debug, Clone, Serialize)]
pub struct ImportZonePayload {
  pub domain: String,
  pub remote_nameserver: String,
}

// ============================================================================
// Instance types
// ============================================================================

/// A compute instance type from the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceType {
  pub id: String,
  pub label: String,
  /// Plan class: nanode, standard, dedicated, highmem, gpu
  pub class: String,
  pub vcpus: u32,
  /// Memory in MB
  pub memory: u32,
  /// Disk in MB
  pub disk: u32,
  /// Outbound transfer in GB
  pub transfer: u32,
  pub price: TypePrice,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypePrice {
  pub hourly: f64,
  pub monthly: f64,
}

//! Typed REST client for the cloud API.

mod client;
mod pagination;
mod types;

pub use client::ApiClient;
pub use pagination::{fetch_all, fetch_all_pages, MAX_PAGE_SIZE};
pub use types::{
  ApiErrorItem, ApiErrorResponse, CloneDomainPayload, CreateDomainPayload, Domain, DomainRecord,
  DomainStatus, DomainType, Filter, ImportZonePayload, InstanceType, Params, ResourcePage,
  TypePrice, UpdateDomainPayload,
};

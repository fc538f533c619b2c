// # Memset DNS Provider
//
// This crate provides a Memset DNS provider implementation for the DDNS system.
//
// ## Implementation
//
// - One HTTP request per trait call; retries and polling belong to the engine
// - HTTP timeout configured (30 seconds)
// - Specific error handling for HTTP status codes (401, 403, 404, 429, 5xx)
// - Zone ids, record ids and job ids are passed through as opaque strings
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider fails fast if the key is empty
//
// ## API Reference
//
// Memset JSON API, `https://api.memset.com/v1/json/<method>`. Every method is
// a POST with form-encoded parameters, authenticated with HTTP basic auth
// using the API key as user name and an empty password.
//
// - `dns.zone_domain_list`: domains and the zone each belongs to
// - `dns.zone_info {id}`: a zone and its records
// - `dns.zone_record_update {id, address}`: change one record's address
// - `dns.reload`: submit a reload job
// - `job.status {id}`: poll a job

mod wire;

use async_trait::async_trait;
use ddns_core::traits::{ReloadJob, Zone, ZoneDomain, ZoneProvider};
use ddns_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use std::time::Duration;

use wire::{ApiErrorWire, JobWire, ZoneDomainWire, ZoneWire};

/// Memset JSON API base URL
pub const MEMSET_API_BASE: &str = "https://api.memset.com/v1/json";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER: &str = "memset";

/// Memset DNS provider
///
/// Stateless; the engine decides what to fetch and when.
pub struct MemsetProvider {
    /// Memset API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// API base URL, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for MemsetProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemsetProvider")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MemsetProvider {
    /// Create a new Memset provider against the public API
    ///
    /// # Parameters
    ///
    /// - `api_key`: Memset API key with DNS read/write and job status access
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is empty or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("Memset API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: MEMSET_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `method` with form `params` and decode the JSON answer
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        tracing::debug!("Memset API call: {}", method);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.api_key, Some(""))
            .form(params)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status(method, status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("{}: failed to parse response: {}", method, e)))
    }
}

/// Map a non-2xx response to an error
///
/// The Memset error body, when present, is carried in the message.
fn map_status(method: &str, status: u16, body: &str) -> Error {
    let detail = serde_json::from_str::<ApiErrorWire>(body)
        .ok()
        .and_then(|e| e.describe())
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        401 | 403 => Error::auth(format!(
            "{}: invalid API key or insufficient permissions (HTTP {})",
            method, status
        )),
        404 => Error::not_found(format!("{}: {}", method, detail)),
        429 => Error::rate_limited(format!("{}: rate limit exceeded", method)),
        500..=599 => Error::provider(
            PROVIDER,
            format!("{}: server error (transient): {} - {}", method, status, detail),
        ),
        _ => Error::provider(PROVIDER, format!("{}: HTTP {} - {}", method, status, detail)),
    }
}

#[async_trait]
impl ZoneProvider for MemsetProvider {
    async fn list_zones(&self) -> Result<Vec<ZoneDomain>> {
        let domains: Vec<ZoneDomainWire> = self.call("dns.zone_domain_list", &[]).await?;
        Ok(domains.into_iter().map(ZoneDomain::from).collect())
    }

    async fn fetch_zone(&self, zone_id: &str) -> Result<Zone> {
        let zone: ZoneWire = self.call("dns.zone_info", &[("id", zone_id)]).await?;
        Ok(zone.into())
    }

    async fn update_record(&self, record_id: &str, address: IpAddr) -> Result<()> {
        let address = address.to_string();
        // The response echoes the updated record; only success matters
        let _: serde_json::Value = self
            .call(
                "dns.zone_record_update",
                &[("id", record_id), ("address", address.as_str())],
            )
            .await?;
        Ok(())
    }

    async fn trigger_reload(&self) -> Result<ReloadJob> {
        let job: JobWire = self.call("dns.reload", &[]).await?;
        Ok(job.into())
    }

    async fn job_status(&self, job_id: &str) -> Result<ReloadJob> {
        let job: JobWire = self.call("job.status", &[("id", job_id)]).await?;
        Ok(job.into())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// # HTTP IP Source
//
// This crate provides an HTTP-based IP source for the DDNS system.
//
// ## Architecture
//
// Fetches the current public address from plain-text echo services, one
// endpoint per address family. The IPv6 endpoint only resolves over IPv6,
// so a host without IPv6 connectivity gets a connection error for it and
// the engine carries on with IPv4 alone.
//
// One GET per lookup; no caching and no retries.

use ddns_core::traits::{IpSource, RecordType};
use ddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default IPv4 echo service
pub const DEFAULT_IPV4_URL: &str = "http://ipv4.icanhazip.com";

/// Default IPv6 echo service
pub const DEFAULT_IPV6_URL: &str = "http://ipv6.icanhazip.com";

/// Default HTTP timeout for a lookup
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP echo-service IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL returning the caller's IPv4 address
    v4_url: String,

    /// URL returning the caller's IPv6 address
    v6_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source using the default icanhazip endpoints
    pub fn new() -> Result<Self> {
        Self::with_urls(DEFAULT_IPV4_URL, DEFAULT_IPV6_URL)
    }

    /// Create a source with custom endpoints
    ///
    /// # Parameters
    ///
    /// - `v4_url`: URL answering with the caller's IPv4 address as text
    /// - `v6_url`: URL answering with the caller's IPv6 address as text
    pub fn with_urls(v4_url: impl Into<String>, v6_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            v4_url: v4_url.into(),
            v6_url: v6_url.into(),
            client,
        })
    }

    fn url_for(&self, record_type: RecordType) -> &str {
        match record_type {
            RecordType::A => &self.v4_url,
            RecordType::Aaaa => &self.v6_url,
        }
    }

    /// Fetch and parse the address from `url`
    async fn fetch_ip(&self, url: &str) -> Result<IpAddr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ip_source(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} answered HTTP {}",
                url,
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        ip_text
            .parse()
            .map_err(|_| Error::ip_source(format!("Invalid IP address from {}: {:?}", url, ip_text)))
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self, record_type: RecordType) -> Result<IpAddr> {
        let url = self.url_for(record_type);
        let ip = self.fetch_ip(url).await?;

        if !record_type.matches(&ip) {
            return Err(Error::ip_source(format!(
                "Expected {} address from {}, got: {}",
                record_type, url, ip
            )));
        }

        tracing::debug!("{} lookup via {}: {}", record_type, url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

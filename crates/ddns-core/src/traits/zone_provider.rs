// # Zone Provider Trait
//
// Defines the interface to the DNS provider's remote API: the five calls the
// reconciliation cycle makes.
//
// ## Implementations
//
// - Memset: `ddns-provider-memset` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::ZoneProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* ZoneProvider implementation */;
//
//     for domain in provider.list_zones().await? {
//         let zone = provider.fetch_zone(&domain.zone_id).await?;
//         println!("{}: {} records", domain.domain, zone.records.len());
//     }
//
//     Ok(())
// }
// ```

use crate::traits::ip_source::RecordType;
use async_trait::async_trait;
use std::net::IpAddr;

/// A zone domain registered on the account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneDomain {
    /// The domain name, e.g. `example.com`
    pub domain: String,
    /// Identifier of the zone holding the domain's records
    pub zone_id: String,
}

/// One record inside a zone
///
/// The provider owns the record; this is a copy fetched at the start of
/// reconciling one name and may be stale by the time it is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    /// Provider record identifier, stable across updates
    pub id: String,
    /// Leaf label relative to the zone (`""` for the apex)
    pub record: String,
    /// Record type tag as the provider reports it (`A`, `AAAA`, `MX`, ...)
    pub record_type: String,
    /// Current record data
    pub address: String,
}

impl ZoneRecord {
    /// Whether this record is the `record_type` record for `leaf`
    pub fn is_for(&self, leaf: &str, record_type: RecordType) -> bool {
        self.record.eq_ignore_ascii_case(leaf) && self.record_type == record_type.as_str()
    }

    /// Whether the stored address already equals `ip`
    ///
    /// Addresses are compared parsed, so `2001:db8:0::1` equals `2001:db8::1`.
    /// Data that does not parse as an address never matches.
    pub fn points_to(&self, ip: &IpAddr) -> bool {
        self.address
            .trim()
            .parse::<IpAddr>()
            .map(|stored| stored == *ip)
            .unwrap_or(false)
    }
}

/// A zone's record set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Zone {
    /// Zone identifier
    pub id: String,
    /// Records in provider order
    pub records: Vec<ZoneRecord>,
}

/// Handle on the provider's asynchronous reload job
///
/// Once `finished` is true, `error` is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadJob {
    /// Job identifier used for status polls
    pub id: String,
    /// Whether the job has completed
    pub finished: bool,
    /// Whether the job completed with an error
    pub error: bool,
}

/// Trait for DNS provider implementations
///
/// Each method is one request/response call against the provider. None of
/// them retry, cache, or decide whether an update is needed; the engine owns
/// those decisions.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// List the zone domains on the account
    async fn list_zones(&self) -> Result<Vec<ZoneDomain>, crate::Error>;

    /// Fetch the record set of zone `zone_id`
    async fn fetch_zone(&self, zone_id: &str) -> Result<Zone, crate::Error>;

    /// Set the address of record `record_id`
    async fn update_record(&self, record_id: &str, address: IpAddr) -> Result<(), crate::Error>;

    /// Submit a zone reload, returning the job handle
    async fn trigger_reload(&self) -> Result<ReloadJob, crate::Error>;

    /// Poll the status of job `job_id`
    async fn job_status(&self, job_id: &str) -> Result<ReloadJob, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

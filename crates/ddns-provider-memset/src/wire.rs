// Memset JSON API payloads
//
// Only the fields the engine reads are declared; everything else in the
// responses is ignored.

use ddns_core::traits::{ReloadJob, Zone, ZoneDomain, ZoneRecord};
use serde::{Deserialize, Deserializer};

/// Entry of `dns.zone_domain_list`
#[derive(Debug, Deserialize)]
pub(crate) struct ZoneDomainWire {
    pub domain: String,
    #[serde(deserialize_with = "id_string")]
    pub zone_id: String,
}

/// Response of `dns.zone_info`
#[derive(Debug, Deserialize)]
pub(crate) struct ZoneWire {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub records: Vec<ZoneRecordWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZoneRecordWire {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Leaf label; empty for the zone apex
    #[serde(default)]
    pub record: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub address: String,
}

/// Response of `dns.reload` and `job.status`
#[derive(Debug, Deserialize)]
pub(crate) struct JobWire {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub error: bool,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorWire {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorWire {
    /// Human-readable summary, e.g. `not_found: zone does not exist`
    pub fn describe(&self) -> Option<String> {
        match (&self.error_type, &self.error) {
            (Some(kind), Some(msg)) => Some(format!("{}: {}", kind, msg)),
            (None, Some(msg)) => Some(msg.clone()),
            (Some(kind), None) => Some(kind.clone()),
            (None, None) => None,
        }
    }
}

/// Identifiers come back as strings or integers depending on the object
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, got {}",
            other
        ))),
    }
}

impl From<ZoneDomainWire> for ZoneDomain {
    fn from(wire: ZoneDomainWire) -> Self {
        ZoneDomain {
            domain: wire.domain,
            zone_id: wire.zone_id,
        }
    }
}

impl From<ZoneRecordWire> for ZoneRecord {
    fn from(wire: ZoneRecordWire) -> Self {
        ZoneRecord {
            id: wire.id,
            record: wire.record,
            record_type: wire.record_type,
            address: wire.address,
        }
    }
}

impl From<ZoneWire> for Zone {
    fn from(wire: ZoneWire) -> Self {
        Zone {
            id: wire.id,
            records: wire.records.into_iter().map(ZoneRecord::from).collect(),
        }
    }
}

impl From<JobWire> for ReloadJob {
    fn from(wire: JobWire) -> Self {
        ReloadJob {
            id: wire.id,
            finished: wire.finished,
            error: wire.error,
        }
    }
}

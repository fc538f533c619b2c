//! Record reconciliation for one configured name
//!
//! ```text
//! list zones ──▶ match name.zone ──▶ fetch zone ──▶ for each resolved (type, ip):
//!                                                     for each record (leaf, type):
//!                                                       stored == ip  → leave
//!                                                       stored != ip  → update
//! ```
//!
//! Failures before the record scan skip the name. A failed update skips that
//! record only.

use super::context::{CycleContext, RecordChange};
use super::events::{EngineEvent, EventSink};
use crate::error::Result;
use crate::fqdn::ConfiguredName;
use crate::traits::{Zone, ZoneDomain, ZoneProvider};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Why a name was not reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The zone list call failed
    ZoneListFailed(String),
    /// The account reported no zones
    NoZones,
    /// No zone domain equals the name's parent zone
    ZoneNotFound(String),
    /// Fetching the matched zone failed
    ZoneFetchFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ZoneListFailed(e) => write!(f, "unable to retrieve zone domain list: {}", e),
            SkipReason::NoZones => write!(f, "no zone domains found"),
            SkipReason::ZoneNotFound(zone) => write!(f, "matching zone domain not found for {}", zone),
            SkipReason::ZoneFetchFailed(e) => write!(f, "unable to retrieve zone information: {}", e),
        }
    }
}

/// Result of reconciling one configured name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameOutcome {
    /// At least one record was updated
    Updated {
        changes: usize,
        failures: usize,
    },
    /// No record was updated; `failures` counts update calls that failed
    Unchanged {
        failures: usize,
    },
    /// Reconciliation could not reach the record scan
    Skipped {
        reason: SkipReason,
    },
}

impl NameOutcome {
    /// Number of records this name changed
    pub fn changes(&self) -> usize {
        match self {
            NameOutcome::Updated { changes, .. } => *changes,
            _ => 0,
        }
    }
}

/// Bring the A/AAAA records of `name` in line with `ctx.resolved`
///
/// Every record whose leaf and type match a resolved family and whose
/// address differs is updated, so A and AAAA are both corrected in the same
/// pass. Successful updates are added to `ctx.tally`.
pub(crate) async fn reconcile(
    provider: &dyn ZoneProvider,
    name: &ConfiguredName,
    ctx: &mut CycleContext,
    events: &EventSink,
) -> NameOutcome {
    let zone_id = match find_zone_id(provider, name, ctx).await {
        Ok(zone_id) => zone_id,
        Err(reason) => {
            match &reason {
                SkipReason::ZoneNotFound(_) => warn!(name = %name, "{}", reason),
                _ => error!(name = %name, "{}", reason),
            }
            events.emit(EngineEvent::NameSkipped {
                name: name.to_string(),
                reason: reason.to_string(),
            });
            return NameOutcome::Skipped { reason };
        }
    };

    let mut zone = match load_zone(provider, &zone_id, ctx).await {
        Ok(zone) => zone,
        Err(e) => {
            let reason = SkipReason::ZoneFetchFailed(e.to_string());
            error!(name = %name, zone_id = %zone_id, "{}", reason);
            events.emit(EngineEvent::NameSkipped {
                name: name.to_string(),
                reason: reason.to_string(),
            });
            return NameOutcome::Skipped { reason };
        }
    };

    let mut changes = 0;
    let mut failures = 0;
    let resolved: Vec<_> = ctx.resolved.iter().collect();

    for (record_type, ip) in resolved {
        let mut matched = false;

        for record in zone.records.iter_mut() {
            if !record.is_for(name.leaf(), record_type) {
                continue;
            }
            matched = true;

            if record.points_to(&ip) {
                info!(name = %name, %record_type, %ip, "Record up to date");
                events.emit(EngineEvent::RecordUpToDate {
                    name: name.to_string(),
                    record_type,
                    ip,
                });
                continue;
            }

            info!(
                "{} for {} is: {}, should be: {}",
                record_type, name, record.address, ip
            );

            match provider.update_record(&record.id, ip).await {
                Ok(()) => {
                    info!(name = %name, %record_type, %ip, "{} updated ({}: {})", name, record_type, ip);
                    let previous = std::mem::replace(&mut record.address, ip.to_string());
                    events.emit(EngineEvent::RecordUpdated {
                        name: name.to_string(),
                        record_type,
                        previous: previous.clone(),
                        new_ip: ip,
                    });
                    ctx.tally.record(RecordChange {
                        name: name.to_string(),
                        record_type,
                        previous,
                        current: ip,
                    });
                    changes += 1;
                }
                Err(e) => {
                    error!(name = %name, %record_type, record_id = %record.id, "Unable to update record: {}", e);
                    events.emit(EngineEvent::UpdateFailed {
                        name: name.to_string(),
                        record_type,
                        error: e.to_string(),
                    });
                    failures += 1;
                }
            }
        }

        if !matched {
            debug!(name = %name, %record_type, "No {} record for '{}' in zone", record_type, name.leaf());
        }
    }

    if let Some(cache) = ctx.cache.as_mut() {
        cache.zones.insert(zone_id, zone);
    }

    if changes > 0 {
        NameOutcome::Updated { changes, failures }
    } else {
        NameOutcome::Unchanged { failures }
    }
}

/// Match `name.zone()` against the account's zone domains; first match wins
async fn find_zone_id(
    provider: &dyn ZoneProvider,
    name: &ConfiguredName,
    ctx: &mut CycleContext,
) -> std::result::Result<String, SkipReason> {
    let domains: Vec<ZoneDomain> = match ctx.cache.as_ref().and_then(|c| c.domains.clone()) {
        Some(domains) => domains,
        None => {
            let domains = provider
                .list_zones()
                .await
                .map_err(|e| SkipReason::ZoneListFailed(e.to_string()))?;
            if let Some(cache) = ctx.cache.as_mut() {
                cache.domains = Some(domains.clone());
            }
            domains
        }
    };

    if domains.is_empty() {
        return Err(SkipReason::NoZones);
    }

    domains
        .into_iter()
        .find(|d| d.domain.eq_ignore_ascii_case(name.zone()))
        .map(|d| d.zone_id)
        .ok_or_else(|| SkipReason::ZoneNotFound(name.zone().to_string()))
}

/// Zone `zone_id`, from the cycle cache when enabled, else from the provider
///
/// A cached zone is removed from the cache while in use and put back once
/// the name is done, carrying any addresses written in between.
async fn load_zone(
    provider: &dyn ZoneProvider,
    zone_id: &str,
    ctx: &mut CycleContext,
) -> Result<Zone> {
    if let Some(zone) = ctx.cache.as_mut().and_then(|c| c.zones.remove(zone_id)) {
        debug!(zone_id, "Using cached zone");
        return Ok(zone);
    }
    provider.fetch_zone(zone_id).await
}

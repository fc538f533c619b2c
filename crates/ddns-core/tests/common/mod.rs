//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles share their state through `Arc`s, so a test can hand a clone
//! to the engine and keep the original to inspect calls afterwards.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    IpSource, Notifier, RecordType, ReloadJob, Zone, ZoneDomain, ZoneProvider, ZoneRecord,
};
use ddns_core::{DdnsConfig, ReloadConfig};
use std::collections::{HashMap, HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IP source returning fixed addresses
#[derive(Clone)]
pub struct StaticIpSource {
    v4: Arc<Mutex<Option<IpAddr>>>,
    v6: Arc<Mutex<Option<IpAddr>>>,
    /// Call counter for current(A)
    v4_calls: Arc<AtomicUsize>,
    /// Call counter for current(AAAA)
    v6_calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(v4: Option<&str>, v6: Option<&str>) -> Self {
        Self {
            v4: Arc::new(Mutex::new(v4.map(|s| s.parse().unwrap()))),
            v6: Arc::new(Mutex::new(v6.map(|s| s.parse().unwrap()))),
            v4_calls: Arc::new(AtomicUsize::new(0)),
            v6_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn v4_only(ip: &str) -> Self {
        Self::new(Some(ip), None)
    }

    /// Change the IPv4 address returned from now on
    pub fn set_v4(&self, ip: &str) {
        *self.v4.lock().unwrap() = Some(ip.parse().unwrap());
    }

    pub fn v4_calls(&self) -> usize {
        self.v4_calls.load(Ordering::SeqCst)
    }

    pub fn v6_calls(&self) -> usize {
        self.v6_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self, record_type: RecordType) -> Result<IpAddr> {
        let ip = match record_type {
            RecordType::A => {
                self.v4_calls.fetch_add(1, Ordering::SeqCst);
                *self.v4.lock().unwrap()
            }
            RecordType::Aaaa => {
                self.v6_calls.fetch_add(1, Ordering::SeqCst);
                *self.v6.lock().unwrap()
            }
        };
        ip.ok_or_else(|| Error::ip_source(format!("{} unavailable", record_type)))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// Shared state behind [`MockZoneProvider`]
#[derive(Default)]
struct ProviderState {
    domains: Vec<ZoneDomain>,
    zones: HashMap<String, Zone>,
    fail_list: bool,
    fail_fetch: HashSet<String>,
    fail_update: HashSet<String>,
    fail_trigger: bool,
    trigger_response: Option<ReloadJob>,
    status_responses: VecDeque<ReloadJob>,
    updates: Vec<(String, IpAddr)>,
}

/// A scriptable in-memory provider that tracks calls
///
/// Successful updates are written back into the stored zone, so a second
/// cycle sees the new addresses.
#[derive(Clone, Default)]
pub struct MockZoneProvider {
    state: Arc<Mutex<ProviderState>>,
    list_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    reload_calls: Arc<AtomicUsize>,
    status_calls: Arc<AtomicUsize>,
}

impl MockZoneProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add zone `domain` with id `zone_id` and its records
    pub fn with_zone(self, domain: &str, zone_id: &str, records: Vec<ZoneRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.domains.push(ZoneDomain {
                domain: domain.to_string(),
                zone_id: zone_id.to_string(),
            });
            state.zones.insert(
                zone_id.to_string(),
                Zone {
                    id: zone_id.to_string(),
                    records,
                },
            );
        }
        self
    }

    pub fn failing_list(self) -> Self {
        self.state.lock().unwrap().fail_list = true;
        self
    }

    pub fn failing_fetch(self, zone_id: &str) -> Self {
        self.state.lock().unwrap().fail_fetch.insert(zone_id.to_string());
        self
    }

    pub fn failing_update(self, record_id: &str) -> Self {
        self.state.lock().unwrap().fail_update.insert(record_id.to_string());
        self
    }

    pub fn failing_trigger(self) -> Self {
        self.state.lock().unwrap().fail_trigger = true;
        self
    }

    /// Script the reload: the trigger response, then status responses in order
    ///
    /// Once the script runs out, status calls report the job unfinished.
    pub fn with_reload_script(self, trigger: ReloadJob, statuses: Vec<ReloadJob>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.trigger_response = Some(trigger);
            state.status_responses = statuses.into();
        }
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn reload_calls(&self) -> usize {
        self.reload_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Successful updates as (record id, address)
    pub fn updates(&self) -> Vec<(String, IpAddr)> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Current stored address of record `record_id`
    pub fn address_of(&self, record_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .zones
            .values()
            .flat_map(|z| z.records.iter())
            .find(|r| r.id == record_id)
            .map(|r| r.address.clone())
    }
}

#[async_trait::async_trait]
impl ZoneProvider for MockZoneProvider {
    async fn list_zones(&self) -> Result<Vec<ZoneDomain>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail_list {
            return Err(Error::provider("mock", "zone list unavailable"));
        }
        Ok(state.domains.clone())
    }

    async fn fetch_zone(&self, zone_id: &str) -> Result<Zone> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail_fetch.contains(zone_id) {
            return Err(Error::provider("mock", "zone info unavailable"));
        }
        state
            .zones
            .get(zone_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("zone {}", zone_id)))
    }

    async fn update_record(&self, record_id: &str, address: IpAddr) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.fail_update.contains(record_id) {
            return Err(Error::provider("mock", "update rejected"));
        }
        for zone in state.zones.values_mut() {
            for record in zone.records.iter_mut().filter(|r| r.id == record_id) {
                record.address = address.to_string();
            }
        }
        state.updates.push((record_id.to_string(), address));
        Ok(())
    }

    async fn trigger_reload(&self) -> Result<ReloadJob> {
        self.reload_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail_trigger {
            return Err(Error::provider("mock", "reload rejected"));
        }
        Ok(state.trigger_response.clone().unwrap_or_else(|| finished_job("job-1")))
    }

    async fn job_status(&self, job_id: &str) -> Result<ReloadJob> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        Ok(state
            .status_responses
            .pop_front()
            .unwrap_or_else(|| pending_job(job_id)))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A notifier recording every message
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Messages delivered (or attempted) as (title, message)
    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        if self.fail {
            return Err(Error::notify("push service unavailable"));
        }
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

pub fn record(id: &str, leaf: &str, record_type: &str, address: &str) -> ZoneRecord {
    ZoneRecord {
        id: id.to_string(),
        record: leaf.to_string(),
        record_type: record_type.to_string(),
        address: address.to_string(),
    }
}

pub fn pending_job(id: &str) -> ReloadJob {
    ReloadJob {
        id: id.to_string(),
        finished: false,
        error: false,
    }
}

pub fn finished_job(id: &str) -> ReloadJob {
    ReloadJob {
        id: id.to_string(),
        finished: true,
        error: false,
    }
}

pub fn failed_job(id: &str) -> ReloadJob {
    ReloadJob {
        id: id.to_string(),
        finished: true,
        error: true,
    }
}

/// Helper to create a test config for `records`
///
/// IPv6 follows the argument; reload polls every second, at most five times.
pub fn test_config(records: &[&str], ipv6: bool) -> DdnsConfig {
    DdnsConfig::new(records.iter().copied())
        .with_ipv6(ipv6)
        .with_reload(ReloadConfig {
            poll_interval_secs: 1,
            max_polls: 5,
        })
}

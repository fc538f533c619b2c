//! Cycle-scoped state
//!
//! A [`CycleContext`] is created at the start of every cycle and dropped at
//! its end, so nothing leaks from one cycle into the next.

use crate::resolver::ResolvedAddresses;
use crate::traits::{RecordType, Zone, ZoneDomain};
use std::collections::HashMap;
use std::net::IpAddr;

/// One applied record change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    /// Configured name the record belongs to
    pub name: String,
    /// Record type that changed
    pub record_type: RecordType,
    /// Address held before the update, as the provider reported it
    pub previous: String,
    /// Address written
    pub current: IpAddr,
}

/// Record updates applied in the current cycle
///
/// Only successful updates are recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTally {
    changes: Vec<RecordChange>,
}

impl ChangeTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: RecordChange) {
        self.changes.push(change);
    }

    pub fn count(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// One `name TYPE old -> new` line per change
    pub fn summary(&self) -> String {
        self.changes
            .iter()
            .map(|c| format!("{} {} {} -> {}", c.name, c.record_type, c.previous, c.current))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_changes(self) -> Vec<RecordChange> {
        self.changes
    }
}

/// Zone data reused across names within one cycle
#[derive(Debug, Default)]
pub(crate) struct ZoneCache {
    pub(crate) domains: Option<Vec<ZoneDomain>>,
    pub(crate) zones: HashMap<String, Zone>,
}

/// State owned by one reconciliation cycle
#[derive(Debug)]
pub struct CycleContext {
    /// Addresses resolved at the start of the cycle
    pub resolved: ResolvedAddresses,
    /// Updates applied so far
    pub tally: ChangeTally,
    pub(crate) cache: Option<ZoneCache>,
}

impl CycleContext {
    /// Create a context; `cache_zones` enables reuse of zone data across names
    pub fn new(resolved: ResolvedAddresses, cache_zones: bool) -> Self {
        Self {
            resolved,
            tally: ChangeTally::new(),
            cache: cache_zones.then(ZoneCache::default),
        }
    }
}

//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the host's public address per family
//! - [`ZoneProvider`]: List zones, read and update records, reload via the provider API
//! - [`Notifier`]: Tell a human that records changed

pub mod ip_source;
pub mod zone_provider;
pub mod notifier;

pub use ip_source::{IpSource, RecordType};
pub use zone_provider::{ReloadJob, Zone, ZoneDomain, ZoneProvider, ZoneRecord};
pub use notifier::Notifier;

// # ddns-core
//
// Core library for the Memset dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the reconciliation cycle that keeps A/AAAA records
// pointed at the host's current public address:
// - **IpSource**: Trait for discovering the current public address per family
// - **ZoneProvider**: Trait wrapping the provider's zone, record and job API
// - **Notifier**: Trait for telling a human that records changed
// - **ConfiguredName**: Validated FQDN split into leaf label and parent zone
// - **DdnsEngine**: Scheduler that runs resolve → reconcile → reload on an interval
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider and IP source implementations
// 2. **Cycle-Scoped State**: Each cycle owns its own context; nothing carries over
// 3. **Idempotency**: Records already holding the resolved address are left alone
// 4. **Bounded Waits**: Reload polling gives up after a configured number of polls
// 5. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod fqdn;
pub mod resolver;

// Re-export core types for convenience
pub use traits::{IpSource, Notifier, RecordType, ZoneProvider};
pub use engine::{CycleReport, DdnsEngine, EngineEvent};
pub use config::{DdnsConfig, ReloadConfig};
pub use error::{Error, Result};
pub use fqdn::ConfiguredName;
pub use resolver::ResolvedAddresses;

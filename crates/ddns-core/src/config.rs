//! Configuration types for the DDNS system
//!
//! This module defines all configuration structures used throughout the crate.

use crate::fqdn::ConfiguredName;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Fully-qualified names to keep pointed at this host
    pub records: Vec<String>,

    /// Whether to resolve and reconcile AAAA records
    #[serde(default = "default_ipv6")]
    pub ipv6: bool,

    /// Seconds between the start of one cycle and the next
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Reload job polling
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Reuse zone listings and zone data across names within one cycle
    ///
    /// Off by default: every configured name fetches its own copy.
    #[serde(default)]
    pub cache_zones: bool,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl DdnsConfig {
    /// Create a configuration managing `records` with defaults for everything else
    pub fn new<I, S>(records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: records.into_iter().map(Into::into).collect(),
            ipv6: default_ipv6(),
            interval_secs: default_interval_secs(),
            reload: ReloadConfig::default(),
            cache_zones: false,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Enable or disable IPv6
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    /// Set the cycle interval in seconds
    pub fn with_interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Set the reload polling configuration
    pub fn with_reload(mut self, reload: ReloadConfig) -> Self {
        self.reload = reload;
        self
    }

    /// Enable or disable per-cycle zone caching
    pub fn with_cache_zones(mut self, cache_zones: bool) -> Self {
        self.cache_zones = cache_zones;
        self
    }

    /// Cycle interval
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate the configuration
    ///
    /// Every configured record must pass the hostname check; a bad name is
    /// reported as [`crate::Error::InvalidName`].
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.records.is_empty() {
            return Err(crate::Error::config("No records configured"));
        }

        if self.interval_secs == 0 {
            return Err(crate::Error::config("Interval must be > 0 seconds"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.reload.validate()?;
        ConfiguredName::parse_all(&self.records)?;

        Ok(())
    }
}

/// Reload job polling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReloadConfig {
    /// Seconds between job status polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Status polls before giving up on the job
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

impl ReloadConfig {
    /// Validate the reload configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("Reload poll interval must be > 0 seconds"));
        }
        if self.max_polls == 0 {
            return Err(crate::Error::config("Reload max polls must be > 0"));
        }
        Ok(())
    }

    /// Delay between status polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_polls: default_max_polls(),
        }
    }
}

fn default_ipv6() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    300
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_polls() -> u32 {
    120
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DdnsConfig::new(["home.example.com"]);
        assert!(config.ipv6);
        assert_eq!(config.interval_secs, 300);
        assert_eq!(config.reload.poll_interval_secs, 5);
        assert_eq!(config.reload.max_polls, 120);
        assert!(!config.cache_zones);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: DdnsConfig =
            serde_json::from_str(r#"{ "records": ["a.example.com"], "ipv6": false }"#).unwrap();
        assert!(!config.ipv6);
        assert_eq!(config.interval_secs, 300);
        assert_eq!(config.reload, ReloadConfig::default());
        assert_eq!(config.event_channel_capacity, 1000);
    }

    #[test]
    fn test_validate_rejects_empty_records() {
        let config = DdnsConfig::new(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_name() {
        let config = DdnsConfig::new(["a.example.com", "not a name"]);
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let config = DdnsConfig::new(["a.example.com"]).with_interval_secs(0);
        assert!(config.validate().is_err());

        let config = DdnsConfig::new(["a.example.com"]).with_reload(ReloadConfig {
            poll_interval_secs: 0,
            max_polls: 3,
        });
        assert!(config.validate().is_err());

        let config = DdnsConfig::new(["a.example.com"]).with_reload(ReloadConfig {
            poll_interval_secs: 5,
            max_polls: 0,
        });
        assert!(config.validate().is_err());
    }
}

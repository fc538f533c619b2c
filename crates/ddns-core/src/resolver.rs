//! Public address resolution
//!
//! Each enabled family is looked up independently through an [`IpSource`].
//! A failed family is logged and left out of the result; it never aborts the
//! other family.

use crate::traits::{IpSource, RecordType};
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::{debug, error, warn};

/// Addresses resolved for one cycle, keyed by record type
///
/// A missing key means that family failed or is disabled this cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddresses {
    inner: BTreeMap<RecordType, IpAddr>,
}

impl ResolvedAddresses {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the address for its family
    pub fn insert(&mut self, ip: IpAddr) {
        let record_type = match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        };
        self.inner.insert(record_type, ip);
    }

    /// Address for `record_type`, if resolved
    pub fn get(&self, record_type: RecordType) -> Option<IpAddr> {
        self.inner.get(&record_type).copied()
    }

    /// Resolved pairs, `A` before `AAAA`
    pub fn iter(&self) -> impl Iterator<Item = (RecordType, IpAddr)> + '_ {
        self.inner.iter().map(|(t, ip)| (*t, *ip))
    }

    /// Whether no family resolved
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of resolved families
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl FromIterator<IpAddr> for ResolvedAddresses {
    fn from_iter<I: IntoIterator<Item = IpAddr>>(iter: I) -> Self {
        let mut resolved = Self::new();
        for ip in iter {
            resolved.insert(ip);
        }
        resolved
    }
}

/// Resolve the current public addresses
///
/// IPv4 is always looked up; IPv6 only when `ipv6` is set. A source that
/// answers with the wrong family for a request is treated as a failure of
/// that family.
pub async fn resolve(source: &dyn IpSource, ipv6: bool) -> ResolvedAddresses {
    let mut resolved = ResolvedAddresses::new();

    match source.current(RecordType::A).await {
        Ok(ip) if RecordType::A.matches(&ip) => {
            debug!(source = source.source_name(), %ip, "Resolved IPv4 address");
            resolved.insert(ip);
        }
        Ok(ip) => error!(
            source = source.source_name(),
            %ip,
            "IPv4 lookup returned a non-IPv4 address"
        ),
        Err(e) => error!(source = source.source_name(), "Unable to get current IP: {}", e),
    }

    if ipv6 {
        match source.current(RecordType::Aaaa).await {
            Ok(ip) if RecordType::Aaaa.matches(&ip) => {
                debug!(source = source.source_name(), %ip, "Resolved IPv6 address");
                resolved.insert(ip);
            }
            Ok(ip) => warn!(
                source = source.source_name(),
                %ip,
                "IPv6 lookup returned a non-IPv6 address"
            ),
            Err(e) => warn!(
                source = source.source_name(),
                "IPv6 enabled but not available: {}",
                e
            ),
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSource {
        v4: Option<IpAddr>,
        v6: Option<IpAddr>,
        asked: Mutex<Vec<RecordType>>,
    }

    impl FixedSource {
        fn new(v4: Option<&str>, v6: Option<&str>) -> Self {
            Self {
                v4: v4.map(|s| s.parse().unwrap()),
                v6: v6.map(|s| s.parse().unwrap()),
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IpSource for FixedSource {
        async fn current(&self, record_type: RecordType) -> Result<IpAddr> {
            self.asked.lock().unwrap().push(record_type);
            let ip = match record_type {
                RecordType::A => self.v4,
                RecordType::Aaaa => self.v6,
            };
            ip.ok_or_else(|| Error::ip_source("unreachable"))
        }

        fn source_name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_resolves_both_families() {
        let source = FixedSource::new(Some("203.0.113.5"), Some("2001:db8::5"));
        let resolved = resolve(&source, true).await;

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get(RecordType::A), Some("203.0.113.5".parse().unwrap()));
        assert_eq!(resolved.get(RecordType::Aaaa), Some("2001:db8::5".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_ipv6_failure_keeps_ipv4() {
        let source = FixedSource::new(Some("203.0.113.5"), None);
        let resolved = resolve(&source, true).await;

        assert_eq!(resolved.len(), 1);
        assert!(resolved.get(RecordType::Aaaa).is_none());
    }

    #[tokio::test]
    async fn test_ipv4_failure_keeps_ipv6() {
        let source = FixedSource::new(None, Some("2001:db8::5"));
        let resolved = resolve(&source, true).await;

        assert_eq!(resolved.len(), 1);
        assert!(resolved.get(RecordType::A).is_none());
    }

    #[tokio::test]
    async fn test_ipv6_disabled_is_not_queried() {
        let source = FixedSource::new(Some("203.0.113.5"), Some("2001:db8::5"));
        let resolved = resolve(&source, false).await;

        assert_eq!(resolved.len(), 1);
        assert_eq!(*source.asked.lock().unwrap(), vec![RecordType::A]);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty() {
        let source = FixedSource::new(None, None);
        assert!(resolve(&source, true).await.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_family_is_dropped() {
        // Answers IPv6 when asked for IPv4
        let source = FixedSource::new(Some("2001:db8::9"), None);
        assert!(resolve(&source, false).await.is_empty());
    }

    #[test]
    fn test_iteration_order_is_a_then_aaaa() {
        let resolved: ResolvedAddresses = ["2001:db8::1", "198.51.100.7"]
            .iter()
            .map(|s| s.parse::<IpAddr>().unwrap())
            .collect();

        let types: Vec<_> = resolved.iter().map(|(t, _)| t).collect();
        assert_eq!(types, vec![RecordType::A, RecordType::Aaaa]);
    }
}

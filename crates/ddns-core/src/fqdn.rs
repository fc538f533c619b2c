//! Configured domain names
//!
//! A configured name is split at its first dot: the part before is the
//! record's leaf label inside the zone, the part after is the zone domain as
//! the provider lists it. `home.example.com` is leaf `home` in zone
//! `example.com`; `a.b.example.com` is leaf `a` in zone `b.example.com`, and
//! only reconciles if the account has a zone with exactly that name.
//!
//! DNS names are case-insensitive, so leaf and zone are kept lower-cased for
//! matching while the configured spelling is kept for display.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Longest name accepted (RFC 1035 presentation limit)
pub const MAX_NAME_LEN: usize = 253;

/// Dot-separated labels of alphanumerics with internal hyphens, a label may
/// start with `*`, ending in a 2-6 letter top-level segment.
static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9*]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,6}$")
        .expect("hostname pattern is valid")
});

/// A validated domain name supplied by the operator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfiguredName {
    raw: String,
    leaf: String,
    zone: String,
}

impl ConfiguredName {
    /// Validate `name` and split it into leaf and zone
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] when the name is longer than
    /// [`MAX_NAME_LEN`] or does not match the hostname grammar.
    pub fn parse(name: &str) -> Result<Self> {
        if name.len() > MAX_NAME_LEN {
            return Err(Error::invalid_name(
                name,
                format!("hostname exceeds {} chars ({})", MAX_NAME_LEN, name.len()),
            ));
        }

        if !HOSTNAME.is_match(name) {
            return Err(Error::invalid_name(name, "hostname format is not supported"));
        }

        // The grammar guarantees at least one dot.
        let (leaf, zone) = name
            .split_once('.')
            .ok_or_else(|| Error::invalid_name(name, "hostname has no parent zone"))?;

        Ok(Self {
            raw: name.to_string(),
            leaf: leaf.to_ascii_lowercase(),
            zone: zone.to_ascii_lowercase(),
        })
    }

    /// Validate every name in `names`, failing on the first bad one
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>> {
        names.iter().map(|n| Self::parse(n.as_ref())).collect()
    }

    /// The name exactly as configured
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Label before the first dot, lower-cased
    pub fn leaf(&self) -> &str {
        &self.leaf
    }

    /// Everything after the first dot, lower-cased
    pub fn zone(&self) -> &str {
        &self.zone
    }
}

impl fmt::Display for ConfiguredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

//! Command line and environment configuration
//!
//! Every flag has a `DDNS_*` environment fallback; flags win.

use clap::{ArgAction, Parser, ValueEnum};
use ddns_core::{DdnsConfig, ReloadConfig};
use tracing::Level;

/// Keep Memset DNS A/AAAA records pointed at this host's public address
#[derive(Debug, Parser)]
#[command(name = "ddnsd", version)]
pub struct Args {
    /// Comma-separated names to update, e.g. a.example.com,b.example.org
    ///
    /// The records must already exist in the Memset DNS manager.
    #[arg(
        short = 's',
        long = "records",
        env = "DDNS_RECORDS",
        value_name = "DOMAINLIST",
        value_delimiter = ',',
        required = true
    )]
    pub records: Vec<String>,

    /// Memset API key
    #[arg(
        short = 'a',
        long = "api-key",
        env = "DDNS_API_KEY",
        value_name = "APIKEY",
        hide_env_values = true
    )]
    pub api_key: String,

    /// Where to log; ignored when DOCKERISED is set
    #[arg(short = 'l', long = "log-dest", env = "DDNS_LOG_DEST", value_name = "LOGDEST")]
    pub log_dest: Option<LogDest>,

    /// Seconds between checks
    #[arg(
        short = 't',
        long = "interval",
        env = "DDNS_INTERVAL",
        value_name = "TIME",
        default_value_t = 300
    )]
    pub interval: u64,

    /// Enable or disable AAAA updates
    #[arg(
        long = "ipv6",
        env = "DDNS_IPV6",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub ipv6: bool,

    /// Seconds between reload job status polls
    #[arg(long, env = "DDNS_RELOAD_POLL_SECS", default_value_t = 5)]
    pub reload_poll_secs: u64,

    /// Status polls before giving up on a reload job
    #[arg(long, env = "DDNS_RELOAD_MAX_POLLS", default_value_t = 120)]
    pub reload_max_polls: u32,

    /// Fetch each zone once per cycle instead of once per name
    #[arg(long, env = "DDNS_CACHE_ZONES")]
    pub cache_zones: bool,

    /// Pushover application token
    #[arg(long, env = "DDNS_PUSHOVER_TOKEN", hide_env_values = true)]
    pub pushover_token: Option<String>,

    /// Pushover user key
    #[arg(long, env = "DDNS_PUSHOVER_USER", hide_env_values = true)]
    pub pushover_user: Option<String>,

    /// IPv4 echo service
    #[arg(long, env = "DDNS_IPV4_URL", default_value = ddns_ip_http::DEFAULT_IPV4_URL)]
    pub ipv4_url: String,

    /// IPv6 echo service
    #[arg(long, env = "DDNS_IPV6_URL", default_value = ddns_ip_http::DEFAULT_IPV6_URL)]
    pub ipv6_url: String,

    /// Memset JSON API base URL
    #[arg(long, env = "DDNS_API_URL", default_value = ddns_provider_memset::MEMSET_API_BASE)]
    pub api_url: String,

    #[arg(long, env = "DDNS_LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDest {
    Stdout,
    Syslog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Pushover credentials, present only when both halves are configured
#[derive(Debug, PartialEq, Eq)]
pub struct PushoverCredentials {
    pub token: String,
    pub user: String,
}

impl Args {
    /// Resolve the log destination
    ///
    /// Inside a container (`dockerised`) logs always go to stdout; otherwise
    /// the flag decides, defaulting to syslog.
    pub fn effective_log_dest(&self, dockerised: bool) -> LogDest {
        if dockerised {
            return LogDest::Stdout;
        }
        self.log_dest.unwrap_or(LogDest::Syslog)
    }

    /// Build the engine configuration
    ///
    /// Names are trimmed and blank entries dropped; validation is left to
    /// the engine.
    pub fn ddns_config(&self) -> DdnsConfig {
        let records = self
            .records
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty());

        DdnsConfig::new(records)
            .with_ipv6(self.ipv6)
            .with_interval_secs(self.interval)
            .with_reload(ReloadConfig {
                poll_interval_secs: self.reload_poll_secs,
                max_polls: self.reload_max_polls,
            })
            .with_cache_zones(self.cache_zones)
    }

    pub fn pushover(&self) -> anyhow::Result<Option<PushoverCredentials>> {
        match (&self.pushover_token, &self.pushover_user) {
            (Some(token), Some(user)) => Ok(Some(PushoverCredentials {
                token: token.clone(),
                user: user.clone(),
            })),
            (None, None) => Ok(None),
            _ => anyhow::bail!(
                "DDNS_PUSHOVER_TOKEN and DDNS_PUSHOVER_USER must be set together"
            ),
        }
    }
}

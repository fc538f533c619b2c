// # ddnsd - Memset DDNS Daemon
//
// Thin integration layer: all reconciliation logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Selecting the log sink (stdout or syslog)
// 3. Building the IP source, Memset provider and optional notifier
// 4. Running the DDNS engine until SIGINT/SIGTERM
//
// ## Configuration
//
// Every flag has an environment fallback (see `ddnsd --help`):
//
// - `-s` / `DDNS_RECORDS`: Comma-separated names to keep updated
// - `-a` / `DDNS_API_KEY`: Memset API key
// - `-l` / `DDNS_LOG_DEST`: `syslog` (default) or `stdout`
// - `-t` / `DDNS_INTERVAL`: Seconds between checks (default 300)
// - `--ipv6` / `DDNS_IPV6`: `true` (default) or `false`
// - `DDNS_PUSHOVER_TOKEN` + `DDNS_PUSHOVER_USER`: enable push notifications
//
// Setting `DOCKERISED` (to any value) forces logging to stdout.
//
// ## Example
//
// ```bash
// ddnsd -s home.example.com,vpn.example.org -a $MEMSET_KEY -l stdout -t 600
// ```

mod cli;
#[cfg(unix)]
mod syslog;

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::{DdnsEngine, EngineEvent};
use ddns_ip_http::HttpIpSource;
use ddns_provider_memset::MemsetProvider;
use std::env;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Args, LogDest};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Exit code for an error that ended the engine
fn exit_code_for(err: &ddns_core::Error) -> DdnsExitCode {
    if err.is_fatal() {
        DdnsExitCode::ConfigError
    } else {
        DdnsExitCode::RuntimeError
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also arrive here
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    let dockerised = env::var_os("DOCKERISED").is_some();
    let log_dest = args.effective_log_dest(dockerised);

    if let Err(e) = init_logging(log_dest, args.log_level.into()) {
        eprintln!("Failed to initialise logging: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let (engine, events) = match build_engine(&args) {
        Ok(built) => built,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("Initialised successfully");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        tokio::spawn(log_events(events));

        match engine.run().await {
            Ok(()) => {
                info!("Shutting down");
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                let code = exit_code_for(&e);
                match code {
                    DdnsExitCode::ConfigError => error!("Configuration error: {}", e),
                    _ => error!("Daemon error: {}", e),
                }
                code
            }
        }
    });

    result.into()
}

/// Install the global tracing subscriber writing to `dest`
fn init_logging(dest: LogDest, level: Level) -> Result<()> {
    match dest {
        LogDest::Stdout => {
            let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        #[cfg(unix)]
        LogDest::Syslog => {
            let writer = syslog::Syslog::connect(syslog::SYSLOG_SOCKET, "ddnsd").with_context(|| {
                format!(
                    "cannot open {}; use -l stdout to log to standard output",
                    syslog::SYSLOG_SOCKET
                )
            })?;

            // syslog adds its own timestamp; the priority carries the level
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(writer)
                .with_ansi(false)
                .without_time()
                .with_level(false)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        #[cfg(not(unix))]
        LogDest::Syslog => anyhow::bail!("syslog logging needs a unix host; use -l stdout"),
    }

    Ok(())
}

/// Wire the IP source, provider and notifier into an engine
fn build_engine(args: &Args) -> Result<(DdnsEngine, mpsc::Receiver<EngineEvent>)> {
    let config = args.ddns_config();

    let ip_source = HttpIpSource::with_urls(&args.ipv4_url, &args.ipv6_url)?;
    let provider = MemsetProvider::new(&args.api_key)?.with_base_url(&args.api_url);

    let (engine, events) = DdnsEngine::new(Box::new(ip_source), Box::new(provider), config)?;

    let engine = match args.pushover()? {
        #[cfg(feature = "pushover")]
        Some(creds) => {
            info!("Pushover notifications enabled");
            let notifier = ddns_notify_pushover::PushoverNotifier::new(creds.token, creds.user)?;
            engine.with_notifier(Box::new(notifier))
        }
        #[cfg(not(feature = "pushover"))]
        Some(_) => anyhow::bail!("built without pushover support"),
        None => engine,
    };

    Ok((engine, events))
}

/// Engine events are informational only; surface them at debug level
async fn log_events(mut events: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        debug!(?event, "engine event");
    }
}

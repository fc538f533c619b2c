//! Core DDNS engine
//!
//! The DdnsEngine runs the reconciliation cycle on a fixed interval:
//! - Resolving the host's public addresses via IpSource
//! - Reconciling each configured name's records via ZoneProvider
//! - Reloading the zone if anything changed
//! - Notifying once the reload has completed
//!
//! ## Architecture
//!
//! ```text
//!   interval tick
//!        │
//!        ▼
//! ┌─────────────┐      ┌──────────────┐      ┌──────────────┐
//! │  IpSource   │─────▶│  reconcile   │─────▶│    reload    │──▶ Notifier
//! │  (resolve)  │      │ (per name)   │      │ (if changed) │
//! └─────────────┘      └──────────────┘      └──────────────┘
//!                             │                     │
//!                             └──── ZoneProvider ───┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Re-derive leaf/zone for every configured name
//! 2. Resolve IPv4 (and IPv6 if enabled); stop if nothing resolved
//! 3. Reconcile names one at a time into a cycle-scoped tally
//! 4. If the tally is non-zero, reload and wait for the job
//! 5. On a clean reload, notify

pub mod context;
pub mod events;
pub mod reconcile;
pub mod reload;

pub use context::{ChangeTally, CycleContext, RecordChange};
pub use events::EngineEvent;
pub use reconcile::{NameOutcome, SkipReason};
pub use reload::{ReloadCoordinator, ReloadOutcome};

use crate::config::DdnsConfig;
use crate::error::Result;
use crate::fqdn::ConfiguredName;
use crate::resolver;
use crate::traits::{IpSource, Notifier, ZoneProvider};
use events::EventSink;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Title used for change notifications
pub const NOTIFICATION_TITLE: &str = "DNS records updated";

/// What became of the reload step of a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadStatus {
    /// The job ran to completion
    Finished(ReloadOutcome),
    /// The reload could not be submitted or was abandoned
    Aborted { reason: String },
}

/// Summary of one reconciliation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Per-name outcome in configuration order
    pub outcomes: Vec<(String, NameOutcome)>,
    /// Records updated this cycle
    pub changes: Vec<RecordChange>,
    /// `None` when no reload was needed
    pub reload: Option<ReloadStatus>,
}

impl CycleReport {
    /// Number of records updated
    pub fn change_count(&self) -> usize {
        self.changes.len()
    }

    /// Whether the reload ran and finished without error
    pub fn reload_succeeded(&self) -> bool {
        matches!(
            self.reload,
            Some(ReloadStatus::Finished(ReloadOutcome::Succeeded { .. }))
        )
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Optionally attach a notifier with [`DdnsEngine::with_notifier()`]
/// 3. Start with [`DdnsEngine::run()`]
/// 4. Engine runs until a shutdown signal is received or a fatal error occurs
///
/// ## Threading
///
/// Cycles never overlap: the next tick is awaited only after the previous
/// cycle returns, and names are reconciled strictly one after another.
pub struct DdnsEngine {
    /// IP source for address discovery
    ip_source: Box<dyn IpSource>,

    /// DNS provider API
    provider: Box<dyn ZoneProvider>,

    /// Optional change notifier
    notifier: Option<Box<dyn Notifier>>,

    /// Configured names, validated at construction and re-derived each cycle
    records: Vec<String>,

    /// Whether IPv6 is resolved and reconciled
    ipv6: bool,

    /// Interval between cycle starts
    interval: Duration,

    /// Reuse zone data across names within a cycle
    cache_zones: bool,

    /// Reload job handling
    reloader: ReloadCoordinator,

    /// Event sender for external monitoring
    events: EventSink,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// Fails with a configuration error if any configured name is invalid.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn ZoneProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (events, rx) = EventSink::channel(config.event_channel_capacity);

        if !config.ipv6 {
            info!("IPv6 lookups disabled");
        }

        let engine = Self {
            ip_source,
            provider,
            notifier: None,
            interval: config.interval(),
            reloader: ReloadCoordinator::new(&config.reload),
            records: config.records,
            ipv6: config.ipv6,
            cache_zones: config.cache_zones,
            events,
        };

        Ok((engine, rx))
    }

    /// Attach a notifier invoked after each cycle that changed records
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run the engine
    ///
    /// Runs a cycle immediately, then once per interval, until SIGINT or
    /// SIGTERM is received.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal (configuration) error from a cycle
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        let mut shutdown: Pin<Box<dyn Future<Output = ()> + Send + '_>> = match shutdown_rx {
            Some(rx) => Box::pin(async move {
                let _ = rx.await;
            }),
            None => Box::pin(shutdown_signal()),
        };

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Managing {} record(s), checking every {:?}",
            self.records.len(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }

            tokio::select! {
                result = self.run_cycle() => match result {
                    Ok(report) => debug!("Cycle complete: {} change(s)", report.change_count()),
                    Err(e) if e.is_fatal() => {
                        error!("Fatal error, stopping: {}", e);
                        self.events.emit(EngineEvent::Stopped { reason: e.to_string() });
                        return Err(e);
                    }
                    Err(e) => error!("Cycle failed: {}", e),
                },
                _ = &mut shutdown => break,
            }
        }

        info!("Shutdown signal received");
        self.events.emit(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        Ok(())
    }

    /// Run one reconciliation cycle to completion
    ///
    /// Transient failures are logged and reflected in the report; only a
    /// configuration error is returned as `Err`.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let names = ConfiguredName::parse_all(&self.records)?;

        self.events.emit(EngineEvent::CycleStarted { names: names.len() });

        let resolved = resolver::resolve(self.ip_source.as_ref(), self.ipv6).await;
        if resolved.is_empty() {
            warn!("No public address resolved, skipping cycle");
            self.events.emit(EngineEvent::CycleCompleted { changes: 0 });
            return Ok(CycleReport::default());
        }

        for (record_type, ip) in resolved.iter() {
            self.events.emit(EngineEvent::AddressResolved { record_type, ip });
        }

        let mut ctx = CycleContext::new(resolved, self.cache_zones);
        let mut outcomes = Vec::with_capacity(names.len());

        for name in &names {
            let outcome = reconcile::reconcile(self.provider.as_ref(), name, &mut ctx, &self.events).await;
            outcomes.push((name.to_string(), outcome));
        }

        let reload = self.reload_if_changed(&ctx).await;
        let changes = ctx.tally.into_changes();

        self.events.emit(EngineEvent::CycleCompleted {
            changes: changes.len(),
        });

        Ok(CycleReport {
            outcomes,
            changes,
            reload,
        })
    }

    /// Reload the zone if this cycle changed anything, then notify
    async fn reload_if_changed(&self, ctx: &CycleContext) -> Option<ReloadStatus> {
        if ctx.tally.is_empty() {
            return None;
        }

        let status = match self.reloader.reload(self.provider.as_ref()).await {
            Ok(ReloadOutcome::Succeeded { job_id, polls }) => {
                info!(job_id = %job_id, "DNS reload completed successfully");
                self.events.emit(EngineEvent::ReloadSucceeded {
                    job_id: job_id.clone(),
                    polls,
                });
                self.notify(ctx).await;
                ReloadStatus::Finished(ReloadOutcome::Succeeded { job_id, polls })
            }
            Ok(ReloadOutcome::JobFailed { job_id, polls }) => {
                error!(
                    job_id = %job_id,
                    "DNS reload failed: {} record update(s) are stored at the provider but not yet live",
                    ctx.tally.count()
                );
                self.events.emit(EngineEvent::ReloadFailed {
                    job_id: Some(job_id.clone()),
                    error: "reload job reported an error".to_string(),
                });
                ReloadStatus::Finished(ReloadOutcome::JobFailed { job_id, polls })
            }
            Err(e) => {
                error!(
                    "DNS reload did not complete: {}. {} record update(s) may not be live",
                    e,
                    ctx.tally.count()
                );
                let job_id = match &e {
                    crate::Error::ReloadTimeout { job_id, .. } => Some(job_id.clone()),
                    _ => None,
                };
                self.events.emit(EngineEvent::ReloadFailed {
                    job_id,
                    error: e.to_string(),
                });
                ReloadStatus::Aborted {
                    reason: e.to_string(),
                }
            }
        };

        Some(status)
    }

    async fn notify(&self, ctx: &CycleContext) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        if let Err(e) = notifier.notify(NOTIFICATION_TITLE, &ctx.tally.summary()).await {
            warn!(notifier = notifier.notifier_name(), "Failed to send notification: {}", e);
        }
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: Production daemon code should use `run()` instead,
    /// which stops on SIGTERM/SIGINT.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
                return;
            }
            Err(e) => warn!("Failed to set up SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for CTRL-C: {}", e);
        std::future::pending::<()>().await;
    }
}

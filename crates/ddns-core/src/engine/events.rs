//! Monitoring events emitted by the engine

use crate::traits::RecordType;
use std::net::IpAddr;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Events emitted by the DdnsEngine
///
/// Events are informational only; dropping the receiver does not change
/// what the engine does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A reconciliation cycle began
    CycleStarted {
        names: usize,
    },

    /// A public address was resolved for this cycle
    AddressResolved {
        record_type: RecordType,
        ip: IpAddr,
    },

    /// A record's address was changed at the provider
    RecordUpdated {
        name: String,
        record_type: RecordType,
        previous: String,
        new_ip: IpAddr,
    },

    /// A record already held the resolved address
    RecordUpToDate {
        name: String,
        record_type: RecordType,
        ip: IpAddr,
    },

    /// An update call failed
    UpdateFailed {
        name: String,
        record_type: RecordType,
        error: String,
    },

    /// A name was not reconciled this cycle
    NameSkipped {
        name: String,
        reason: String,
    },

    /// The zone reload job finished cleanly
    ReloadSucceeded {
        job_id: String,
        polls: u32,
    },

    /// The zone reload failed, was abandoned, or could not be submitted
    ReloadFailed {
        job_id: Option<String>,
        error: String,
    },

    /// A cycle ended
    CycleCompleted {
        changes: usize,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Bounded, lossy event sender
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl EventSink {
    pub(crate) fn channel(capacity: usize) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Emit an engine event, dropping it if the channel is full
    pub(crate) fn emit(&self, event: EngineEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

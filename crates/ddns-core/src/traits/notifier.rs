// # Notifier Trait
//
// Delivers a short human-readable message when a cycle changed records and
// the zone reload completed.
//
// ## Implementations
//
// - Pushover: `ddns-notify-pushover` crate

use async_trait::async_trait;

/// Trait for change notification sinks
///
/// Delivery failures are reported as errors; the engine logs them and
/// carries on. A failed notification never affects DNS state.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` with `title`
    async fn notify(&self, title: &str, message: &str) -> Result<(), crate::Error>;

    /// Get the notifier name (for logging/debugging)
    fn notifier_name(&self) -> &'static str;
}

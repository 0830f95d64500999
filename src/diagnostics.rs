//! Diagnostics Module
//!
//! Optional observation of expiry activity. Observers are called after the
//! cache lock is released and cannot affect cache behaviour.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

// == Sweep Report ==
/// Summary of one sweep pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Expired entries removed by this pass
    pub removed: usize,
    /// Entries with a TTL examined before the pass ended
    pub examined: usize,
    /// Entries left in the cache
    pub remaining_entries: usize,
    /// Entries with a TTL left in the cache
    pub remaining_expiring: usize,
    /// Wall-clock time the pass took, lock acquisition included
    pub elapsed: Duration,
    /// The time budget ran out before every entry was examined
    pub aborted: bool,
}

// == Expiry Observer ==
/// Receives expiry events from a cache.
pub trait ExpiryObserver: Send + Sync {
    /// Called after every sweep pass, background or manual.
    fn on_sweep(&self, report: &SweepReport);

    /// Called when a read reclaims an expired entry.
    fn on_lazy_expire(&self, key: &str);
}

// == Tracing Observer ==
/// Emits structured `tracing` events. Installed when diagnostics are enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ExpiryObserver for TracingObserver {
    fn on_sweep(&self, report: &SweepReport) {
        if report.removed > 0 || report.aborted {
            info!(
                removed = report.removed,
                examined = report.examined,
                entries = report.remaining_entries,
                expiring = report.remaining_expiring,
                elapsed = ?report.elapsed,
                aborted = report.aborted,
                "Cache sweep"
            );
        } else {
            debug!(
                examined = report.examined,
                entries = report.remaining_entries,
                elapsed = ?report.elapsed,
                "Cache sweep: no expired entries"
            );
        }
    }

    fn on_lazy_expire(&self, key: &str) {
        debug!(key, "Lazy clean up of expired key");
    }
}

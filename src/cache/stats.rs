//! Cache Statistics Module
//!
//! Tracks reads, lazy expirations and sweep activity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing (absent or expired)
    pub misses: u64,
    /// Entries reclaimed by a read that found them expired
    pub lazy_expirations: u64,
    /// Entries removed by sweep passes
    pub swept: u64,
    /// Completed sweep passes
    pub sweeps: u64,
    /// Sweep passes cut short by the time budget
    pub aborted_sweeps: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current number of entries carrying a TTL
    pub expiring_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Counters updated concurrently by readers and the sweep task.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    lazy_expirations: AtomicU64,
    swept: AtomicU64,
    sweeps: AtomicU64,
    aborted_sweeps: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lazy_expiration(&self) {
        self.lazy_expirations.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Sweep ==
    pub fn record_sweep(&self, removed: usize, aborted: bool) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept.fetch_add(removed as u64, Ordering::Relaxed);
        if aborted {
            self.aborted_sweeps.fetch_add(1, Ordering::Relaxed);
        }
    }

    // == Snapshot ==
    /// Builds a snapshot; entry counts come from the caller, who holds the lock.
    pub fn snapshot(&self, total_entries: usize, expiring_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            lazy_expirations: self.lazy_expirations.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            aborted_sweeps: self.aborted_sweeps.load(Ordering::Relaxed),
            total_entries,
            expiring_entries,
        }
    }
}

//! Cache Handle Module
//!
//! The public, thread-safe cache. One `RwLock` guards both maps; a background
//! task sweeps expired entries for as long as a handle is alive.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::cache::store::{CacheState, Lookup, SweepBudget};
use crate::cache::ttl::{current_timestamp_ms, Expiration};
use crate::config::CacheConfig;
use crate::diagnostics::{ExpiryObserver, SweepReport, TracingObserver};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweep_task;

/// State shared between cache handles and the sweep task.
pub(crate) struct Shared {
    state: RwLock<CacheState>,
    stats: StatsRecorder,
    observer: Option<Arc<dyn ExpiryObserver>>,
    budget: SweepBudget,
    /// Dropped with the last handle, which also stops the sweep task
    shutdown_tx: watch::Sender<bool>,
}

impl Shared {
    // == Sweep ==
    /// Runs one bounded sweep pass under the write lock.
    pub(crate) fn sweep(&self) -> SweepReport {
        let started = Instant::now();
        let now_ms = current_timestamp_ms();

        let (outcome, remaining_entries, remaining_expiring) = {
            let mut state = self.state.write();
            let outcome = state.sweep_expired(now_ms, started, self.budget);
            (outcome, state.len(), state.expiring_len())
        };

        let report = SweepReport {
            removed: outcome.removed,
            examined: outcome.examined,
            remaining_entries,
            remaining_expiring,
            elapsed: started.elapsed(),
            aborted: outcome.aborted,
        };

        self.stats.record_sweep(report.removed, report.aborted);
        if let Some(observer) = &self.observer {
            observer.on_sweep(&report);
        }
        report
    }
}

// == Cache ==
/// In-memory key/value cache with per-key TTL.
///
/// Cloning is cheap and every clone refers to the same entries. The background
/// sweep stops on [`Cache::shutdown`] or once the last clone is dropped.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use ttl_cache::{Cache, CacheConfig};
///
/// #[tokio::main]
/// async fn main() -> ttl_cache::Result<()> {
///     let cache = Cache::new(CacheConfig::default())?;
///
///     cache.set("1", "Hello World", None);
///     cache.set("2", "Hello World 2", Some(Duration::from_secs(2)));
///
///     if let Some(data) = cache.get("1") {
///         assert_eq!(&data[..], b"Hello World");
///     }
///
///     cache.del("1");
///     cache.renew("2", Some(Duration::from_secs(15)));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Cache {
    shared: Arc<Shared>,
    sweep_task: Arc<JoinHandle<()>>,
    sweep_interval: Duration,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache and starts its sweep task on the current Tokio runtime.
    ///
    /// When `config.diagnostics` is set, sweep and lazy expiry activity is
    /// logged through [`TracingObserver`].
    ///
    /// # Errors
    /// [`CacheError::RuntimeUnavailable`] when called outside a Tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        let handle = current_runtime()?;
        Ok(Self::new_in(config, &handle))
    }

    /// Creates a cache whose sweep task runs on the given runtime.
    pub fn new_in(config: CacheConfig, runtime: &Handle) -> Self {
        let observer = config
            .diagnostics
            .then(|| Arc::new(TracingObserver) as Arc<dyn ExpiryObserver>);
        Self::build(config, observer, runtime)
    }

    /// Creates a cache reporting expiry activity to `observer`, regardless of
    /// `config.diagnostics`.
    pub fn with_observer(config: CacheConfig, observer: Arc<dyn ExpiryObserver>) -> Result<Self> {
        let handle = current_runtime()?;
        Ok(Self::with_observer_in(config, observer, &handle))
    }

    /// Like [`Cache::with_observer`], with the sweep task on the given runtime.
    pub fn with_observer_in(
        config: CacheConfig,
        observer: Arc<dyn ExpiryObserver>,
        runtime: &Handle,
    ) -> Self {
        Self::build(config, Some(observer), runtime)
    }

    fn build(
        config: CacheConfig,
        observer: Option<Arc<dyn ExpiryObserver>>,
        runtime: &Handle,
    ) -> Self {
        let sweep_interval = config.effective_sweep_interval();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            state: RwLock::new(CacheState::new()),
            stats: StatsRecorder::new(),
            observer,
            budget: SweepBudget {
                max_duration: config.max_sweep_duration,
                batch_size: config.effective_batch_size(),
            },
            shutdown_tx,
        });

        let sweep_task =
            spawn_sweep_task(Arc::downgrade(&shared), sweep_interval, shutdown_rx, runtime);

        Self {
            shared,
            sweep_task: Arc::new(sweep_task),
            sweep_interval,
        }
    }

    // == Set ==
    /// Stores a value, overwriting any previous one.
    ///
    /// * `ttl = None` - no new expiration; an existing TTL on the key is kept
    /// * `ttl = Some(Duration::ZERO)` - same as [`Cache::del`]
    /// * otherwise the key expires `ttl` from now
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>, ttl: Option<Duration>) {
        self.set_or_remove(key, Some(value.into()), ttl);
    }

    /// Like [`Cache::set`], but an absent value deletes the key.
    pub fn set_or_remove(
        &self,
        key: impl Into<String>,
        value: Option<Bytes>,
        ttl: Option<Duration>,
    ) {
        let key = key.into();
        let expiration = Expiration::from_ttl(ttl);

        match value {
            Some(value) if expiration != Expiration::Immediate => {
                self.shared.state.write().insert(key, value, expiration);
            }
            _ => self.del(&key),
        }
    }

    // == Get ==
    /// Returns the value for `key`, or `None` if it is absent or expired.
    ///
    /// A read that finds the key expired also removes it.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now_ms = current_timestamp_ms();
        let lookup = self.shared.state.read().lookup(key, now_ms);

        match lookup {
            Lookup::Hit(value) => {
                self.shared.stats.record_hit();
                Some(value)
            }
            Lookup::Miss => {
                self.shared.stats.record_miss();
                None
            }
            Lookup::Expired => {
                // The key may have been renewed since the read lock was released
                let reclaimed = self.shared.state.write().remove_if_expired(key, now_ms);
                self.shared.stats.record_miss();
                if reclaimed {
                    self.shared.stats.record_lazy_expiration();
                    if let Some(observer) = &self.shared.observer {
                        observer.on_lazy_expire(key);
                    }
                }
                None
            }
        }
    }

    // == Delete ==
    /// Removes a key. Deleting an absent key is a no-op.
    pub fn del(&self, key: &str) {
        self.shared.state.write().remove(key);
    }

    // == Renew ==
    /// Replaces the expiration of an existing key.
    ///
    /// `None` makes the key permanent and `Some(Duration::ZERO)` deletes it.
    /// Absent keys are ignored.
    pub fn renew(&self, key: &str, ttl: Option<Duration>) {
        let expiration = Expiration::from_ttl(ttl);
        if expiration == Expiration::Immediate {
            self.del(key);
            return;
        }
        self.shared.state.write().renew(key, expiration);
    }

    // == Inspection ==
    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.shared.state.read().len()
    }

    /// Number of stored entries carrying a TTL.
    pub fn expiring_len(&self) -> usize {
        self.shared.state.read().expiring_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total, expiring) = {
            let state = self.shared.state.read();
            (state.len(), state.expiring_len())
        };
        self.shared.stats.snapshot(total, expiring)
    }

    /// Runs one sweep pass now, with the same time budget as the background task.
    pub fn sweep_now(&self) -> SweepReport {
        self.shared.sweep()
    }

    /// Interval the background sweep runs at, after the floor was applied.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    // == Shutdown ==
    /// Stops the background sweep for every clone of this cache.
    ///
    /// The cache stays usable; expired entries are then only reclaimed by
    /// reads and [`Cache::sweep_now`].
    pub fn shutdown(&self) {
        if self.shared.shutdown_tx.send(true).is_err() {
            debug!("Sweep task already stopped");
        }
    }

    /// Whether the background sweep task is still running.
    pub fn is_sweeping(&self) -> bool {
        !self.sweep_task.is_finished()
    }

    #[cfg(test)]
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&CacheState) -> R) -> R {
        f(&self.shared.state.read())
    }
}

fn current_runtime() -> Result<Handle> {
    Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)
}

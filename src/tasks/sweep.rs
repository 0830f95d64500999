//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::Shared;

/// Spawns the background task that sweeps expired cache entries.
///
/// The task wakes every `interval` and runs one bounded sweep pass. It only
/// holds a weak reference to the cache, and exits when the cache is gone or
/// when `true` is sent on the shutdown channel.
///
/// # Arguments
/// * `cache` - Weak reference to the shared cache state
/// * `interval` - Time between sweep passes
/// * `shutdown_rx` - Receives the shutdown signal
/// * `runtime` - Runtime the task is spawned on
///
/// A pass holds a blocking write lock for up to the sweep budget. On a
/// multi-thread runtime it runs under `block_in_place` so the worker's other
/// tasks move elsewhere; on a current-thread runtime it blocks the thread for
/// that long.
pub(crate) fn spawn_sweep_task(
    cache: Weak<Shared>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    runtime: &Handle,
) -> JoinHandle<()> {
    let flavor = runtime.runtime_flavor();

    runtime.spawn(async move {
        info!(?interval, "Starting cache sweep task");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(shared) = cache.upgrade() else {
                        break;
                    };
                    if flavor == RuntimeFlavor::MultiThread {
                        tokio::task::block_in_place(|| shared.sweep());
                    } else {
                        shared.sweep();
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Cache sweep task stopped");
    })
}

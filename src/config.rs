//! Configuration Module
//!
//! Sweep scheduling and diagnostics settings, loadable from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Sweep interval used when none is given or the given one is below the floor
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Smallest sweep interval accepted by default
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Longest a single sweep pass may hold the lock before giving up
pub const MAX_SWEEP_DURATION: Duration = Duration::from_millis(50);

/// Number of entries examined between two elapsed-time checks
pub const SWEEP_BATCH_SIZE: usize = 10_000;

/// Cache configuration parameters.
///
/// Every value can be overridden through environment variables with
/// [`CacheConfig::from_env`], or through the `with_*` builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Interval between background sweep passes
    pub sweep_interval: Duration,
    /// Intervals below this floor are replaced with [`DEFAULT_SWEEP_INTERVAL`]
    pub min_sweep_interval: Duration,
    /// Time budget of a single sweep pass
    pub max_sweep_duration: Duration,
    /// Entries examined between two budget checks
    pub sweep_batch_size: usize,
    /// Emit structured tracing events for sweeps and lazy expirations
    pub diagnostics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            min_sweep_interval: MIN_SWEEP_INTERVAL,
            max_sweep_duration: MAX_SWEEP_DURATION,
            sweep_batch_size: SWEEP_BATCH_SIZE,
            diagnostics: false,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep interval (default: 30)
    /// - `CACHE_MIN_SWEEP_INTERVAL_SECS` - Interval floor (default: 10)
    /// - `CACHE_MAX_SWEEP_MS` - Sweep time budget in milliseconds (default: 50)
    /// - `CACHE_SWEEP_BATCH_SIZE` - Entries per budget check (default: 10000)
    /// - `CACHE_DIAGNOSTICS` - `true`/`false` (default: false)
    ///
    /// Unset variables fall back to defaults; set but malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            sweep_interval: parse_var(&lookup, "CACHE_SWEEP_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            min_sweep_interval: parse_var(&lookup, "CACHE_MIN_SWEEP_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.min_sweep_interval),
            max_sweep_duration: parse_var(&lookup, "CACHE_MAX_SWEEP_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_sweep_duration),
            sweep_batch_size: parse_var(&lookup, "CACHE_SWEEP_BATCH_SIZE")?
                .unwrap_or(defaults.sweep_batch_size),
            diagnostics: parse_var(&lookup, "CACHE_DIAGNOSTICS")?
                .unwrap_or(defaults.diagnostics),
        })
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_min_sweep_interval(mut self, floor: Duration) -> Self {
        self.min_sweep_interval = floor;
        self
    }

    pub fn with_max_sweep_duration(mut self, budget: Duration) -> Self {
        self.max_sweep_duration = budget;
        self
    }

    pub fn with_sweep_batch_size(mut self, batch_size: usize) -> Self {
        self.sweep_batch_size = batch_size;
        self
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Returns the interval the sweep task will actually use.
    ///
    /// An interval below `min_sweep_interval` (or zero) is replaced by
    /// [`DEFAULT_SWEEP_INTERVAL`].
    pub fn effective_sweep_interval(&self) -> Duration {
        if self.sweep_interval.is_zero() || self.sweep_interval < self.min_sweep_interval {
            warn!(
                requested = ?self.sweep_interval,
                floor = ?self.min_sweep_interval,
                "Sweep interval below floor, using default of {:?}",
                DEFAULT_SWEEP_INTERVAL
            );
            DEFAULT_SWEEP_INTERVAL
        } else {
            self.sweep_interval
        }
    }

    /// Batch size used by the sweep; zero is treated as one.
    pub(crate) fn effective_batch_size(&self) -> usize {
        self.sweep_batch_size.max(1)
    }
}

fn parse_var<F, T>(lookup: &F, var: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig {
                var: var.to_string(),
                value: raw,
            }),
    }
}

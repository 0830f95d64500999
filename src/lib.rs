//! TTL Cache - An embeddable in-memory key/value cache
//!
//! Stores byte values with optional per-key TTLs. Expired entries are
//! reclaimed lazily by reads and by a background sweep bounded in duration.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheStats, Expiration};
pub use config::CacheConfig;
pub use diagnostics::{ExpiryObserver, SweepReport, TracingObserver};
pub use error::{CacheError, Result};

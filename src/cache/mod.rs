//! Cache Module
//!
//! Provides the concurrent in-memory cache with TTL expiration.

mod handle;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use handle::Cache;
pub use stats::CacheStats;
pub use ttl::{current_timestamp_ms, Expiration};

pub(crate) use handle::Shared;

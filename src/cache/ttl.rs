//! TTL Encoding Module
//!
//! Converts caller supplied TTLs into absolute expiry timestamps.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Expiration ==
/// Resolved expiration policy for a write or renew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// No TTL: the key never expires
    Never,
    /// Zero TTL: the key must be removed right away
    Immediate,
    /// Expires at this Unix timestamp in milliseconds
    At(u64),
}

impl Expiration {
    // == Resolve ==
    /// Resolves an optional TTL against `now_ms`.
    ///
    /// The TTL is truncated to whole milliseconds, so anything shorter than
    /// one millisecond resolves to [`Expiration::Immediate`].
    ///
    /// # Arguments
    /// * `ttl` - `None` for no expiration
    /// * `now_ms` - Current Unix timestamp in milliseconds
    pub fn resolve(ttl: Option<Duration>, now_ms: u64) -> Self {
        let Some(ttl) = ttl else {
            return Expiration::Never;
        };

        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if ttl_ms == 0 {
            Expiration::Immediate
        } else {
            Expiration::At(now_ms.saturating_add(ttl_ms))
        }
    }

    /// Resolves an optional TTL against the current wall clock.
    pub fn from_ttl(ttl: Option<Duration>) -> Self {
        Self::resolve(ttl, current_timestamp_ms())
    }
}

// == Is Expired ==
/// An entry is expired once the current time reaches its expiry timestamp.
#[inline]
pub fn is_expired(expires_at: u64, now_ms: u64) -> bool {
    now_ms >= expires_at
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the Unix epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

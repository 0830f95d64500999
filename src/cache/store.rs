//! Cache Store Module
//!
//! Unsynchronised cache state: a value map plus an expiry map sharing one key
//! domain. Locking is the caller's job (see [`crate::cache::Cache`]).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::cache::ttl::{is_expired, Expiration};

// == Lookup ==
/// Outcome of a read against the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lookup {
    Hit(Bytes),
    Miss,
    /// Present but logically expired; the caller decides whether to reclaim it
    Expired,
}

// == Sweep Budget ==
/// Limits on a single sweep pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SweepBudget {
    pub max_duration: Duration,
    pub batch_size: usize,
}

// == Sweep Outcome ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SweepOutcome {
    pub removed: usize,
    pub examined: usize,
    pub aborted: bool,
}

// == Cache State ==
/// Values and expiry timestamps.
///
/// Every key in `expirations` is also in `items`; a key only in `items`
/// never expires.
#[derive(Debug, Default)]
pub(crate) struct CacheState {
    /// Stored values
    items: HashMap<String, Bytes>,
    /// Expiry timestamps (Unix milliseconds)
    expirations: HashMap<String, u64>,
}

impl CacheState {
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores a value under a resolved expiration.
    ///
    /// `Never` leaves any existing expiry untouched, so overwriting a key
    /// that already has a TTL keeps that TTL.
    pub fn insert(&mut self, key: String, value: Bytes, expiration: Expiration) {
        match expiration {
            Expiration::Immediate => {
                self.remove(&key);
            }
            Expiration::Never => {
                self.items.insert(key, value);
            }
            Expiration::At(expires_at) => {
                self.items.insert(key.clone(), value);
                self.expirations.insert(key, expires_at);
            }
        }
    }

    // == Lookup ==
    pub fn lookup(&self, key: &str, now_ms: u64) -> Lookup {
        if let Some(&expires_at) = self.expirations.get(key) {
            if is_expired(expires_at, now_ms) {
                return Lookup::Expired;
            }
        }

        match self.items.get(key) {
            Some(value) => Lookup::Hit(value.clone()),
            None => Lookup::Miss,
        }
    }

    // == Remove ==
    /// Removes a key from both maps. Returns whether a value was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.expirations.remove(key);
        self.items.remove(key).is_some()
    }

    // == Remove If Expired ==
    /// Removes the key only if it is still expired at `now_ms`.
    pub fn remove_if_expired(&mut self, key: &str, now_ms: u64) -> bool {
        match self.expirations.get(key) {
            Some(&expires_at) if is_expired(expires_at, now_ms) => {
                self.remove(key);
                true
            }
            _ => false,
        }
    }

    // == Renew ==
    /// Replaces the expiration of an existing key.
    ///
    /// Returns false when the key is absent; renew never creates a value.
    pub fn renew(&mut self, key: &str, expiration: Expiration) -> bool {
        if expiration == Expiration::Immediate {
            return self.remove(key);
        }
        if !self.items.contains_key(key) {
            return false;
        }

        match expiration {
            Expiration::At(expires_at) => {
                self.expirations.insert(key.to_string(), expires_at);
            }
            _ => {
                self.expirations.remove(key);
            }
        }
        true
    }

    // == Sweep Expired ==
    /// Removes expired entries, stopping early once the budget is spent.
    ///
    /// Elapsed time since `started` is checked after every `batch_size`
    /// examined entries. Once it exceeds `max_duration` the walk stops right
    /// there; unexamined entries are left for the next pass or for lazy
    /// expiration. Expired keys found by the walk are removed before returning.
    pub fn sweep_expired(
        &mut self,
        now_ms: u64,
        started: Instant,
        budget: SweepBudget,
    ) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        let mut since_check = 0usize;
        let mut expired = Vec::new();

        for (key, &expires_at) in &self.expirations {
            outcome.examined += 1;
            if is_expired(expires_at, now_ms) {
                expired.push(key.clone());
            }

            since_check += 1;
            if since_check >= budget.batch_size {
                since_check = 0;
                if started.elapsed() > budget.max_duration {
                    outcome.aborted = true;
                    break;
                }
            }
        }

        for key in &expired {
            self.expirations.remove(key);
            self.items.remove(key);
        }
        outcome.removed = expired.len();

        outcome
    }

    // == Length ==
    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of values carrying a TTL.
    pub fn expiring_len(&self) -> usize {
        self.expirations.len()
    }

    #[cfg(test)]
    pub fn expires_at(&self, key: &str) -> Option<u64> {
        self.expirations.get(key).copied()
    }

    /// Every expiring key has a value.
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        self.expirations.keys().all(|key| self.items.contains_key(key))
    }
}

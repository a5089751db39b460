// src/cache.rs
//! Recent-content cache of exact signatures.
//!
//! Thread-safe: one mutex guards lookups, inserts and resets, so a lookup can
//! never observe a half-applied reset. Critical sections are short and do no I/O.
//!
//! Expiry modes:
//! - `FullReset` (default): once the TTL has elapsed since the last reset, the
//!   whole set is cleared in one go. Entries inserted just before a reset are
//!   forgotten together with old ones.
//! - `PerEntry`: every signature carries its insertion time and expires on its own.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::signature::Digest128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheExpiry {
    #[default]
    FullReset,
    PerEntry,
}

#[derive(Debug)]
struct CacheState {
    /// signature → insertion time
    entries: HashMap<Digest128, DateTime<Utc>>,
    last_reset: DateTime<Utc>,
}

#[derive(Debug)]
pub struct RecentContentCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    expiry: CacheExpiry,
    clock: Arc<dyn Clock>,
    /// Scratch copies stay off the process-wide metric series.
    instrumented: bool,
}

impl RecentContentCache {
    pub fn new(ttl: Duration, expiry: CacheExpiry, clock: Arc<dyn Clock>) -> Self {
        let ttl = if ttl <= Duration::zero() {
            Duration::seconds(1)
        } else {
            ttl
        };
        let now = clock.now();
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                last_reset: now,
            }),
            ttl,
            expiry,
            clock,
            instrumented: true,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn expiry(&self) -> CacheExpiry {
        self.expiry
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// False for scratch copies made by [`snapshot`](Self::snapshot).
    pub fn is_instrumented(&self) -> bool {
        self.instrumented
    }

    /// True if `sig` is cached and (in per-entry mode) not yet expired.
    pub fn contains(&self, sig: &Digest128) -> bool {
        let now = self.clock.now();
        let state = self.state.lock();
        match state.entries.get(sig) {
            None => false,
            Some(&inserted) => match self.expiry {
                CacheExpiry::FullReset => true,
                CacheExpiry::PerEntry => now - inserted <= self.ttl,
            },
        }
    }

    /// Insert `sig`. Returns `false` if a live entry was already present,
    /// which lets callers detect that a concurrent batch got there first.
    pub fn insert(&self, sig: Digest128) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let fresh = match state.entries.get(&sig) {
            None => true,
            Some(&inserted) => {
                self.expiry == CacheExpiry::PerEntry && now - inserted > self.ttl
            }
        };
        if fresh {
            state.entries.insert(sig, now);
        }
        if fresh && self.instrumented {
            gauge!("volume_reducer_cache_size").set(state.entries.len() as f64);
        }
        fresh
    }

    /// TTL housekeeping, called at the start of every batch.
    ///
    /// Full-reset mode clears everything once the TTL has elapsed since the last
    /// reset; per-entry mode evicts only the expired entries. Returns the number
    /// of entries dropped.
    pub fn reset_if_stale(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();

        let dropped = match self.expiry {
            CacheExpiry::FullReset => {
                if now - state.last_reset <= self.ttl {
                    return 0;
                }
                let n = state.entries.len();
                state.entries.clear();
                state.last_reset = now;
                n
            }
            CacheExpiry::PerEntry => {
                let before = state.entries.len();
                let ttl = self.ttl;
                state.entries.retain(|_, inserted| now - *inserted <= ttl);
                state.last_reset = now;
                before - state.entries.len()
            }
        };

        if self.instrumented && (self.expiry == CacheExpiry::FullReset || dropped > 0) {
            counter!("volume_reducer_cache_resets_total").increment(1);
            gauge!("volume_reducer_cache_size").set(state.entries.len() as f64);
            info!(target: "cache", dropped, mode = ?self.expiry, "cleaned up deduplication cache");
        }
        dropped
    }

    /// Drop everything immediately, regardless of TTL.
    pub fn clear(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.entries.clear();
        state.last_reset = now;
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_reset(&self) -> DateTime<Utc> {
        self.state.lock().last_reset
    }

    /// Independent copy with the same contents, TTL and clock. The copy
    /// records no metrics and logs no housekeeping.
    pub fn snapshot(&self) -> Self {
        let state = self.state.lock();
        Self {
            state: Mutex::new(CacheState {
                entries: state.entries.clone(),
                last_reset: state.last_reset,
            }),
            ttl: self.ttl,
            expiry: self.expiry,
            clock: self.clock.clone(),
            instrumented: false,
        }
    }
}

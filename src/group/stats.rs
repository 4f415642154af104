//! Group Statistics Module
//!
//! Lock-free counters describing how a group answered its requests.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

// == Group Stats ==
/// Per-group counters, updated concurrently by every caller.
#[derive(Debug, Default)]
pub struct GroupStats {
    /// Any `get` with a non-empty key
    pub gets: Counter,
    /// Served straight from the local store
    pub cache_hits: Counter,
    /// Values fetched from a remote peer
    pub peer_loads: Counter,
    /// Failed remote fetches (each followed by a local load)
    pub peer_errors: Counter,
    /// Misses handed to the coalescer
    pub loads: Counter,
    /// Loads that actually ran after coalescing
    pub loads_deduped: Counter,
    /// Successful source-of-truth loads
    pub local_loads: Counter,
    /// Failed source-of-truth loads
    pub local_load_errs: Counter,
    /// Requests that arrived from other peers
    pub server_requests: Counter,
}

impl GroupStats {
    pub fn snapshot(&self) -> GroupStatsSnapshot {
        GroupStatsSnapshot {
            gets: self.gets.get(),
            cache_hits: self.cache_hits.get(),
            peer_loads: self.peer_loads.get(),
            peer_errors: self.peer_errors.get(),
            loads: self.loads.get(),
            loads_deduped: self.loads_deduped.get(),
            local_loads: self.local_loads.get(),
            local_load_errs: self.local_load_errs.get(),
            server_requests: self.server_requests.get(),
        }
    }
}

/// Point-in-time copy of [`GroupStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStatsSnapshot {
    pub gets: u64,
    pub cache_hits: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub loads: u64,
    pub loads_deduped: u64,
    pub local_loads: u64,
    pub local_load_errs: u64,
    pub server_requests: u64,
}

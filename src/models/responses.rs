//! Response DTOs for the node's JSON endpoints
//!
//! Defines the structure of outgoing stats and health bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::group::GroupStatsSnapshot;

/// One entry of the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group name
    pub group: String,
    /// Group-level counters
    pub group_stats: GroupStatsSnapshot,
    /// Local store counters
    pub cache: CacheStats,
    /// Local store hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a group's statistics
    pub fn new(
        group: impl Into<String>,
        group_stats: GroupStatsSnapshot,
        cache: CacheStats,
    ) -> Self {
        let hit_rate = cache.hit_rate();
        Self {
            group: group.into(),
            group_stats,
            cache,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

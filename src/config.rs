//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;

use crate::peers::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// This node's own peer address, as listed in `peers`
    pub self_addr: String,
    /// Every peer in the cluster, this node included
    pub peers: Vec<String>,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Path prefix of the peer cache endpoint
    pub base_path: String,
    /// HTTP server port
    pub server_port: u16,
    /// Name of the group served by this node
    pub group_name: String,
    /// Local store capacity in bytes (0 = unlimited)
    pub cache_bytes: usize,
    /// Timeout for a single peer fetch, in milliseconds
    pub peer_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SELF_ADDR` - This node's peer URL (default: http://localhost:8001)
    /// - `PEERS` - Comma-separated peer URLs (default: `SELF_ADDR` only)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `BASE_PATH` - Peer endpoint prefix (default: /_peercache/)
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `GROUP_NAME` - Group served by this node (default: scores)
    /// - `CACHE_BYTES` - Local store capacity (default: 2048)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let self_addr = env::var("SELF_ADDR").unwrap_or(defaults.self_addr);
        let peers = env::var("PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            self_addr,
            peers,
            replicas: env::var("REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.replicas),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
            cache_bytes: env::var("CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_bytes),
            peer_timeout_ms: env::var("PEER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.peer_timeout_ms),
        }
    }
}

/// Splits a comma-separated peer list, dropping blanks.
pub fn parse_peers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        let self_addr = "http://localhost:8001".to_string();
        Self {
            peers: vec![self_addr.clone()],
            self_addr,
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            server_port: 8001,
            group_name: "scores".to_string(),
            cache_bytes: 2 << 10,
            peer_timeout_ms: 2000,
        }
    }
}

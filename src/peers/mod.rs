//! Peer Module
//!
//! Routing of keys to the peer that owns them, and the HTTP client used to
//! fetch values from that peer.
//!
//! # Components
//! - [`PeerPicker`]: chooses the owner of a key
//! - [`PeerGetter`]: fetches one key from one remote peer
//! - [`HttpPool`]: consistent-hash picker backed by HTTP getters

mod client;
mod pool;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FetchRequest, FetchResponse};

pub use client::HttpGetter;
pub(crate) use pool::normalize_base_path;
pub use pool::{HttpPool, PoolOptions, DEFAULT_BASE_PATH, DEFAULT_REPLICAS};

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the remote owner of `key`, or `None` when this node owns it
    /// (or no peers are configured).
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches values from a single remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, req: &FetchRequest) -> Result<FetchResponse>;

    /// Address of the peer, for logging.
    fn addr(&self) -> &str;
}

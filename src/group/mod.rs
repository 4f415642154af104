//! Group Module
//!
//! A group is a named cache namespace: a bounded local store, a
//! source-of-truth loader, optional peer routing and a request coalescer.
//!
//! # Get
//! 1. Reject an empty key.
//! 2. Serve from the local store on a hit.
//! 3. Otherwise, once per key across concurrent callers:
//!    - ask the owning peer, if the ring names one other than this node;
//!      a peer value is returned but never stored locally
//!    - on peer failure, or when this node owns the key, run the loader and
//!      store its value locally

mod loader;
mod registry;
mod stats;

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, LocalStore};
use crate::error::{CacheError, Result};
use crate::flight::Flight;
use crate::models::FetchRequest;
use crate::peers::{PeerGetter, PeerPicker};

pub use loader::{loader_fn, Loader, LoaderFn};
pub use registry::GroupRegistry;
pub use stats::{Counter, GroupStats, GroupStatsSnapshot};

// == Group ==
pub struct Group {
    name: String,
    loader: Box<dyn Loader>,
    store: LocalStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: Flight<Result<ByteView>>,
    stats: GroupStats,
}

impl Group {
    // == Constructor ==
    /// Creates a group whose local store holds at most `cache_bytes`
    /// (0 = unlimited).
    ///
    /// Groups are normally created through [`GroupRegistry::new_group`] so the
    /// peer server can find them.
    pub fn new(
        name: impl Into<String>,
        cache_bytes: usize,
        loader: impl Loader + 'static,
    ) -> Self {
        Self::with_store(name, LocalStore::new(cache_bytes), loader)
    }

    /// Creates a group around a preconfigured store (e.g. one with an
    /// eviction hook).
    pub fn with_store(
        name: impl Into<String>,
        store: LocalStore,
        loader: impl Loader + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            loader: Box::new(loader),
            store,
            peers: OnceLock::new(),
            flight: Flight::new(),
            stats: GroupStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Attaches the peer picker used to route misses.
    ///
    /// # Panics
    /// Panics if peers were already registered for this group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    // == Get ==
    /// Returns the value for `key`, from the local store, the owning peer, or
    /// the loader.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        self.stats.gets.incr();

        if let Some(value) = self.store.get(key) {
            self.stats.cache_hits.incr();
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.stats.loads.incr();
        self.flight
            .work(key, || async {
                self.stats.loads_deduped.incr();

                if let Some(peer) = self.peers.get().and_then(|p| p.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            self.stats.peer_loads.incr();
                            return Ok(value);
                        }
                        Err(err) => {
                            self.stats.peer_errors.incr();
                            warn!(
                                group = %self.name,
                                key,
                                peer = peer.addr(),
                                error = %err,
                                "failed to get from peer, loading locally"
                            );
                        }
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let req = FetchRequest::new(self.name.as_str(), key);
        let res = peer.get(&req).await?;
        Ok(ByteView::from(res.value))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = match self.loader.load(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.local_load_errs.incr();
                return Err(CacheError::loader(err));
            }
        };
        self.stats.local_loads.incr();

        // the loader handed over ownership, nobody else can mutate these bytes
        let value = ByteView::from(bytes);
        self.store.add(key, value.clone());
        Ok(value)
    }

    /// Counts a request that arrived through the peer server.
    pub fn record_server_request(&self) {
        self.stats.server_requests.incr();
    }

    pub fn stats(&self) -> GroupStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Checks the local store without touching recency or statistics.
    pub fn is_cached(&self, key: &str) -> bool {
        self.store.contains(key)
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("store", &self.store)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

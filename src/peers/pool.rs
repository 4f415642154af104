//! HTTP peer pool.
//!
//! Owns the consistent-hash ring over all peers plus one [`HttpGetter`] per
//! peer. Reconfiguration builds a complete new peer set and swaps it in, so a
//! concurrent `pick_peer` sees either the old ring or the new one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::info;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::peers::{HttpGetter, PeerGetter, PeerPicker};
use crate::ring::{HashFn, HashRing};

/// Path prefix of the peer cache endpoint.
pub const DEFAULT_BASE_PATH: &str = "/_peercache/";

/// Virtual nodes per physical peer.
pub const DEFAULT_REPLICAS: usize = 50;

const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(2);

// == Pool Options ==
/// Tuning for an [`HttpPool`].
#[derive(Clone)]
pub struct PoolOptions {
    /// Path prefix of the cache endpoint, on this node and on its peers
    pub base_path: String,
    /// Virtual nodes per peer
    pub replicas: usize,
    /// Timeout for one peer fetch
    pub peer_timeout: Duration,
    /// Ring hash; xxh3 when `None`
    pub hash: Option<HashFn>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            peer_timeout: DEFAULT_PEER_TIMEOUT,
            hash: None,
        }
    }
}

impl From<&Config> for PoolOptions {
    fn from(config: &Config) -> Self {
        Self {
            base_path: config.base_path.clone(),
            replicas: config.replicas,
            peer_timeout: Duration::from_millis(config.peer_timeout_ms),
            hash: None,
        }
    }
}

/// Ensures the path starts and ends with `/`.
pub(crate) fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[derive(Debug)]
struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Consistent-hash [`PeerPicker`] over HTTP peers.
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    hash: Option<HashFn>,
    client: reqwest::Client,
    peers: RwLock<Arc<PeerSet>>,
}

impl HttpPool {
    /// Creates a pool for the node reachable at `self_addr` (e.g.
    /// `http://10.0.0.1:8001`). The pool starts with no peers.
    pub fn new(self_addr: impl Into<String>, options: PoolOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.peer_timeout)
            .build()
            .map_err(|e| CacheError::Internal(format!("building peer client: {e}")))?;

        let empty = PeerSet {
            ring: HashRing::new(options.replicas, options.hash.clone()),
            getters: HashMap::new(),
        };

        Ok(Self {
            self_addr: self_addr.into(),
            base_path: normalize_base_path(&options.base_path),
            replicas: options.replicas,
            hash: options.hash,
            client,
            peers: RwLock::new(Arc::new(empty)),
        })
    }

    // == Set ==
    /// Replaces the whole peer list. `peers` should include this node.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();

        let mut ring = HashRing::new(self.replicas, self.hash.clone());
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(peer.as_str(), &self.base_path, self.client.clone());
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.write() = Arc::new(PeerSet { ring, getters });
        info!(self_addr = %self.self_addr, peers = ?peers, "peer set updated");
    }

    /// Address the ring assigns `key` to, this node included.
    pub fn owner(&self, key: &str) -> Option<String> {
        self.snapshot().ring.get(key).map(str::to_string)
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn snapshot(&self) -> Arc<PeerSet> {
        Arc::clone(&self.peers.read())
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.snapshot();
        let owner = peers.ring.get(key)?;
        if owner == self.self_addr {
            return None;
        }
        info!(self_addr = %self.self_addr, peer = owner, key, "pick peer");
        peers
            .getters
            .get(owner)
            .map(|getter| Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPool")
            .field("self_addr", &self.self_addr)
            .field("base_path", &self.base_path)
            .field("replicas", &self.replicas)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    const SELF: &str = "http://127.0.0.1:8001";
    const OTHER: &str = "http://127.0.0.1:8002";

    fn pool() -> HttpPool {
        HttpPool::new(SELF, PoolOptions::default()).unwrap()
    }

    /// Finds a key the ring assigns to `addr`.
    fn key_owned_by(pool: &HttpPool, addr: &str) -> String {
        (0..10_000)
            .map(|i| format!("key{i}"))
            .find(|key| pool.owner(key).as_deref() == Some(addr))
            .expect("some key should map to every peer")
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/_peercache/"), "/_peercache/");
        assert_eq!(normalize_base_path("_peercache"), "/_peercache/");
        assert_eq!(normalize_base_path("/a/b"), "/a/b/");
        assert_eq!(normalize_base_path(""), "/");
    }

    #[test]
    fn test_no_peers_picks_nothing() {
        let pool = pool();
        assert!(pool.pick_peer("Tom").is_none());
        assert!(pool.owner("Tom").is_none());
    }

    #[test]
    fn test_self_owned_key_is_not_picked() {
        let pool = pool();
        pool.set([SELF, OTHER]);

        let key = key_owned_by(&pool, SELF);
        assert!(pool.pick_peer(&key).is_none());
    }

    #[test]
    fn test_remote_key_is_picked() {
        let pool = pool();
        pool.set([SELF, OTHER]);

        let key = key_owned_by(&pool, OTHER);
        let peer = pool.pick_peer(&key).expect("remote owner");
        assert_eq!(peer.addr(), OTHER);
    }

    #[test]
    fn test_set_replaces_previous_peers() {
        let pool = pool();
        pool.set([OTHER]);
        assert_eq!(pool.owner("Tom").as_deref(), Some(OTHER));

        pool.set([SELF]);
        assert_eq!(pool.owner("Tom").as_deref(), Some(SELF));
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn test_set_swaps_ring_atomically_under_readers() {
        const A: &str = "http://127.0.0.1:9001";
        const B: &str = "http://127.0.0.1:9002";

        let pool = Arc::new(pool());
        pool.set([A]);
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let pool = Arc::clone(&pool);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for _ in 0..500 {
                    pool.set([A]);
                    pool.set([B]);
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|r| {
                let pool = Arc::clone(&pool);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut i = 0u64;
                    while !done.load(Ordering::SeqCst) {
                        let key = format!("key{r}-{i}");
                        let owner = pool.owner(&key).expect("ring is never empty");
                        assert!(owner == A || owner == B, "unexpected owner {owner}");

                        // ring and getters come from one peer set
                        let peer = pool.pick_peer(&key).expect("owner has a getter");
                        assert!(peer.addr() == A || peer.addr() == B);
                        i += 1;
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(pool.owner("Tom").as_deref(), Some(B));
    }

    #[test]
    fn test_pool_from_config() {
        let config = Config {
            base_path: "cache".to_string(),
            replicas: 7,
            peer_timeout_ms: 150,
            ..Config::default()
        };
        let options = PoolOptions::from(&config);
        assert_eq!(options.replicas, 7);
        assert_eq!(options.peer_timeout, Duration::from_millis(150));

        let pool = HttpPool::new(&config.self_addr, options).unwrap();
        assert_eq!(pool.base_path(), "/cache/");
        assert_eq!(pool.self_addr(), config.self_addr);
    }
}

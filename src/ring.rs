//! Consistent Hash Ring
//!
//! Maps keys to peer addresses. Every physical peer is placed on the ring
//! `replicas` times; a key belongs to the first virtual node at or after its
//! own hash, wrapping around to the start of the ring.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Hash function used to place peers and keys on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u64 + Send + Sync>;

/// Default hash: xxh3, 64 bit.
pub fn default_hash() -> HashFn {
    Arc::new(xxhash_rust::xxh3::xxh3_64)
}

// == Hash Ring ==
/// Sorted ring of virtual node hashes with a reverse map to physical peers.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    keys: Vec<u64>,
    owners: HashMap<u64, String>,
}

impl HashRing {
    /// Creates an empty ring placing each peer `replicas` times.
    ///
    /// `hash` defaults to [`default_hash`]. A replica count of 0 is treated as 1.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(default_hash),
            replicas: replicas.max(1),
            keys: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Places every address on the ring.
    ///
    /// Virtual node `i` of `addr` sits at `hash("{i}{addr}")`. When two virtual
    /// nodes collide, the one added first keeps the position.
    pub fn add<I, S>(&mut self, addrs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for addr in addrs {
            let addr = addr.as_ref();
            for i in 0..self.replicas {
                let point = (self.hash)(format!("{i}{addr}").as_bytes());
                if !self.owners.contains_key(&point) {
                    self.owners.insert(point, addr.to_string());
                    self.keys.push(point);
                }
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the peer owning `key`, or `None` when the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let point = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < point) % self.keys.len();
        self.owners.get(&self.keys[idx]).map(String::as_str)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.keys.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Hash that reads the input as a decimal number, so positions are predictable.
    fn numeric_hash() -> HashFn {
        Arc::new(|data: &[u8]| -> u64 {
            std::str::from_utf8(data)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0)
        })
    }

    #[test]
    fn test_empty_ring() {
        let ring = HashRing::new(3, None);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_hashing() {
        let mut ring = HashRing::new(3, Some(numeric_hash()));
        // virtual nodes: 2, 4, 6, 12, 14, 16, 22, 24, 26
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "asking for {key}");
        }

        // 8, 18, 28 now take over the wrap-around
        ring.add(["8"]);
        assert_eq!(ring.get("27"), Some("8"));
        assert_eq!(ring.len(), 12);
    }

    #[test]
    fn test_consistency_across_instances() {
        let mut a = HashRing::new(1, None);
        let mut b = HashRing::new(1, None);
        a.add(["Bill", "Bob", "Bonny"]);
        b.add(["Bob", "Bonny", "Bill"]);

        assert_eq!(a.get("Ben"), b.get("Ben"));

        b.add(["Becky", "Ben", "Bobby"]);
        let mut c = HashRing::new(1, None);
        c.add(["Bobby", "Ben", "Becky", "Bill", "Bonny", "Bob"]);
        for key in ["Ben", "Bob", "Bonny"] {
            assert_eq!(b.get(key), c.get(key));
        }
    }

    #[test]
    fn test_zero_replicas_still_places_peers() {
        let mut ring = HashRing::new(0, None);
        ring.add(["http://a"]);
        assert_eq!(ring.replicas(), 1);
        assert_eq!(ring.get("key"), Some("http://a"));
    }

    #[test]
    fn test_collision_keeps_first_owner() {
        let mut ring = HashRing::new(2, Some(Arc::new(|_: &[u8]| -> u64 { 7 })));
        ring.add(["first", "second"]);

        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get("x"), Some("first"));
    }

    #[test]
    fn test_load_spread() {
        let peers = ["http://10.0.0.1:8001", "http://10.0.0.2:8001", "http://10.0.0.3:8001"];
        let mut ring = HashRing::new(50, None);
        ring.add(peers);

        let samples = 30_000;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for i in 0..samples {
            let key = format!("user:{i}");
            if let Some(owner) = ring.get(&key) {
                *counts.entry(owner).or_default() += 1;
            }
        }

        let fair = samples / peers.len();
        for peer in peers {
            let share = counts.get(peer).copied().unwrap_or(0);
            assert!(
                share > fair / 3 && share < fair * 2,
                "{peer} received {share} of {samples} keys"
            );
        }
    }

    proptest! {
        // Lookups do not depend on the order in which peers were added or on
        // what was looked up before.
        #[test]
        fn prop_lookup_is_deterministic(
            peers in prop::collection::hash_set("[a-z]{3,8}", 1..8),
            keys in prop::collection::vec("[a-zA-Z0-9:/]{1,24}", 1..50)
        ) {
            let forward: Vec<String> = peers.iter().cloned().collect();
            let mut backward = forward.clone();
            backward.reverse();

            let mut a = HashRing::new(20, None);
            a.add(&forward);
            let mut b = HashRing::new(20, None);
            b.add(&backward);

            let first: Vec<Option<String>> =
                keys.iter().map(|k| a.get(k).map(str::to_string)).collect();
            for (key, expected) in keys.iter().rev().zip(first.iter().rev()) {
                prop_assert_eq!(a.get(key).map(str::to_string), expected.clone());
                prop_assert_eq!(b.get(key).map(str::to_string), expected.clone());
            }
        }
    }
}

//! LRU Cache Module
//!
//! Implements a byte-accounted Least Recently Used cache.
//!
//! Entries live in a slot arena linked into a doubly linked list:
//! - Head = Most recently used
//! - Tail = Least recently used
//!
//! The cache is not synchronized; callers wrap it in a lock (see `LocalStore`).

use std::collections::HashMap;
use std::fmt;

// == Weighted ==
/// Values stored in an [`LruCache`] report their size in bytes.
pub trait Weighted {
    fn weight(&self) -> usize;
}

impl Weighted for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Weighted for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

/// Hook invoked with each evicted entry before it is dropped.
pub type EvictionHook<V> = Box<dyn FnMut(&str, &V) + Send>;

struct Slot<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Byte-bounded LRU cache keyed by string.
///
/// The size of an entry is `key.len() + value.weight()`. A `max_bytes` of 0
/// disables eviction entirely.
pub struct LruCache<V> {
    max_bytes: usize,
    used_bytes: usize,
    index: HashMap<String, usize>,
    slots: Vec<Option<Slot<V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionHook<V>>,
}

impl<V: Weighted> LruCache<V> {
    // == Constructor ==
    /// Creates an empty cache holding at most `max_bytes` (0 = unlimited).
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evicted: None,
        }
    }

    /// Creates an empty cache that reports every eviction to `hook`.
    pub fn with_eviction_hook(max_bytes: usize, hook: EvictionHook<V>) -> Self {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(hook);
        cache
    }

    // == Get ==
    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    // == Add ==
    /// Inserts or replaces `key`, marks it most recently used, then evicts
    /// from the tail until the cache fits its byte budget.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            if let Some(slot) = self.slots[idx].as_mut() {
                let old = std::mem::replace(&mut slot.value, value);
                self.used_bytes = self.used_bytes + slot.value.weight() - old.weight();
            }
        } else {
            self.used_bytes += key.len() + value.weight();
            let slot = Slot {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            };
            let idx = match self.free.pop() {
                Some(idx) => {
                    self.slots[idx] = Some(slot);
                    idx
                }
                None => {
                    self.slots.push(Some(slot));
                    self.slots.len() - 1
                }
            };
            self.index.insert(key, idx);
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, if any.
    ///
    /// The eviction hook runs before the entry is handed back.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        let idx = self.tail?;
        self.unlink(idx);
        let slot = self.slots[idx].take()?;
        self.free.push(idx);
        self.index.remove(&slot.key);
        self.used_bytes -= slot.key.len() + slot.value.weight();

        if let Some(hook) = self.on_evicted.as_mut() {
            hook(&slot.key, &slot.value);
        }
        Some((slot.key, slot.value))
    }

    // == Contains ==
    /// Checks for `key` without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently accounted to entries.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    // == List Plumbing ==
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = None;
            slot.next = old_head;
        }
        match old_head.and_then(|h| self.slots[h].as_mut()) {
            Some(head) => head.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_ref() {
            Some(slot) => (slot.prev, slot.next),
            None => return,
        };
        match prev.and_then(|p| self.slots[p].as_mut()) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.slots[n].as_mut()) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = None;
            slot.next = None;
        }
    }

    /// Keys from least to most recently used.
    #[cfg(test)]
    pub(crate) fn keys_oldest_first(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.tail;
        while let Some(idx) = cursor {
            match self.slots[idx].as_ref() {
                Some(slot) => {
                    keys.push(slot.key.clone());
                    cursor = slot.prev;
                }
                None => break,
            }
        }
        keys
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.index.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_lru_new() {
        let lru: LruCache<String> = LruCache::new(0);
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_get() {
        let mut lru = LruCache::new(5000);
        lru.add("key1", "1234".to_string());

        assert_eq!(lru.get("key1").map(String::as_str), Some("1234"));
        assert!(lru.get("key2").is_none());
    }

    #[test]
    fn test_lru_remove_oldest_on_overflow() {
        let (k1, k2, k3) = ("key1", "key2", "key3");
        let (v1, v2, v3) = ("v1", "v2", "v3");
        let cap = format!("{k1}{v1}{k2}{v2}").len();

        let mut lru = LruCache::new(cap);
        lru.add(k1, v1.to_string());
        lru.add(k2, v2.to_string());
        lru.add(k3, v3.to_string());

        assert!(lru.get(k1).is_none());
        assert_eq!(lru.len(), 2);
        assert!(lru.contains(k2));
        assert!(lru.contains(k3));
    }

    #[test]
    fn test_lru_eviction_hook() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let hook: EvictionHook<String> = Box::new(move |key: &str, _value: &String| {
            sink.lock().unwrap().push(key.to_string());
        });

        let mut lru = LruCache::with_eviction_hook(10, hook);
        lru.add("key1", "123456".to_string());
        lru.add("k2", "k2".to_string());
        lru.add("k3", "k3".to_string());
        lru.add("k4", "k4".to_string());

        assert_eq!(*evicted.lock().unwrap(), vec!["key1", "k2"]);
    }

    #[test]
    fn test_lru_hook_sees_value() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let hook: EvictionHook<String> = Box::new(move |key: &str, value: &String| {
            *sink.lock().unwrap() = Some(format!("{key}={value}"));
        });

        let mut lru = LruCache::with_eviction_hook(0, hook);
        lru.add("a", "1".to_string());

        assert_eq!(lru.remove_oldest(), Some(("a".to_string(), "1".to_string())));
        assert_eq!(seen.lock().unwrap().as_deref(), Some("a=1"));
    }

    #[test]
    fn test_lru_replace_adjusts_bytes_by_delta() {
        let mut lru = LruCache::new(0);
        lru.add("key", "abc".to_string());
        assert_eq!(lru.used_bytes(), 6);

        lru.add("key", "abcdef".to_string());
        assert_eq!(lru.used_bytes(), 9);
        assert_eq!(lru.len(), 1);

        lru.add("key", "a".to_string());
        assert_eq!(lru.used_bytes(), 4);
    }

    #[test]
    fn test_lru_replace_counts_as_touch() {
        let mut lru = LruCache::new(0);
        lru.add("a", "1".to_string());
        lru.add("b", "2".to_string());
        lru.add("a", "3".to_string());

        assert_eq!(lru.keys_oldest_first(), vec!["b", "a"]);
    }

    #[test]
    fn test_lru_replace_growth_triggers_eviction() {
        let mut lru = LruCache::new(8);
        lru.add("a", "1".to_string());
        lru.add("b", "2".to_string());
        lru.add("c", "3".to_string());
        // a is oldest but gets touched by the replace, so b goes first
        lru.add("a", "1234".to_string());

        assert!(!lru.contains("b"));
        assert!(lru.contains("a"));
        assert!(lru.used_bytes() <= 8);
    }

    #[test]
    fn test_lru_get_moves_to_front() {
        let mut lru = LruCache::new(0);
        lru.add("a", String::new());
        lru.add("b", String::new());
        lru.add("c", String::new());

        lru.get("a");
        assert_eq!(lru.keys_oldest_first(), vec!["b", "c", "a"]);

        assert_eq!(lru.remove_oldest().map(|(k, _)| k), Some("b".to_string()));
        assert_eq!(lru.remove_oldest().map(|(k, _)| k), Some("c".to_string()));
        assert_eq!(lru.remove_oldest().map(|(k, _)| k), Some("a".to_string()));
    }

    #[test]
    fn test_lru_remove_oldest_empty_is_noop() {
        let mut lru: LruCache<String> = LruCache::new(10);
        assert!(lru.remove_oldest().is_none());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_unlimited_never_evicts() {
        let mut lru = LruCache::new(0);
        for i in 0..1000 {
            lru.add(format!("key{i}"), "x".repeat(100));
        }
        assert_eq!(lru.len(), 1000);
    }

    #[test]
    fn test_lru_oversized_entry_evicts_itself() {
        let mut lru = LruCache::new(4);
        lru.add("key", "value".to_string());

        assert!(lru.is_empty());
        assert_eq!(lru.used_bytes(), 0);
    }

    #[test]
    fn test_lru_slots_are_reused() {
        let mut lru = LruCache::new(8);
        for i in 0..100 {
            lru.add(format!("k{i}"), "v".to_string());
        }
        assert_eq!(lru.len(), 2);
        assert!(lru.slots.len() <= 3);
    }
}

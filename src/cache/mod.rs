//! Cache Module
//!
//! Provides the bounded local store: a byte-accounted LRU cache of immutable values.

mod byteview;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use lru::{EvictionHook, LruCache, Weighted};
pub use stats::CacheStats;
pub use store::LocalStore;

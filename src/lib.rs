//! peercache - a distributed read-through cache
//!
//! Values are organised in named groups. A miss is routed over a
//! consistent-hash ring to the peer that owns the key, or loaded locally
//! from the group's source of truth, with concurrent loads of the same key
//! coalesced into one.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;

pub use api::AppState;
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{loader_fn, Group, GroupRegistry, Loader};
pub use peers::{HttpPool, PeerGetter, PeerPicker, PoolOptions};

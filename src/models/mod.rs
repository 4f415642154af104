//! Wire envelopes and response models
//!
//! Protobuf messages for the peer protocol and JSON DTOs for the
//! node's stats and health endpoints.

pub mod responses;
pub mod wire;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
pub use wire::{FetchRequest, FetchResponse};

//! API Module
//!
//! HTTP handlers and routing for the peer cache server.
//!
//! # Endpoints
//! - `GET <base_path><group>/<key>` - Value for a key, answered to peers
//! - `GET /stats` - Per-group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

//! API Routes
//!
//! Configures the Axum router with the peer endpoint and the node endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, peer_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET <base_path><group>/<key>` - Peer fetch, protobuf `FetchResponse` body
/// - `GET /stats` - Per-group statistics
/// - `GET /health` - Health check endpoint
///
/// The bare base path is routed to the peer handler too, which rejects it
/// as malformed. Static routes win over the peer wildcard, so a base path of
/// `/` still leaves `/stats` and `/health` reachable.
pub fn create_router(state: AppState) -> Router {
    let peer_route = format!("{}*rest", state.base_path);

    Router::new()
        .route(&state.base_path, get(peer_handler))
        .route(&peer_route, get(peer_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

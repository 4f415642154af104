//! API Handlers
//!
//! HTTP request handlers for the peer cache endpoint and the node's
//! stats and health endpoints.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use prost::Message;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{FetchResponse, HealthResponse, StatsResponse};
use crate::peers::normalize_base_path;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
    /// Prefix of the peer endpoint, starting and ending with `/`
    pub base_path: Arc<str>,
}

impl AppState {
    /// `base_path` is normalised to start and end with `/`.
    pub fn new(registry: Arc<GroupRegistry>, base_path: &str) -> Self {
        Self {
            registry,
            base_path: Arc::from(normalize_base_path(base_path)),
        }
    }
}

/// Splits `<group>/<key>` after the base path. Only the first `/` separates;
/// the key keeps any further slashes. Both parts are percent-decoded.
pub fn parse_peer_path<'a>(
    base_path: &str,
    path: &'a str,
) -> Result<(Cow<'a, str>, Cow<'a, str>)> {
    let rest = path
        .strip_prefix(base_path)
        .ok_or_else(|| CacheError::BadRequest(format!("unexpected path: {path}")))?;
    let (group, key) = rest
        .split_once('/')
        .ok_or_else(|| CacheError::BadRequest("expected <group>/<key>".to_string()))?;

    Ok((decode_segment(group)?, decode_segment(key)?))
}

fn decode_segment(segment: &str) -> Result<Cow<'_, str>> {
    urlencoding::decode(segment)
        .map_err(|e| CacheError::BadRequest(format!("invalid escape in {segment:?}: {e}")))
}

/// Handler for GET `<base_path><group>/<key>`
///
/// Answers a peer with the group's value for the key, encoded as a
/// `FetchResponse`.
pub async fn peer_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response> {
    let path = uri.path();
    info!(%method, path, "peer request");

    let (group_name, key) = parse_peer_path(&state.base_path, path)?;
    let group = state
        .registry
        .get(&group_name)
        .ok_or_else(|| CacheError::GroupNotFound(group_name.to_string()))?;
    group.record_server_request();

    let value = group.get(&key).await?;

    let response = FetchResponse {
        value: value.into_bytes(),
    };
    let mut body = Vec::with_capacity(response.encoded_len());
    response
        .encode(&mut body)
        .map_err(|e| CacheError::Encode(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response())
}

/// Handler for GET /stats
///
/// Returns statistics for every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<Vec<StatsResponse>> {
    let stats = state
        .registry
        .groups()
        .iter()
        .map(|group| StatsResponse::new(group.name(), group.stats(), group.cache_stats()))
        .collect();

    Json(stats)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
